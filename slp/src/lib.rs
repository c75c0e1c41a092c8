//! SLP sprite files: decoding frames into render commands, rendering them against a
//! palette, and encoding RGBA pixels back into frames.
//!
//! Render commands are the pivot of both directions. Decoding produces them from the
//! opcode stream and rendering consumes them. On the way back, building produces them
//! from pixels and the writer turns them into opcodes again.
pub mod builder;
pub mod constants;
mod decoder;
pub mod error;
pub mod opcode;
pub mod palette;
mod parser;
pub mod render;
mod types;
mod utils;
pub mod writer;

pub use decoder::decode_frame;
pub use palette::{ColorLookup, Palette, ReversePalette};
pub use render::RenderOptions;
pub use types::*;
pub use writer::{FrameCommands, SlpEncoder, SlpEncoderOptions};
