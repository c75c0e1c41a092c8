pub const HEADER_LENGTH: usize = 32;
pub const FRAME_ENTRY_LENGTH: usize = 32;
pub const VERSION_LENGTH: usize = 4;
pub const COMMENT_LENGTH: usize = 24;

// per scanline, in front of the opcode stream
pub const OUTLINE_ENTRY_LENGTH: usize = 4;
pub const ROW_OFFSET_ENTRY_LENGTH: usize = 4;

pub const DEFAULT_VERSION: &str = "1.00";

// opcodes, keyed on the low 2 bits or the low nibble
pub const SLP_COLOR_LIST: u8 = 0x00;
pub const SLP_SKIP: u8 = 0x01;
pub const SLP_COLOR_LIST_EX: u8 = 0x02;
pub const SLP_SKIP_EX: u8 = 0x03;
pub const SLP_COLOR_LIST_PLAYER: u8 = 0x06;
pub const SLP_FILL: u8 = 0x07;
pub const SLP_FILL_PLAYER: u8 = 0x0a;
pub const SLP_SHADOW: u8 = 0x0b;
pub const SLP_EXTENDED: u8 = 0x0e;
pub const SLP_END_OF_ROW: u8 = 0x0f;

// extended opcodes, keyed on the high nibble
pub const SLP_EX_OUTLINE1: u8 = 0x40;
pub const SLP_EX_FILL_OUTLINE1: u8 = 0x50;
pub const SLP_EX_OUTLINE2: u8 = 0x60;
pub const SLP_EX_FILL_OUTLINE2: u8 = 0x70;

/// Left outline value of a row without a single drawn pixel.
pub const SLP_LINE_EMPTY: u16 = 0x8000;

/// Widest row whose outline spans cannot collide with [`SLP_LINE_EMPTY`].
pub const MAX_FRAME_WIDTH: usize = 0x7fff;

// longest run each opcode form can carry
pub const MAX_COLOR_LIST: usize = 0x3f;
pub const MAX_SKIP: usize = 0x3f;
pub const MAX_NIBBLE_COUNT: usize = 0x0f;
pub const MAX_BYTE_COUNT: usize = 0xff;
pub const MAX_EXTENDED_COUNT: usize = 0xfff;

pub const PALETTE_COUNT: usize = 256;
pub const PLAYER_COLOR_STRIDE: usize = 16;
pub const DEFAULT_PLAYER: u8 = 1;

/// Stand-in color for shadow pixels. Compositing them is up to the caller.
pub const SHADOW_COLOR: [u8; 3] = [255, 0, 0];
pub const OUTLINE_COLOR: [u8; 3] = [0, 0, 0];
