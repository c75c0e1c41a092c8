use std::sync::{Arc, PoisonError, RwLock};

use image::RgbaImage;
use log::trace;

use crate::{
    decoder::decode_frame,
    error::SlpError,
    parser::parse_header,
    render::{render_commands, RenderOptions},
    DecodedFrame, FrameEntry, Palette, Slp,
};

impl Slp {
    /// Reads the header and frame directory. Frame data is decoded lazily.
    pub fn open_from_bytes(i: &[u8]) -> Result<Slp, SlpError> {
        let header = parse_header(i)?;

        Ok(Slp {
            header,
            bytes: i.to_vec(),
            frame_cache: RwLock::default(),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frames.len()
    }

    pub fn frame_entry(&self, index: usize) -> Result<&FrameEntry, SlpError> {
        self.header
            .frames
            .get(index)
            .ok_or(SlpError::FrameIndexOutOfRange {
                index,
                count: self.frame_count(),
            })
    }

    /// Decoded outlines and commands of a frame, computed once and shared afterwards.
    ///
    /// Two threads asking for the same frame at once may both decode it. Only the first
    /// result is stored and both are identical.
    pub fn get_frame(&self, index: usize) -> Result<Arc<DecodedFrame>, SlpError> {
        let cached = self
            .frame_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&index)
            .cloned();

        if let Some(frame) = cached {
            trace!("frame {index} is cached");
            return Ok(frame);
        }

        let entry = self.frame_entry(index)?;
        let frame = Arc::new(decode_frame(&self.bytes, entry, index)?);

        let mut cache = self
            .frame_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(cache.entry(index).or_insert(frame).clone())
    }

    /// Renders a frame into a new RGBA image.
    pub fn render_frame(
        &self,
        index: usize,
        palette: Option<&Palette>,
        options: &RenderOptions,
    ) -> Result<RgbaImage, SlpError> {
        if palette.is_none() {
            return Err(SlpError::PaletteRequired);
        }

        let entry = self.frame_entry(index)?;
        let frame = self.get_frame(index)?;

        render_commands(
            entry.width as u32,
            entry.height as u32,
            &frame.outlines,
            &frame.commands,
            palette,
            options,
        )
    }
}
