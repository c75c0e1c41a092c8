use std::{
    collections::HashMap,
    str::from_utf8,
    sync::{Arc, RwLock},
};

use crate::constants::{COMMENT_LENGTH, SLP_LINE_EMPTY, VERSION_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: [u8; VERSION_LENGTH],
    pub frame_count: i32,
    pub comment: [u8; COMMENT_LENGTH],
    pub frames: Vec<FrameEntry>,
}

impl Header {
    pub fn version_string(&self) -> String {
        null_terminated_string(&self.version)
    }

    pub fn comment_string(&self) -> String {
        null_terminated_string(&self.comment)
    }
}

fn null_terminated_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|c| *c == 0).unwrap_or(bytes.len());

    // comments are free text from whatever tool wrote the file
    match from_utf8(&bytes[..end]) {
        Ok(s) => s.to_string(),
        Err(_) => bytes[..end].iter().map(|c| *c as char).collect(),
    }
}

/// Copies `s` into a fixed size field, truncated or padded with null.
pub fn fixed_length_bytes<const N: usize>(s: &str) -> [u8; N] {
    let mut res = [0u8; N];
    let length = s.len().min(N);

    res[..length].copy_from_slice(&s.as_bytes()[..length]);

    res
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hotspot {
    pub x: i32,
    pub y: i32,
}

/// One 32 byte record in the frame directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEntry {
    pub cmd_table_offset: u32,
    pub outline_table_offset: u32,
    /// Carried along, never read by the renderer.
    pub palette_offset: u32,
    /// Carried along, never read by the renderer.
    pub properties: u32,
    pub width: i32,
    pub height: i32,
    pub hotspot: Hotspot,
}

/// Transparent pixels at both ends of a scanline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outline {
    pub left: u16,
    pub right: u16,
}

impl Outline {
    pub fn is_empty_row(&self) -> bool {
        self.left == SLP_LINE_EMPTY
    }

    /// Leading transparent pixels, resolving the empty row marker to the whole row.
    pub fn left_span(&self, width: usize) -> usize {
        if self.is_empty_row() {
            width
        } else {
            self.left as usize
        }
    }
}

/// The one representation shared by decoding, rendering, building and writing.
///
/// Position is implied: commands run left to right and `NextLine` closes a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    NextLine,
    Color(u8),
    Skip(usize),
    PlayerColor(u8),
    Shadow(usize),
    /// Thickness is either 1 or 2.
    Outline(u8),
    Fill { count: usize, color: u8 },
    PlayerFill { count: usize, color: u8 },
}

impl RenderCommand {
    /// How many pixels this command advances the current row by.
    pub fn pixel_count(&self) -> usize {
        match self {
            Self::NextLine => 0,
            Self::Color(_) | Self::PlayerColor(_) | Self::Outline(_) => 1,
            Self::Skip(count) | Self::Shadow(count) => *count,
            Self::Fill { count, .. } | Self::PlayerFill { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub outlines: Vec<Outline>,
    pub commands: Vec<RenderCommand>,
}

impl DecodedFrame {
    /// Moves the outline spans back into the command stream as plain skips.
    ///
    /// The result describes every pixel of every row on its own, which is the shape the
    /// command builder produces and the frame writer expects.
    pub fn to_positional_commands(&self, width: usize) -> Vec<RenderCommand> {
        let mut res = Vec::with_capacity(self.commands.len() + self.outlines.len() * 2);
        let mut rows = self.outlines.iter();

        let push_skip = |res: &mut Vec<RenderCommand>, count: usize| {
            if count > 0 {
                res.push(RenderCommand::Skip(count));
            }
        };

        let mut current = rows.next();

        if let Some(outline) = current {
            push_skip(&mut res, outline.left_span(width));
        }

        for command in &self.commands {
            if *command != RenderCommand::NextLine {
                res.push(*command);
                continue;
            }

            if let Some(outline) = current {
                push_skip(&mut res, outline.right as usize);
            }

            res.push(RenderCommand::NextLine);

            current = rows.next();

            if let Some(outline) = current {
                push_skip(&mut res, outline.left_span(width));
            }
        }

        res
    }
}

/// A parsed SLP file.
///
/// Only the header is read up front. Frames are decoded on first access and kept.
#[derive(Debug)]
pub struct Slp {
    pub header: Header,
    pub(crate) bytes: Vec<u8>,
    pub(crate) frame_cache: RwLock<HashMap<usize, Arc<DecodedFrame>>>,
}
