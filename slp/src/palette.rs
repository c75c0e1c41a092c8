use std::collections::HashMap;

use crate::{
    constants::{PALETTE_COUNT, PLAYER_COLOR_STRIDE},
    error::SlpError,
};

/// 256 RGB entries. Player colors live inside the table, 16 entries apart per player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<[u8; 3]>);

impl Palette {
    /// Short palettes are padded with black, long ones cut at 256 entries.
    pub fn new(s: impl Into<Vec<[u8; 3]>>) -> Self {
        let mut colors = s.into();
        colors.resize(PALETTE_COUNT, [0, 0, 0]);

        Self(colors)
    }

    pub fn get(&self, index: u8) -> [u8; 3] {
        self.0[index as usize]
    }

    /// Looks up `index + 16 * player`.
    pub fn get_player(&self, index: u8, player: u8) -> Result<[u8; 3], SlpError> {
        let index = index as usize + PLAYER_COLOR_STRIDE * player as usize;

        self.0
            .get(index)
            .copied()
            .ok_or(SlpError::PaletteIndexOutOfRange { index })
    }

    pub fn get_bytes(&self) -> &Vec<[u8; 3]> {
        &self.0
    }
}

pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Reverse palette lookup used when turning pixels back into palette indices.
pub trait ColorLookup {
    fn lookup(&self, r: u8, g: u8, b: u8) -> Option<u8>;
}

/// Packed RGB to palette index.
#[derive(Debug, Clone, Default)]
pub struct ReversePalette(HashMap<u32, u8>);

impl ReversePalette {
    /// When a color sits at more than one index, the last index wins.
    pub fn from_palette(palette: &Palette) -> Self {
        Self(
            palette
                .get_bytes()
                .iter()
                .enumerate()
                .map(|(index, [r, g, b])| (pack_rgb(*r, *g, *b), index as u8))
                .collect(),
        )
    }
}

impl ColorLookup for ReversePalette {
    fn lookup(&self, r: u8, g: u8, b: u8) -> Option<u8> {
        self.0.lookup(r, g, b)
    }
}

impl ColorLookup for HashMap<u32, u8> {
    fn lookup(&self, r: u8, g: u8, b: u8) -> Option<u8> {
        self.get(&pack_rgb(r, g, b)).copied()
    }
}
