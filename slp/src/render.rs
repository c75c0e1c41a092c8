use image::RgbaImage;
use log::warn;

use crate::{
    constants::{DEFAULT_PLAYER, OUTLINE_COLOR, SHADOW_COLOR},
    error::SlpError,
    Outline, Palette, RenderCommand,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Player 1 to 8. `None` and `0` both mean player 1.
    pub player: Option<u8>,
    /// Draws outline pixels in black instead of leaving them transparent.
    pub draw_outline: bool,
}

impl RenderOptions {
    pub fn player(&self) -> u8 {
        match self.player {
            Some(player) if player != 0 => player,
            _ => DEFAULT_PLAYER,
        }
    }
}

/// Linear write position into an RGBA buffer.
///
/// The buffer starts out zeroed so skipping is only moving forward. Writes past the end
/// are dropped.
struct PixelWriter<'a> {
    pixels: &'a mut [u8],
    idx: usize,
    overflow: usize,
}

impl<'a> PixelWriter<'a> {
    fn new(pixels: &'a mut [u8]) -> Self {
        Self {
            pixels,
            idx: 0,
            overflow: 0,
        }
    }

    fn skip(&mut self, count: usize) {
        self.idx += count * 4;
    }

    fn push(&mut self, color: [u8; 3], alpha: u8) {
        match self.pixels.get_mut(self.idx..self.idx + 4) {
            Some(pixel) => pixel.copy_from_slice(&[color[0], color[1], color[2], alpha]),
            None => self.overflow += 1,
        }

        self.idx += 4;
    }

    fn fill(&mut self, color: [u8; 3], alpha: u8, count: usize) {
        for _ in 0..count {
            self.push(color, alpha);
        }
    }
}

/// Renders one frame's command sequence on top of its outline table.
pub fn render_commands(
    width: u32,
    height: u32,
    outlines: &[Outline],
    commands: &[RenderCommand],
    palette: Option<&Palette>,
    options: &RenderOptions,
) -> Result<RgbaImage, SlpError> {
    let Some(palette) = palette else {
        return Err(SlpError::PaletteRequired);
    };

    let player = options.player();
    let width_px = width as usize;
    let mut image = RgbaImage::new(width, height);
    let mut writer = PixelWriter::new(&mut image);
    let mut y = 0;

    if let Some(outline) = outlines.first() {
        writer.skip(outline.left_span(width_px));
    }

    for command in commands {
        match *command {
            RenderCommand::Skip(count) => writer.skip(count),
            RenderCommand::NextLine => {
                if let Some(outline) = outlines.get(y) {
                    writer.skip(outline.right as usize);
                }

                y += 1;

                if let Some(outline) = outlines.get(y) {
                    writer.skip(outline.left_span(width_px));
                }
            }
            RenderCommand::Color(index) => writer.push(palette.get(index), 255),
            RenderCommand::Fill { count, color } => writer.fill(palette.get(color), 255, count),
            RenderCommand::PlayerColor(index) => {
                writer.push(palette.get_player(index, player)?, 255)
            }
            RenderCommand::PlayerFill { count, color } => {
                writer.fill(palette.get_player(color, player)?, 255, count)
            }
            RenderCommand::Shadow(count) => writer.fill(SHADOW_COLOR, 255, count),
            // both thicknesses look the same without a richer renderer
            RenderCommand::Outline(_) => {
                writer.push(OUTLINE_COLOR, if options.draw_outline { 255 } else { 0 })
            }
        }
    }

    if writer.overflow > 0 {
        warn!(
            "{} pixels fall outside of the {width}x{height} frame and are dropped",
            writer.overflow
        );
    }

    Ok(image)
}
