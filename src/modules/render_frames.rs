use eyre::eyre;
use image::RgbaImage;
use log::debug;
use rayon::prelude::*;
use slp::{Palette, Slp};

use crate::config::RenderConfig;

/// Renders every frame of a file, in frame order.
pub fn render_all_frames(
    slp: &Slp,
    palette: &Palette,
    config: &RenderConfig,
) -> eyre::Result<Vec<RgbaImage>> {
    let options = config.to_options();

    debug!(
        "rendering {} frames as player {}",
        slp.frame_count(),
        options.player()
    );

    (0..slp.frame_count())
        .into_par_iter()
        .map(|index| {
            slp.render_frame(index, Some(palette), &options)
                .map_err(|op| eyre!("Cannot render frame {}: {}", index, op))
        })
        .collect()
}
