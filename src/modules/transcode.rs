use eyre::eyre;
use log::debug;
use rayon::prelude::*;
use slp::{error::SlpError, writer::write_slp, FrameCommands, Slp};

use crate::config::EncoderConfig;

/// Decodes every frame and writes them into a fresh file.
///
/// Dimensions, hotspots, the directory's palette offset and properties, and every command
/// survive, including player colors, shadows and outlines. Version and comment come from
/// `config`.
pub fn transcode(bytes: &[u8], config: &EncoderConfig) -> eyre::Result<Vec<u8>> {
    let slp = Slp::open_from_bytes(bytes).map_err(|op| eyre!("Cannot open SLP: {}", op))?;

    let frames = (0..slp.frame_count())
        .into_par_iter()
        .map(|index| -> Result<FrameCommands, SlpError> {
            let frame = slp.get_frame(index)?;
            let entry = slp.frame_entry(index)?;

            // decoding succeeded so both dimensions are positive
            Ok(FrameCommands {
                width: entry.width as u32,
                height: entry.height as u32,
                hotspot: entry.hotspot,
                palette_offset: entry.palette_offset,
                properties: entry.properties,
                commands: frame.to_positional_commands(entry.width as usize),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|op| eyre!("Cannot decode frame: {}", op))?;

    let res = write_slp(&config.version, &config.comment, &frames)?;

    debug!(
        "transcoded {} frames, {} bytes into {} bytes",
        frames.len(),
        bytes.len(),
        res.len()
    );

    Ok(res)
}
