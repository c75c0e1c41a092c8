use crate::{error::SlpError, palette::ColorLookup, RenderCommand};

/// Turns row-major RGBA pixels into render commands.
///
/// Merging only ever looks at the previous command. Transparent pixels grow a skip, a
/// repeated color turns into a fill once it is seen twice in a row.
pub fn pixels_to_commands(
    width: usize,
    height: usize,
    data: &[u8],
    colors: &impl ColorLookup,
) -> Result<Vec<RenderCommand>, SlpError> {
    let expected = width * height * 4;

    if data.len() != expected {
        return Err(SlpError::PixelBufferSize {
            expected,
            actual: data.len(),
        });
    }

    let mut commands: Vec<RenderCommand> = vec![];

    for (i, pixel) in data.chunks_exact(4).enumerate() {
        if i > 0 && i % width == 0 {
            commands.push(RenderCommand::NextLine);
        }

        let [r, g, b, a] = [pixel[0], pixel[1], pixel[2], pixel[3]];

        if a == 0 {
            match commands.last_mut() {
                Some(RenderCommand::Skip(count)) => *count += 1,
                _ => commands.push(RenderCommand::Skip(1)),
            }

            continue;
        }

        let Some(index) = colors.lookup(r, g, b) else {
            return Err(SlpError::ColorNotInPalette { r, g, b });
        };

        match commands.last_mut() {
            Some(RenderCommand::Fill { count, color }) if *color == index => *count += 1,
            Some(last) if *last == RenderCommand::Color(index) => {
                *last = RenderCommand::Fill {
                    count: 2,
                    color: index,
                }
            }
            _ => commands.push(RenderCommand::Color(index)),
        }
    }

    Ok(commands)
}
