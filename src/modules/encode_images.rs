use eyre::eyre;
use image::RgbaImage;
use log::debug;
use rayon::prelude::*;
use slp::{builder::pixels_to_commands, Hotspot, Palette, SlpEncoder};

use crate::config::EncoderConfig;

/// Encodes images as the frames of one file, in the given order.
///
/// Commands for each image are built in parallel. Laying out the file happens afterwards
/// because every frame's offset depends on the frames before it.
pub fn encode_images(
    images: &[(RgbaImage, Hotspot)],
    palette: &Palette,
    config: &EncoderConfig,
) -> eyre::Result<Vec<u8>> {
    let mut encoder = SlpEncoder::new(config.to_options(Some(palette.clone())))?;
    let colors = encoder.colors();

    let frames = images
        .par_iter()
        .enumerate()
        .map(|(index, (image, _))| {
            pixels_to_commands(
                image.width() as usize,
                image.height() as usize,
                image.as_raw(),
                colors,
            )
            .map_err(|op| eyre!("Cannot encode image {}: {}", index, op))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    for ((image, hotspot), commands) in images.iter().zip(frames) {
        encoder.add_commands(image.width(), image.height(), *hotspot, commands)?;
    }

    let bytes = encoder.encode()?;

    debug!("encoded {} images into {} bytes", images.len(), bytes.len());

    Ok(bytes)
}

#[cfg(test)]
mod test {
    use slp::Slp;

    use super::*;
    use crate::{
        config::RenderConfig,
        modules::{
            render_all_frames,
            test_utils::{palette, paletted_image},
        },
    };

    #[test]
    fn round_trip() {
        let images = vec![
            (
                paletted_image(80, 4, |x, y| match (x + y) % 9 {
                    0 => None,
                    n => Some((x / 8) as u8 + n as u8 * 20),
                }),
                Hotspot { x: 40, y: 4 },
            ),
            (
                paletted_image(3, 3, |x, _| (x == 1).then_some(77)),
                Hotspot { x: -1, y: 2 },
            ),
        ];

        let config = EncoderConfig {
            version: "2.0N".to_string(),
            comment: "batch".to_string(),
        };

        let bytes = encode_images(&images, &palette(), &config).unwrap();
        let slp = Slp::open_from_bytes(&bytes).unwrap();

        assert_eq!(slp.header.version_string(), "2.0N");
        assert_eq!(slp.header.comment_string(), "batch");
        assert_eq!(slp.frame_count(), 2);
        assert_eq!(slp.frame_entry(1).unwrap().hotspot, Hotspot { x: -1, y: 2 });

        let rendered = render_all_frames(&slp, &palette(), &RenderConfig::default()).unwrap();

        for ((image, _), rendered) in images.iter().zip(rendered) {
            assert_eq!(*image, rendered);
        }
    }

    #[test]
    fn color_outside_palette() {
        let mut odd = paletted_image(2, 2, |_, _| Some(1));
        odd.put_pixel(1, 1, image::Rgba([1, 2, 3, 255]));

        let images = [
            (paletted_image(1, 1, |_, _| Some(1)), Hotspot::default()),
            (odd, Hotspot::default()),
        ];

        let err = encode_images(&images, &palette(), &EncoderConfig::default()).unwrap_err();

        assert!(err.to_string().starts_with("Cannot encode image 1"));
    }

    #[test]
    fn no_images() {
        let bytes = encode_images(&[], &palette(), &EncoderConfig::default()).unwrap();

        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..4], b"1.00");
    }
}
