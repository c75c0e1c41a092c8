pub mod encode_images;
pub mod render_frames;
pub mod transcode;

pub use encode_images::encode_images;
pub use render_frames::render_all_frames;
pub use transcode::transcode;

#[cfg(test)]
pub(crate) mod test_utils {
    use image::{Rgba, RgbaImage};
    use slp::Palette;

    pub fn palette() -> Palette {
        Palette::new((0..=255u8).map(|i| [i, 255 - i, i / 2]).collect::<Vec<_>>())
    }

    /// Opaque wherever `index` gives a palette index, transparent elsewhere.
    pub fn paletted_image(
        width: u32,
        height: u32,
        index: impl Fn(u32, u32) -> Option<u8>,
    ) -> RgbaImage {
        let palette = palette();

        RgbaImage::from_fn(width, height, |x, y| match index(x, y) {
            Some(index) => {
                let [r, g, b] = palette.get(index);
                Rgba([r, g, b, 255])
            }
            None => Rgba([0, 0, 0, 0]),
        })
    }
}
