#[derive(Debug, thiserror::Error)]
pub enum SlpError {
    #[error("Header is truncated. Expect ({expected}) bytes. Have ({actual})")]
    TruncatedHeader { expected: usize, actual: usize },
    #[error("Frame count is negative: {count}")]
    InvalidFrameCount { count: i32 },
    #[error("Frame {frame} runs past the end of the buffer at offset {offset:#x}")]
    TruncatedFrame { frame: usize, offset: usize },
    #[error("Unsupported opcode {opcode:#04x} at offset {offset:#x}")]
    UnsupportedOpcode { opcode: u8, offset: usize },
    #[error("No palette is given")]
    PaletteRequired,
    #[error("Missing color: [{r} {g} {b}] is not in palette")]
    ColorNotInPalette { r: u8, g: u8, b: u8 },
    #[error("Frame index {index} is out of range. Frame count is {count}")]
    FrameIndexOutOfRange { index: usize, count: usize },
    #[error("Palette index {index} is out of range")]
    PaletteIndexOutOfRange { index: usize },
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("Pixel buffer has ({actual}) bytes. Expect ({expected})")]
    PixelBufferSize { expected: usize, actual: usize },
    #[error("Commands describe more rows than the frame height ({height})")]
    RowCountMismatch { height: usize },
    #[error("Row {row} holds more pixels than the frame width ({width})")]
    RowTooWide { row: usize, width: usize },
    #[error("Error parsing header: {source}")]
    NomError {
        #[source]
        source: nom::Err<nom::error::Error<Vec<u8>>>,
    },
}
