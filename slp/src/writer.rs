use byte_writer::ByteWriter;
use image::RgbaImage;
use log::debug;

use crate::{
    builder::pixels_to_commands,
    constants::{
        COMMENT_LENGTH, DEFAULT_VERSION, FRAME_ENTRY_LENGTH, HEADER_LENGTH, MAX_BYTE_COUNT,
        MAX_COLOR_LIST, MAX_EXTENDED_COUNT, MAX_FRAME_WIDTH, MAX_NIBBLE_COUNT, MAX_SKIP,
        OUTLINE_ENTRY_LENGTH, ROW_OFFSET_ENTRY_LENGTH, SLP_COLOR_LIST, SLP_COLOR_LIST_EX,
        SLP_COLOR_LIST_PLAYER, SLP_END_OF_ROW, SLP_EXTENDED, SLP_EX_FILL_OUTLINE1,
        SLP_EX_FILL_OUTLINE2, SLP_EX_OUTLINE1, SLP_EX_OUTLINE2, SLP_FILL, SLP_FILL_PLAYER,
        SLP_LINE_EMPTY, SLP_SHADOW, SLP_SKIP, SLP_SKIP_EX, VERSION_LENGTH,
    },
    error::SlpError,
    palette::{Palette, ReversePalette},
    types::fixed_length_bytes,
    FrameEntry, Hotspot, Outline, RenderCommand,
};

trait WriteToWriter {
    fn write_to_bytes(&self, writer: &mut ByteWriter);
}

impl WriteToWriter for FrameEntry {
    fn write_to_bytes(&self, writer: &mut ByteWriter) {
        let Self {
            cmd_table_offset,
            outline_table_offset,
            palette_offset,
            properties,
            width,
            height,
            hotspot,
        } = self;

        writer.append_u32(*cmd_table_offset);
        writer.append_u32(*outline_table_offset);
        writer.append_u32(*palette_offset);
        writer.append_u32(*properties);
        writer.append_i32(*width);
        writer.append_i32(*height);
        writer.append_i32(hotspot.x);
        writer.append_i32(hotspot.y);
    }
}

/// Splits `count` into pieces no longer than `max`.
fn runs(count: usize, max: usize) -> impl Iterator<Item = usize> {
    (0..count.div_ceil(max)).map(move |i| (count - i * max).min(max))
}

/// Count in the high nibble, or in the next byte when it does not fit.
fn write_nibble_count(writer: &mut ByteWriter, opcode: u8, count: usize) {
    if count <= MAX_NIBBLE_COUNT {
        writer.append_u8(opcode | ((count as u8) << 4));
    } else {
        writer.append_u8(opcode);
        writer.append_u8(count as u8);
    }
}

/// Count split over the high nibble and the next byte.
fn write_extended_count(writer: &mut ByteWriter, opcode: u8, count: usize) {
    writer.append_u8(opcode | (((count >> 8) as u8) << 4));
    writer.append_u8((count & 0xff) as u8);
}

fn write_color_list(writer: &mut ByteWriter, indices: &[u8]) {
    for chunk in indices.chunks(MAX_EXTENDED_COUNT) {
        if chunk.len() <= MAX_COLOR_LIST {
            writer.append_u8(SLP_COLOR_LIST | ((chunk.len() as u8) << 2));
        } else {
            write_extended_count(writer, SLP_COLOR_LIST_EX, chunk.len());
        }

        writer.append_u8_slice(chunk);
    }
}

fn write_player_color_list(writer: &mut ByteWriter, indices: &[u8]) {
    for chunk in indices.chunks(MAX_BYTE_COUNT) {
        write_nibble_count(writer, SLP_COLOR_LIST_PLAYER, chunk.len());
        writer.append_u8_slice(chunk);
    }
}

fn write_skip(writer: &mut ByteWriter, count: usize) {
    for run in runs(count, MAX_EXTENDED_COUNT) {
        if run <= MAX_SKIP {
            writer.append_u8(SLP_SKIP | ((run as u8) << 2));
        } else if run <= MAX_BYTE_COUNT {
            writer.append_u8(SLP_SKIP);
            writer.append_u8(run as u8);
        } else {
            write_extended_count(writer, SLP_SKIP_EX, run);
        }
    }
}

fn write_fill(writer: &mut ByteWriter, opcode: u8, count: usize, color: u8) {
    for run in runs(count, MAX_BYTE_COUNT) {
        write_nibble_count(writer, opcode, run);
        writer.append_u8(color);
    }
}

fn write_shadow(writer: &mut ByteWriter, count: usize) {
    for run in runs(count, MAX_BYTE_COUNT) {
        write_nibble_count(writer, SLP_SHADOW, run);
    }
}

fn write_outline(writer: &mut ByteWriter, thickness: u8, count: usize) {
    let (single, repeated) = if thickness == 2 {
        (SLP_EX_OUTLINE2, SLP_EX_FILL_OUTLINE2)
    } else {
        (SLP_EX_OUTLINE1, SLP_EX_FILL_OUTLINE1)
    };

    for run in runs(count, MAX_BYTE_COUNT) {
        if run == 1 {
            writer.append_u8(SLP_EXTENDED | single);
        } else {
            writer.append_u8(SLP_EXTENDED | repeated);
            writer.append_u8(run as u8);
        }
    }
}

/// Payload of the run at the start of `commands` that `same` accepts.
fn take_run(commands: &[RenderCommand], same: impl Fn(&RenderCommand) -> Option<u8>) -> Vec<u8> {
    commands.iter().map_while(same).collect()
}

/// Writes one frame body: outline table, row offset table, then the opcode stream.
///
/// `base_offset` is where the body lands in the file. Row offsets are absolute so they
/// are only correct once the body is placed there.
///
/// Skips touching either end of a row never reach the opcode stream, they become the
/// row's outline instead. The last row is closed even if `commands` does not end with
/// [`RenderCommand::NextLine`]. A row covering more than `width` pixels is an error.
pub fn write_frame_body(
    commands: &[RenderCommand],
    width: usize,
    height: usize,
    base_offset: usize,
) -> Result<Vec<u8>, SlpError> {
    if width > MAX_FRAME_WIDTH {
        return Err(SlpError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let mut writer = ByteWriter::with_capacity(
        height * (OUTLINE_ENTRY_LENGTH + ROW_OFFSET_ENTRY_LENGTH) + commands.len() * 2 + 1,
    );

    let outline_table = writer.reserve(height * OUTLINE_ENTRY_LENGTH);
    let row_offset_table = writer.reserve(height * ROW_OFFSET_ENTRY_LENGTH);

    let mut outlines = vec![Outline::default(); height];
    let mut row_offsets = Vec::with_capacity(height);

    if height > 0 {
        row_offsets.push(writer.get_offset());
    }

    let mut x = 0;
    let mut y = 0;
    let mut i = 0;

    while i < commands.len() {
        if y >= height {
            return Err(SlpError::RowCountMismatch { height });
        }

        let rest = &commands[i..];

        // (commands consumed, pixels covered)
        let (consumed, pixels) = match commands[i] {
            RenderCommand::NextLine => {
                writer.append_u8(SLP_END_OF_ROW);

                y += 1;
                x = 0;

                if y < height {
                    row_offsets.push(writer.get_offset());
                }

                i += 1;
                continue;
            }
            RenderCommand::Color(_) => {
                let indices = take_run(rest, |c| match c {
                    RenderCommand::Color(index) => Some(*index),
                    _ => None,
                });

                write_color_list(&mut writer, &indices);

                (indices.len(), indices.len())
            }
            RenderCommand::PlayerColor(_) => {
                let indices = take_run(rest, |c| match c {
                    RenderCommand::PlayerColor(index) => Some(*index),
                    _ => None,
                });

                write_player_color_list(&mut writer, &indices);

                (indices.len(), indices.len())
            }
            RenderCommand::Outline(thickness) => {
                let count = take_run(rest, |c| match c {
                    RenderCommand::Outline(t) if *t == thickness => Some(*t),
                    _ => None,
                })
                .len();

                write_outline(&mut writer, thickness, count);

                (count, count)
            }
            RenderCommand::Skip(count) => {
                if count > width - x {
                    return Err(SlpError::RowTooWide { row: y, width });
                }

                if x == 0 {
                    outlines[y].left = if count == width {
                        SLP_LINE_EMPTY
                    } else {
                        count as u16
                    };
                } else if x + count == width {
                    outlines[y].right = count as u16;
                } else {
                    write_skip(&mut writer, count);
                }

                (1, count)
            }
            RenderCommand::Fill { count, color } => {
                write_fill(&mut writer, SLP_FILL, count, color);
                (1, count)
            }
            RenderCommand::PlayerFill { count, color } => {
                write_fill(&mut writer, SLP_FILL_PLAYER, count, color);
                (1, count)
            }
            RenderCommand::Shadow(count) => {
                write_shadow(&mut writer, count);
                (1, count)
            }
        };

        x += pixels;
        i += consumed;

        if x > width {
            return Err(SlpError::RowTooWide { row: y, width });
        }
    }

    while y < height {
        writer.append_u8(SLP_END_OF_ROW);

        y += 1;

        if y < height {
            row_offsets.push(writer.get_offset());
        }
    }

    for (row, outline) in outlines.iter().enumerate() {
        let slot = outline_table + row * OUTLINE_ENTRY_LENGTH;

        writer.replace_with_u16(slot, outline.left);
        writer.replace_with_u16(slot + 2, outline.right);
    }

    for (row, offset) in row_offsets.iter().enumerate() {
        writer.replace_with_u32(
            row_offset_table + row * ROW_OFFSET_ENTRY_LENGTH,
            (base_offset + offset) as u32,
        );
    }

    Ok(writer.into_bytes())
}

/// Everything needed to lay out one frame in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCommands {
    pub width: u32,
    pub height: u32,
    pub hotspot: Hotspot,
    /// Copied into the directory as is. Zero for frames built from pixels.
    pub palette_offset: u32,
    /// Copied into the directory as is. Zero for frames built from pixels.
    pub properties: u32,
    pub commands: Vec<RenderCommand>,
}

/// Writes a whole SLP file: header, frame directory, then every frame body in order.
pub fn write_slp(
    version: &str,
    comment: &str,
    frames: &[FrameCommands],
) -> Result<Vec<u8>, SlpError> {
    let mut offset = HEADER_LENGTH + FRAME_ENTRY_LENGTH * frames.len();
    let mut entries = Vec::with_capacity(frames.len());
    let mut bodies = Vec::with_capacity(frames.len());

    for (index, frame) in frames.iter().enumerate() {
        let body = write_frame_body(
            &frame.commands,
            frame.width as usize,
            frame.height as usize,
            offset,
        )?;

        debug!(
            "frame {index} ({}x{}): {} bytes at {offset:#x}",
            frame.width,
            frame.height,
            body.len()
        );

        entries.push(FrameEntry {
            cmd_table_offset: (offset + frame.height as usize * OUTLINE_ENTRY_LENGTH) as u32,
            outline_table_offset: offset as u32,
            palette_offset: frame.palette_offset,
            properties: frame.properties,
            width: frame.width as i32,
            height: frame.height as i32,
            hotspot: frame.hotspot,
        });

        offset += body.len();
        bodies.push(body);
    }

    let mut writer = ByteWriter::with_capacity(offset);

    writer.append_u8_slice(&fixed_length_bytes::<VERSION_LENGTH>(version));
    writer.append_i32(frames.len() as i32);
    writer.append_u8_slice(&fixed_length_bytes::<COMMENT_LENGTH>(comment));

    entries
        .iter()
        .for_each(|entry| entry.write_to_bytes(&mut writer));

    bodies
        .iter()
        .for_each(|body| writer.append_u8_slice(body));

    Ok(writer.into_bytes())
}

#[derive(Debug, Clone)]
pub struct SlpEncoderOptions {
    pub palette: Option<Palette>,
    /// At most 4 bytes are kept.
    pub version: String,
    /// At most 24 bytes are kept.
    pub comment: String,
}

impl Default for SlpEncoderOptions {
    fn default() -> Self {
        Self {
            palette: None,
            version: DEFAULT_VERSION.to_string(),
            comment: String::new(),
        }
    }
}

/// Collects frames from pixels and writes them out as one SLP file.
#[derive(Debug)]
pub struct SlpEncoder {
    version: String,
    comment: String,
    palette: Palette,
    colors: ReversePalette,
    frames: Vec<FrameCommands>,
}

impl SlpEncoder {
    pub fn new(options: SlpEncoderOptions) -> Result<Self, SlpError> {
        let SlpEncoderOptions {
            palette,
            version,
            comment,
        } = options;

        let Some(palette) = palette else {
            return Err(SlpError::PaletteRequired);
        };

        let colors = ReversePalette::from_palette(&palette);

        Ok(Self {
            version,
            comment,
            palette,
            colors,
            frames: vec![],
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn colors(&self) -> &ReversePalette {
        &self.colors
    }

    pub fn frames(&self) -> &[FrameCommands] {
        &self.frames
    }

    /// Adds a frame from row-major RGBA pixels and returns its commands.
    pub fn add_frame(
        &mut self,
        width: u32,
        height: u32,
        data: &[u8],
        hotspot: Hotspot,
    ) -> Result<&[RenderCommand], SlpError> {
        let commands = pixels_to_commands(width as usize, height as usize, data, &self.colors)?;

        self.add_commands(width, height, hotspot, commands)
    }

    pub fn add_image(
        &mut self,
        image: &RgbaImage,
        hotspot: Hotspot,
    ) -> Result<&[RenderCommand], SlpError> {
        self.add_frame(image.width(), image.height(), image.as_raw(), hotspot)
    }

    /// Adds a frame from commands that were built elsewhere.
    ///
    /// Commands must describe whole rows, leading and trailing transparency included.
    pub fn add_commands(
        &mut self,
        width: u32,
        height: u32,
        hotspot: Hotspot,
        commands: Vec<RenderCommand>,
    ) -> Result<&[RenderCommand], SlpError> {
        if width as usize > MAX_FRAME_WIDTH || height > i32::MAX as u32 {
            return Err(SlpError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        self.frames.push(FrameCommands {
            width,
            height,
            hotspot,
            palette_offset: 0,
            properties: 0,
            commands,
        });

        Ok(self.frames[self.frames.len() - 1].commands.as_slice())
    }

    pub fn encode(&self) -> Result<Vec<u8>, SlpError> {
        write_slp(&self.version, &self.comment, &self.frames)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(commands: &[RenderCommand], width: usize, height: usize) -> Vec<u8> {
        write_frame_body(commands, width, height, 0).unwrap()
    }

    #[test]
    fn single_fill_row() {
        let bytes = write_frame_body(&[RenderCommand::Fill { count: 4, color: 7 }], 4, 1, 64)
            .unwrap();

        assert_eq!(bytes, [0, 0, 0, 0, 72, 0, 0, 0, 0x47, 7, 0x0f]);
    }

    #[test]
    fn edge_skips_become_outlines() {
        let commands = [
            RenderCommand::Skip(1),
            RenderCommand::Color(1),
            RenderCommand::Color(2),
            RenderCommand::NextLine,
            RenderCommand::Skip(3),
        ];

        assert_eq!(
            body(&commands, 3, 2),
            [
                1, 0, 0, 0, // row 0 outline
                0, 0x80, 0, 0, // row 1 outline, empty row
                16, 0, 0, 0, // row 0 offset
                20, 0, 0, 0, // row 1 offset
                0x08, 1, 2, 0x0f, // row 0
                0x0f, // row 1
            ]
        );
    }

    #[test]
    fn trailing_skip() {
        let commands = [RenderCommand::Color(5), RenderCommand::Skip(3)];

        assert_eq!(
            body(&commands, 4, 1),
            [0, 0, 3, 0, 8, 0, 0, 0, 0x04, 5, 0x0f]
        );
    }

    #[test]
    fn skip_forms() {
        let commands = [
            RenderCommand::Color(1),
            RenderCommand::Skip(2),
            RenderCommand::Color(1),
            RenderCommand::Skip(100),
            RenderCommand::Color(1),
            RenderCommand::Skip(300),
            RenderCommand::Color(1),
        ];

        assert_eq!(
            body(&commands, 406, 1)[8..],
            [0x04, 1, 0x09, 0x04, 1, 0x01, 100, 0x04, 1, 0x13, 0x2c, 0x04, 1, 0x0f]
        );
    }

    #[test]
    fn fill_forms() {
        let commands = [
            RenderCommand::Fill { count: 15, color: 2 },
            RenderCommand::Fill { count: 16, color: 3 },
            RenderCommand::Fill {
                count: 300,
                color: 4,
            },
        ];

        assert_eq!(
            body(&commands, 331, 1)[8..],
            [0xf7, 2, 0x07, 16, 3, 0x07, 255, 4, 0x07, 45, 4, 0x0f]
        );
    }

    #[test]
    fn long_color_list() {
        let commands = vec![RenderCommand::Color(6); 70];
        let bytes = body(&commands, 70, 1);

        assert_eq!(bytes[8..10], [0x02, 70]);
        assert_eq!(bytes.len(), 8 + 2 + 70 + 1);
    }

    #[test]
    fn other_commands() {
        let commands = [
            RenderCommand::PlayerColor(1),
            RenderCommand::PlayerColor(2),
            RenderCommand::PlayerFill { count: 3, color: 4 },
            RenderCommand::Shadow(20),
            RenderCommand::Outline(1),
            RenderCommand::Outline(2),
            RenderCommand::Outline(2),
            RenderCommand::NextLine,
        ];

        assert_eq!(
            body(&commands, 28, 1)[8..],
            [0x26, 1, 2, 0x3a, 4, 0x0b, 20, 0x4e, 0x7e, 2, 0x0f]
        );
    }

    #[test]
    fn long_player_color_list() {
        let commands: Vec<_> = (0..16).map(RenderCommand::PlayerColor).collect();
        let bytes = body(&commands, 16, 1);

        assert_eq!(bytes[8..11], [0x06, 16, 0]);
        assert_eq!(bytes[25..], [15, 0x0f]);
    }

    #[test]
    fn shadow_forms() {
        let commands = [RenderCommand::Shadow(3), RenderCommand::Shadow(300)];

        assert_eq!(
            body(&commands, 303, 1)[8..],
            [0x3b, 0x0b, 255, 0x0b, 45, 0x0f]
        );
    }

    #[test]
    fn row_wider_than_frame() {
        let res = write_frame_body(&[RenderCommand::Skip(70000)], 100, 1, 0);

        assert!(matches!(
            res,
            Err(SlpError::RowTooWide { row: 0, width: 100 })
        ));

        let commands = [
            RenderCommand::NextLine,
            RenderCommand::Color(1),
            RenderCommand::Fill { count: 5, color: 1 },
        ];
        let res = write_frame_body(&commands, 4, 2, 0);

        assert!(matches!(res, Err(SlpError::RowTooWide { row: 1, width: 4 })));

        // a trailing skip past the edge is not an outline either
        let commands = [RenderCommand::Color(1), RenderCommand::Skip(4)];
        let res = write_frame_body(&commands, 4, 1, 0);

        assert!(matches!(res, Err(SlpError::RowTooWide { row: 0, width: 4 })));
    }

    #[test]
    fn trailing_next_line_is_not_doubled() {
        let with = body(&[RenderCommand::Color(1), RenderCommand::NextLine], 1, 1);
        let without = body(&[RenderCommand::Color(1)], 1, 1);

        assert_eq!(with, without);
    }

    #[test]
    fn too_many_rows() {
        let res = write_frame_body(
            &[RenderCommand::NextLine, RenderCommand::Color(1)],
            1,
            1,
            0,
        );

        assert!(matches!(res, Err(SlpError::RowCountMismatch { height: 1 })));
    }

    #[test]
    fn encoder_needs_palette() {
        assert!(matches!(
            SlpEncoder::new(SlpEncoderOptions::default()),
            Err(SlpError::PaletteRequired)
        ));
    }

    #[test]
    fn encoder_keeps_palette_and_frames() {
        let mut encoder = SlpEncoder::new(SlpEncoderOptions {
            palette: Some(Palette::new(vec![[0, 0, 0], [10, 20, 30]])),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(encoder.palette().get(1), [10, 20, 30]);
        assert!(encoder.frames().is_empty());

        encoder
            .add_frame(1, 1, &[10, 20, 30, 255], Hotspot { x: 3, y: 4 })
            .unwrap();
        encoder
            .add_commands(2, 1, Hotspot::default(), vec![RenderCommand::Skip(2)])
            .unwrap();

        let frames = encoder.frames();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].hotspot, Hotspot { x: 3, y: 4 });
        assert_eq!(frames[0].commands, [RenderCommand::Color(1)]);
        assert_eq!((frames[1].width, frames[1].height), (2, 1));
        assert_eq!((frames[1].palette_offset, frames[1].properties), (0, 0));
    }

    #[test]
    fn file_layout() {
        let mut encoder = SlpEncoder::new(SlpEncoderOptions {
            palette: Some(Palette::new(vec![[0, 0, 0], [255, 255, 255]])),
            version: "2.0N".to_string(),
            comment: "a comment that is longer than twenty four bytes".to_string(),
        })
        .unwrap();

        let white = [255, 255, 255, 255];
        let pixels = [white, [0, 0, 0, 0], white, white].concat();

        let commands = encoder
            .add_frame(2, 2, &pixels, Hotspot { x: 1, y: -1 })
            .unwrap();

        assert_eq!(
            commands,
            [
                RenderCommand::Color(1),
                RenderCommand::Skip(1),
                RenderCommand::NextLine,
                RenderCommand::Fill { count: 2, color: 1 },
            ]
        );

        let bytes = encoder.encode().unwrap();

        assert_eq!(&bytes[..4], b"2.0N");
        assert_eq!(bytes[4..8], 1i32.to_le_bytes());
        assert_eq!(&bytes[8..32], b"a comment that is longer");

        // directory
        assert_eq!(bytes[32..36], 72u32.to_le_bytes());
        assert_eq!(bytes[36..40], 64u32.to_le_bytes());
        assert_eq!(bytes[48..52], 2i32.to_le_bytes());
        assert_eq!(bytes[56..60], 1i32.to_le_bytes());
        assert_eq!(bytes[60..64], (-1i32).to_le_bytes());

        // body
        assert_eq!(
            bytes[64..],
            [
                0, 0, 1, 0, // row 0 outline
                0, 0, 0, 0, // row 1 outline
                80, 0, 0, 0, // row 0 offset
                83, 0, 0, 0, // row 1 offset
                0x04, 1, 0x0f, // row 0
                0x27, 1, 0x0f, // row 1
            ]
        );
    }
}
