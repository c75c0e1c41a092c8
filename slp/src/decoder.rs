use log::debug;

use crate::{
    constants::{OUTLINE_ENTRY_LENGTH, ROW_OFFSET_ENTRY_LENGTH},
    error::SlpError,
    opcode::{decode_opcode, OpcodeKind},
    parser::parse_outlines,
    DecodedFrame, FrameEntry, RenderCommand,
};

/// Read position inside the shared file buffer while walking one frame.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    frame: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], offset: usize, frame: usize) -> Self {
        Self {
            bytes,
            offset,
            frame,
        }
    }

    fn next_u8(&mut self) -> Result<u8, SlpError> {
        let Some(byte) = self.bytes.get(self.offset).copied() else {
            return Err(SlpError::TruncatedFrame {
                frame: self.frame,
                offset: self.offset,
            });
        };

        self.offset += 1;

        Ok(byte)
    }

    /// An inline count of zero means the count lives in the next byte.
    fn or_next(&mut self, count: u8) -> Result<usize, SlpError> {
        if count != 0 {
            Ok(count as usize)
        } else {
            self.next_u8().map(usize::from)
        }
    }

    fn push_each(
        &mut self,
        count: usize,
        commands: &mut Vec<RenderCommand>,
        command: fn(u8) -> RenderCommand,
    ) -> Result<(), SlpError> {
        for _ in 0..count {
            commands.push(command(self.next_u8()?));
        }

        Ok(())
    }
}

fn frame_dimensions(entry: &FrameEntry) -> Result<(usize, usize), SlpError> {
    match (usize::try_from(entry.width), usize::try_from(entry.height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(SlpError::InvalidDimensions {
            width: entry.width as i64,
            height: entry.height as i64,
        }),
    }
}

/// Decodes the outline table and the opcode stream of one frame.
///
/// The row offset table between the two is skipped over. Scanlines are laid out in
/// order, so walking the stream finds every row on its own.
pub fn decode_frame(
    bytes: &[u8],
    entry: &FrameEntry,
    frame: usize,
) -> Result<DecodedFrame, SlpError> {
    let (_, height) = frame_dimensions(entry)?;

    let outline_start = entry.outline_table_offset as usize;
    let truncated_outlines = SlpError::TruncatedFrame {
        frame,
        offset: outline_start,
    };

    let Some(outline_bytes) = bytes.get(outline_start..) else {
        return Err(truncated_outlines);
    };

    if outline_bytes.len() < height * OUTLINE_ENTRY_LENGTH {
        return Err(truncated_outlines);
    }

    let (_, outlines) = parse_outlines(outline_bytes, height).map_err(|_| truncated_outlines)?;

    let mut cursor = Cursor::new(
        bytes,
        entry.cmd_table_offset as usize + height * ROW_OFFSET_ENTRY_LENGTH,
        frame,
    );
    let mut commands = vec![];
    let mut y = 0;

    while y < height {
        let offset = cursor.offset;
        let cmd = cursor.next_u8()?;

        let Some(kind) = decode_opcode(cmd) else {
            return Err(SlpError::UnsupportedOpcode {
                opcode: cmd,
                offset,
            });
        };

        match kind {
            OpcodeKind::EndOfRow => {
                commands.push(RenderCommand::NextLine);
                y += 1;
            }
            OpcodeKind::ColorList { count } => {
                cursor.push_each(count as usize, &mut commands, RenderCommand::Color)?;
            }
            OpcodeKind::Skip { count } => {
                let count = cursor.or_next(count)?;
                commands.push(RenderCommand::Skip(count));
            }
            OpcodeKind::ColorListEx { high } => {
                let count = high + cursor.next_u8()? as usize;
                cursor.push_each(count, &mut commands, RenderCommand::Color)?;
            }
            OpcodeKind::SkipEx { high } => {
                let count = high + cursor.next_u8()? as usize;
                commands.push(RenderCommand::Skip(count));
            }
            OpcodeKind::PlayerColorList { count } => {
                let count = cursor.or_next(count)?;
                cursor.push_each(count, &mut commands, RenderCommand::PlayerColor)?;
            }
            OpcodeKind::Fill { count } => {
                let count = cursor.or_next(count)?;
                let color = cursor.next_u8()?;
                commands.push(RenderCommand::Fill { count, color });
            }
            OpcodeKind::PlayerFill { count } => {
                let count = cursor.or_next(count)?;
                let color = cursor.next_u8()?;
                commands.push(RenderCommand::PlayerFill { count, color });
            }
            OpcodeKind::Shadow { count } => {
                let count = cursor.or_next(count)?;
                commands.push(RenderCommand::Shadow(count));
            }
            OpcodeKind::Outline { thickness } => {
                commands.push(RenderCommand::Outline(thickness));
            }
            OpcodeKind::OutlineRun { thickness } => {
                let count = cursor.next_u8()?;
                commands.extend((0..count).map(|_| RenderCommand::Outline(thickness)));
            }
        }
    }

    debug!(
        "decoded frame {frame}: {} rows, {} commands",
        outlines.len(),
        commands.len()
    );

    Ok(DecodedFrame { outlines, commands })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Hotspot, Outline};

    /// Frame body at offset 0, no row offset table in between.
    fn decode_stream(
        height: i32,
        outlines: &[u8],
        stream: &[u8],
    ) -> Result<DecodedFrame, SlpError> {
        let mut bytes = outlines.to_vec();
        bytes.extend_from_slice(stream);

        let entry = FrameEntry {
            cmd_table_offset: (outlines.len() as u32).saturating_sub(height as u32 * 4),
            outline_table_offset: 0,
            palette_offset: 0,
            properties: 0,
            width: 8,
            height,
            hotspot: Hotspot::default(),
        };

        decode_frame(&bytes, &entry, 0)
    }

    fn one_row(stream: &[u8]) -> Vec<RenderCommand> {
        decode_stream(1, &[0, 0, 0, 0], stream).unwrap().commands
    }

    #[test]
    fn color_list() {
        assert_eq!(
            one_row(&[0x08, 3, 4, 0x0f]),
            [
                RenderCommand::Color(3),
                RenderCommand::Color(4),
                RenderCommand::NextLine
            ]
        );
    }

    #[test]
    fn extended_color_list() {
        let mut stream = vec![0x12, 0x01];
        stream.extend(std::iter::repeat(9).take(0x101));
        stream.push(0x0f);

        let commands = one_row(&stream);

        assert_eq!(commands.len(), 0x102);
        assert!(commands[..0x101]
            .iter()
            .all(|c| *c == RenderCommand::Color(9)));
    }

    #[test]
    fn extended_skip() {
        assert_eq!(
            one_row(&[0x13, 0x2c, 0x0f]),
            [RenderCommand::Skip(300), RenderCommand::NextLine]
        );
    }

    #[test]
    fn inline_and_next_byte_counts_agree() {
        let pairs: [(&[u8], &[u8]); 5] = [
            (&[0x15, 0x0f], &[0x01, 5, 0x0f]),
            (&[0x26, 1, 2, 0x0f], &[0x06, 2, 1, 2, 0x0f]),
            (&[0x37, 8, 0x0f], &[0x07, 3, 8, 0x0f]),
            (&[0x3a, 8, 0x0f], &[0x0a, 3, 8, 0x0f]),
            (&[0x2b, 0x0f], &[0x0b, 2, 0x0f]),
        ];

        for (inline, next_byte) in pairs {
            assert_eq!(one_row(inline), one_row(next_byte));
        }

        assert_eq!(
            one_row(&[0x07, 3, 8, 0x0f])[0],
            RenderCommand::Fill { count: 3, color: 8 }
        );
    }

    #[test]
    fn outline_runs() {
        assert_eq!(
            one_row(&[0x4e, 0x7e, 2, 0x0f]),
            [
                RenderCommand::Outline(1),
                RenderCommand::Outline(2),
                RenderCommand::Outline(2),
                RenderCommand::NextLine
            ]
        );
    }

    #[test]
    fn stops_after_last_row() {
        let frame = decode_stream(2, &[0, 0, 0, 0, 0, 0x80, 0, 0], &[0x04, 1, 0x0f, 0x0f, 0xee])
            .unwrap();

        assert_eq!(frame.outlines[1], Outline { left: 0x8000, right: 0 });
        assert_eq!(frame.commands.len(), 3);
    }

    #[test]
    fn unsupported() {
        let res = decode_stream(1, &[0, 0, 0, 0], &[0x04, 1, 0x8e, 0x0f]);

        assert!(matches!(
            res,
            Err(SlpError::UnsupportedOpcode {
                opcode: 0x8e,
                offset: 6
            })
        ));
    }

    #[test]
    fn truncated_stream() {
        let res = decode_stream(1, &[0, 0, 0, 0], &[0x0c, 1, 2]);

        assert!(matches!(
            res,
            Err(SlpError::TruncatedFrame { frame: 0, offset: 7 })
        ));
    }

    #[test]
    fn truncated_outlines() {
        let res = decode_stream(2, &[0, 0, 0, 0], &[]);

        assert!(matches!(res, Err(SlpError::TruncatedFrame { .. })));
    }
}
