use nom::{
    bytes::complete::take,
    combinator::map,
    multi::count,
    number::complete::{le_i32, le_u16, le_u32},
    IResult as _IResult, Parser,
};

use crate::{
    constants::{COMMENT_LENGTH, FRAME_ENTRY_LENGTH, HEADER_LENGTH, VERSION_LENGTH},
    error::SlpError,
    FrameEntry, Header, Hotspot, Outline,
};

pub type IResult<'a, T> = _IResult<&'a [u8], T>;

fn fixed_bytes<const N: usize>(i: &'_ [u8]) -> IResult<'_, [u8; N]> {
    map(take(N), |bytes: &[u8]| {
        let mut res = [0u8; N];
        res.copy_from_slice(bytes);
        res
    })
    .parse(i)
}

pub fn parse_frame_entry(i: &'_ [u8]) -> IResult<'_, FrameEntry> {
    map(
        (
            le_u32, le_u32, le_u32, le_u32, le_i32, le_i32, le_i32, le_i32,
        ),
        |(
            cmd_table_offset,
            outline_table_offset,
            palette_offset,
            properties,
            width,
            height,
            x,
            y,
        )| FrameEntry {
            cmd_table_offset,
            outline_table_offset,
            palette_offset,
            properties,
            width,
            height,
            hotspot: Hotspot { x, y },
        },
    )
    .parse(i)
}

fn parse_outline(i: &'_ [u8]) -> IResult<'_, Outline> {
    map((le_u16, le_u16), |(left, right)| Outline { left, right }).parse(i)
}

pub fn parse_outlines(i: &'_ [u8], height: usize) -> IResult<'_, Vec<Outline>> {
    count(parse_outline, height).parse(i)
}

/// Reads the fixed header and the frame directory right behind it.
///
/// The buffer length is checked against the directory size before anything is parsed.
pub fn parse_header(i: &[u8]) -> Result<Header, SlpError> {
    if i.len() < HEADER_LENGTH {
        return Err(SlpError::TruncatedHeader {
            expected: HEADER_LENGTH,
            actual: i.len(),
        });
    }

    let (rest, (version, frame_count, comment)) = (
        fixed_bytes::<VERSION_LENGTH>,
        le_i32,
        fixed_bytes::<COMMENT_LENGTH>,
    )
        .parse(i)
        .map_err(|op| SlpError::NomError {
            source: op.to_owned(),
        })?;

    let Ok(frame_num) = usize::try_from(frame_count) else {
        return Err(SlpError::InvalidFrameCount { count: frame_count });
    };

    let expected = HEADER_LENGTH + FRAME_ENTRY_LENGTH * frame_num;

    if i.len() < expected {
        return Err(SlpError::TruncatedHeader {
            expected,
            actual: i.len(),
        });
    }

    let (_, frames) = count(parse_frame_entry, frame_num)
        .parse(rest)
        .map_err(|op| SlpError::NomError {
            source: op.to_owned(),
        })?;

    Ok(Header {
        version,
        frame_count,
        comment,
        frames,
    })
}
