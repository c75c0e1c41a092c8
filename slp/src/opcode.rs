//! Classifies a command byte without touching the stream around it.
//!
//! A command byte is read through three overlapping views: the low 2 bits, the low nibble
//! and the high nibble. The checks below run in a fixed priority order, so for example
//! `0x0d` is a skip (low bits `01`) even though its low nibble is otherwise unused.
use crate::constants::{
    SLP_COLOR_LIST, SLP_COLOR_LIST_EX, SLP_COLOR_LIST_PLAYER, SLP_END_OF_ROW, SLP_EXTENDED,
    SLP_EX_FILL_OUTLINE1, SLP_EX_FILL_OUTLINE2, SLP_EX_OUTLINE1, SLP_EX_OUTLINE2, SLP_FILL,
    SLP_FILL_PLAYER, SLP_SHADOW, SLP_SKIP, SLP_SKIP_EX,
};

/// Counts named `count` may be zero, in which case the real count is the next byte.
///
/// Counts named `high` are already shifted into place and still need the next byte added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    EndOfRow,
    ColorList { count: u8 },
    Skip { count: u8 },
    ColorListEx { high: usize },
    SkipEx { high: usize },
    PlayerColorList { count: u8 },
    Fill { count: u8 },
    PlayerFill { count: u8 },
    Shadow { count: u8 },
    Outline { thickness: u8 },
    /// Repeat count is the next byte.
    OutlineRun { thickness: u8 },
}

pub fn decode_opcode(cmd: u8) -> Option<OpcodeKind> {
    let low_nibble = cmd & 0x0f;
    let high_nibble = cmd & 0xf0;
    let low_bits = cmd & 0x03;

    let kind = if low_nibble == SLP_END_OF_ROW {
        OpcodeKind::EndOfRow
    } else if low_bits == SLP_COLOR_LIST {
        OpcodeKind::ColorList { count: cmd >> 2 }
    } else if low_bits == SLP_SKIP {
        OpcodeKind::Skip { count: cmd >> 2 }
    } else if low_nibble == SLP_COLOR_LIST_EX {
        OpcodeKind::ColorListEx {
            high: (high_nibble as usize) << 4,
        }
    } else if low_nibble == SLP_SKIP_EX {
        OpcodeKind::SkipEx {
            high: (high_nibble as usize) << 4,
        }
    } else if low_nibble == SLP_COLOR_LIST_PLAYER {
        OpcodeKind::PlayerColorList { count: cmd >> 4 }
    } else if low_nibble == SLP_FILL {
        OpcodeKind::Fill { count: cmd >> 4 }
    } else if low_nibble == SLP_FILL_PLAYER {
        OpcodeKind::PlayerFill { count: cmd >> 4 }
    } else if low_nibble == SLP_SHADOW {
        OpcodeKind::Shadow { count: cmd >> 4 }
    } else if low_nibble == SLP_EXTENDED {
        match high_nibble {
            SLP_EX_OUTLINE1 => OpcodeKind::Outline { thickness: 1 },
            SLP_EX_OUTLINE2 => OpcodeKind::Outline { thickness: 2 },
            SLP_EX_FILL_OUTLINE1 => OpcodeKind::OutlineRun { thickness: 1 },
            SLP_EX_FILL_OUTLINE2 => OpcodeKind::OutlineRun { thickness: 2 },
            _ => return None,
        }
    } else {
        return None;
    };

    Some(kind)
}
