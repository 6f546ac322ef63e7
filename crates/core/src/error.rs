//! Error types for snapshot decoding and move translation.

use std::fmt;

use crate::types::{PieceKind, GAME_DATA_LEN};

/// A buffer of the wrong size was offered as a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLengthError {
    pub len: usize,
}

impl fmt::Display for SnapshotLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "received {} bytes, expected {}", self.len, GAME_DATA_LEN)
    }
}

impl std::error::Error for SnapshotLengthError {}

/// Which piece byte of the snapshot a decode error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Next,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Current => "current",
            Slot::Next => "next",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Piece byte is not one of the seven spawn orientation codes.
    UnknownOrientationCode { slot: Slot, code: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownOrientationCode { slot, code } => {
                write!(f, "unknown {} piece orientation code {}", slot.as_str(), code)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Offset, column or row outside what the cartridge accepts.
    MoveOutOfRange { offset: i32, x: i32, y: i32 },
    /// The piece has no rotation with this offset.
    UnknownOrientationMapping { piece: PieceKind, offset: i32 },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::MoveOutOfRange { offset, x, y } => {
                write!(f, "move out of range (offset={offset}, x={x}, y={y})")
            }
            TranslateError::UnknownOrientationMapping { piece, offset } => {
                write!(f, "no orientation for piece {piece} at offset {offset}")
            }
        }
    }
}

impl std::error::Error for TranslateError {}
