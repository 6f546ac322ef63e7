//! Orientation map - cartridge spawn codes vs. solver piece numbering
//!
//! The cartridge names every reachable (piece, rotation) pair with one
//! orientation code. The solver names pieces 0-6 and rotations by an offset
//! from the piece's spawn rotation. Both directions are fixed tables.

use arrayvec::ArrayVec;

use crate::types::{OrientationCode, PieceKind};

/// Static lookup tables between the two numbering schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationMap;

impl OrientationMap {
    /// Spawn orientation code -> piece. One entry per piece.
    pub const FORWARD: [(OrientationCode, PieceKind); 7] = [
        (18, PieceKind::I),
        (10, PieceKind::O),
        (14, PieceKind::L),
        (7, PieceKind::J),
        (2, PieceKind::T),
        (11, PieceKind::S),
        (8, PieceKind::Z),
    ];

    /// (piece, offset) -> orientation code. Offset 0 is the spawn rotation.
    pub const REVERSE: [(PieceKind, u8, OrientationCode); 19] = [
        (PieceKind::I, 0, 18), // vertical
        (PieceKind::I, 1, 17), // horizontal
        (PieceKind::O, 0, 10),
        (PieceKind::L, 0, 14), // down
        (PieceKind::L, 1, 15), // left
        (PieceKind::L, 2, 16), // up
        (PieceKind::L, 3, 13), // right
        (PieceKind::J, 0, 7),  // down
        (PieceKind::J, 1, 4),  // left
        (PieceKind::J, 2, 5),  // up
        (PieceKind::J, 3, 6),  // right
        (PieceKind::T, 0, 2),  // down
        (PieceKind::T, 1, 3),  // left
        (PieceKind::T, 2, 0),  // up
        (PieceKind::T, 3, 1),  // right
        (PieceKind::S, 0, 11), // horizontal
        (PieceKind::S, 1, 12), // vertical
        (PieceKind::Z, 0, 8),  // horizontal
        (PieceKind::Z, 1, 9),  // vertical
    ];

    /// Piece identity for a spawn orientation code.
    ///
    /// Only the seven spawn codes are keys; a rotated code such as 17
    /// (horizontal I) is never sent as a spawn piece and yields `None`.
    pub fn piece_for_code(code: OrientationCode) -> Option<PieceKind> {
        Self::FORWARD
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// Orientation code for a piece rotated by `offset`.
    ///
    /// Returns `None` when the piece has no such rotation, including any
    /// negative offset.
    pub fn code_for(piece: PieceKind, offset: i32) -> Option<OrientationCode> {
        let offset = u8::try_from(offset).ok()?;
        Self::REVERSE
            .iter()
            .find(|(kind, off, _)| *kind == piece && *off == offset)
            .map(|(_, _, code)| *code)
    }

    /// All orientation codes of a piece, ordered by offset.
    pub fn orientations(piece: PieceKind) -> ArrayVec<OrientationCode, 4> {
        Self::REVERSE
            .iter()
            .filter(|(kind, _, _)| *kind == piece)
            .map(|(_, _, code)| *code)
            .collect()
    }

    /// Spawn orientation code of a piece (offset 0).
    pub fn spawn_code(piece: PieceKind) -> OrientationCode {
        Self::FORWARD
            .iter()
            .find(|(_, kind)| *kind == piece)
            .map(|(code, _)| *code)
            .unwrap_or_else(|| unreachable!("every piece has a spawn code"))
    }
}
