//! Shared types and constants for the Everdrive Tetris bridge.
//!
//! Everything here is plain data with no dependencies, usable by the decoder,
//! the translator and the adapter alike.
//!
//! # Snapshot Layout
//!
//! The cartridge streams a fixed 205-byte snapshot of its game state:
//!
//! | Offset | Size | Meaning |
//! |--------|------|---------|
//! | 0 | 200 | Playfield cells, bit `0x80` set means empty |
//! | 200 | 1 | Current piece spawn orientation code |
//! | 201 | 1 | Next piece spawn orientation code |
//! | 202 | 1 | Level number |
//! | 203 | 1 | Cleared lines, BCD tens (high nibble) and ones (low nibble) |
//! | 204 | 1 | Cleared lines hundreds digit |
//!
//! # Move Command
//!
//! The bridge answers with three bytes: the spawn orientation code to place,
//! the target row, and the target column in device coordinates
//! (`COLUMN_ORIGIN + x`).
//!
//! # Examples
//!
//! ```
//! use everdrive_tetris_types::{PieceKind, GAME_DATA_LEN, PLAYFIELD_CELLS};
//!
//! assert_eq!(GAME_DATA_LEN, 205);
//! assert_eq!(PLAYFIELD_CELLS, 200);
//!
//! let piece = PieceKind::from_solver_id(4).unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.solver_id(), 4);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Number of playfield cells in a snapshot
pub const PLAYFIELD_CELLS: usize = BOARD_WIDTH as usize * BOARD_HEIGHT as usize;

/// Total snapshot length in bytes
pub const GAME_DATA_LEN: usize = 205;

pub const CURRENT_PIECE_OFFSET: usize = 200;
pub const NEXT_PIECE_OFFSET: usize = 201;
pub const LEVEL_OFFSET: usize = 202;
pub const LINES_BCD_OFFSET: usize = 203;
pub const LINES_HUNDREDS_OFFSET: usize = 204;

/// Cell bit meaning "empty" in the raw playfield
pub const EMPTY_CELL_BIT: u8 = 0x80;

/// Length of the command written back to the cartridge
pub const MOVE_COMMAND_LEN: usize = 3;

/// Solver columns are shifted left by this much relative to the device.
pub const COLUMN_ORIGIN: i32 = 5;

/// Largest solver column accepted by the translator.
pub const MAX_MOVE_X: i32 = 5;

/// Largest row accepted by the translator.
pub const MAX_MOVE_Y: i32 = 19;

/// Largest rotation offset accepted by the translator.
pub const MAX_MOVE_OFFSET: i32 = 3;

/// Solver input timeline for 8 Hz tapping, used when none is configured.
pub const DEFAULT_TIMELINE: &str = "X......";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_layout_is_contiguous() {
        assert_eq!(CURRENT_PIECE_OFFSET, PLAYFIELD_CELLS);
        assert_eq!(NEXT_PIECE_OFFSET, CURRENT_PIECE_OFFSET + 1);
        assert_eq!(LEVEL_OFFSET, NEXT_PIECE_OFFSET + 1);
        assert_eq!(LINES_BCD_OFFSET, LEVEL_OFFSET + 1);
        assert_eq!(LINES_HUNDREDS_OFFSET, LINES_BCD_OFFSET + 1);
        assert_eq!(GAME_DATA_LEN, LINES_HUNDREDS_OFFSET + 1);
    }

    #[test]
    fn solver_ids_round_trip() {
        for id in 0..7u8 {
            let kind = PieceKind::from_solver_id(id).unwrap();
            assert_eq!(kind.solver_id(), id);
        }
        assert_eq!(PieceKind::from_solver_id(7), None);
    }
}

/// The seven tetromino piece kinds
///
/// The declaration order is the solver's own numbering: I=0, O=1, L=2,
/// J=3, T=4, S=5, Z=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    O,
    L,
    J,
    T,
    S,
    Z,
}

impl PieceKind {
    /// All kinds in solver id order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::L,
        PieceKind::J,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Solver piece id (0-6)
    pub fn solver_id(&self) -> u8 {
        *self as u8
    }

    /// Look up a piece by solver id
    ///
    /// # Examples
    ///
    /// ```
    /// use everdrive_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_solver_id(0), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_solver_id(6), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_solver_id(9), None);
    /// ```
    pub fn from_solver_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spawn orientation code as used by the cartridge.
///
/// A code identifies both piece kind and rotation; codes 0-18 cover the 19
/// reachable orientations.
pub type OrientationCode = u8;
