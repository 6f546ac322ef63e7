//! Snapshot decoding - raw cartridge bytes to a playfield description
//!
//! A [`RawSnapshot`] can only be built from exactly [`GAME_DATA_LEN`] bytes,
//! so [`decode`] never sees a short or long read. Decoding yields a
//! [`PlayfieldState`], which serializes into the solver's pipe-delimited
//! payload with [`to_solver_payload`].

use std::fmt::{self, Write as _};

use crate::error::{DecodeError, SnapshotLengthError, Slot};
use crate::orientation::OrientationMap;
use crate::types::{
    PieceKind, BOARD_HEIGHT, BOARD_WIDTH, CURRENT_PIECE_OFFSET, DEFAULT_TIMELINE, EMPTY_CELL_BIT,
    GAME_DATA_LEN, LEVEL_OFFSET, LINES_BCD_OFFSET, LINES_HUNDREDS_OFFSET, NEXT_PIECE_OFFSET,
    PLAYFIELD_CELLS,
};

/// Fixed-size game state snapshot as read from the cartridge.
#[derive(Clone, PartialEq, Eq)]
pub struct RawSnapshot([u8; GAME_DATA_LEN]);

impl RawSnapshot {
    /// Raw playfield bytes, row-major from the top row.
    pub fn cells(&self) -> &[u8] {
        &self.0[..PLAYFIELD_CELLS]
    }

    pub fn current_code(&self) -> u8 {
        self.0[CURRENT_PIECE_OFFSET]
    }

    pub fn next_code(&self) -> u8 {
        self.0[NEXT_PIECE_OFFSET]
    }

    pub fn level(&self) -> u8 {
        self.0[LEVEL_OFFSET]
    }

    /// Cleared lines from the BCD tens/ones byte and the hundreds byte.
    ///
    /// Nibbles are not validated as decimal digits; the arithmetic is
    /// applied as-is.
    pub fn cleared_lines(&self) -> u32 {
        let lo = self.0[LINES_BCD_OFFSET] as u32;
        let hi = self.0[LINES_HUNDREDS_OFFSET] as u32;
        hi * 100 + (lo >> 4) * 10 + (lo & 0xF)
    }
}

impl From<[u8; GAME_DATA_LEN]> for RawSnapshot {
    fn from(value: [u8; GAME_DATA_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for RawSnapshot {
    type Error = SnapshotLengthError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; GAME_DATA_LEN] = value
            .try_into()
            .map_err(|_| SnapshotLengthError { len: value.len() })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for RawSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSnapshot")
            .field("current", &self.current_code())
            .field("next", &self.next_code())
            .field("level", &self.level())
            .field("lines", &self.cleared_lines())
            .finish_non_exhaustive()
    }
}

/// Decoded view of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayfieldState {
    /// `true` means occupied.
    pub cells: [bool; PLAYFIELD_CELLS],
    pub level: u32,
    pub cleared_lines: u32,
    pub current_piece: PieceKind,
    pub next_piece: PieceKind,
    pub timeline: String,
}

impl PlayfieldState {
    /// Playfield as the solver expects it: `'1'` occupied, `'0'` empty.
    pub fn playfield(&self) -> String {
        self.cells.iter().map(|&c| if c { '1' } else { '0' }).collect()
    }

    pub fn is_occupied(&self, x: u8, y: u8) -> bool {
        x < BOARD_WIDTH
            && y < BOARD_HEIGHT
            && self.cells[y as usize * BOARD_WIDTH as usize + x as usize]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks_exact(BOARD_WIDTH as usize)
    }

    pub fn to_solver_payload(&self) -> String {
        to_solver_payload(self)
    }
}

impl fmt::Display for PlayfieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            for &cell in row {
                f.write_char(if cell { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}

/// Decode a snapshot.
///
/// `level_override` replaces the level byte and `timeline_override` the
/// default solver timeline when present.
pub fn decode(
    raw: &RawSnapshot,
    level_override: Option<u32>,
    timeline_override: Option<&str>,
) -> Result<PlayfieldState, DecodeError> {
    let mut cells = [false; PLAYFIELD_CELLS];
    for (cell, &b) in cells.iter_mut().zip(raw.cells()) {
        *cell = b & EMPTY_CELL_BIT == 0;
    }

    let current_piece = piece_at(Slot::Current, raw.current_code())?;
    let next_piece = piece_at(Slot::Next, raw.next_code())?;

    Ok(PlayfieldState {
        cells,
        level: level_override.unwrap_or(raw.level() as u32),
        cleared_lines: raw.cleared_lines(),
        current_piece,
        next_piece,
        timeline: timeline_override.unwrap_or(DEFAULT_TIMELINE).to_string(),
    })
}

fn piece_at(slot: Slot, code: u8) -> Result<PieceKind, DecodeError> {
    OrientationMap::piece_for_code(code).ok_or(DecodeError::UnknownOrientationCode { slot, code })
}

/// Serialize a state as `playfield|level|lines|current|next|timeline|`.
///
/// Field order and the trailing pipe are fixed; the solver parses the record
/// positionally.
pub fn to_solver_payload(state: &PlayfieldState) -> String {
    let mut out = state.playfield();
    out.reserve(32 + state.timeline.len());
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "|{}|{}|{}|{}|{}|",
        state.level,
        state.cleared_lines,
        state.current_piece.solver_id(),
        state.next_piece.solver_id(),
        state.timeline,
    );
    out
}
