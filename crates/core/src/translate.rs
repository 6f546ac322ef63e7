//! Move translation - solver placement to cartridge command bytes

use crate::error::TranslateError;
use crate::orientation::OrientationMap;
use crate::types::{
    OrientationCode, PieceKind, COLUMN_ORIGIN, MAX_MOVE_OFFSET, MAX_MOVE_X, MAX_MOVE_Y,
    MOVE_COMMAND_LEN,
};

/// Three-byte command understood by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCommand {
    pub orientation: OrientationCode,
    pub row: u8,
    pub column: u8,
}

impl MoveCommand {
    pub fn to_bytes(&self) -> [u8; MOVE_COMMAND_LEN] {
        [self.orientation, self.row, self.column]
    }
}

impl From<MoveCommand> for [u8; MOVE_COMMAND_LEN] {
    fn from(value: MoveCommand) -> Self {
        value.to_bytes()
    }
}

/// Translate the solver's `(offset, x, y)` for `piece` into a command.
///
/// Only upper bounds are range-checked (`x <= 5`, `y <= 19`,
/// `offset <= 3`); the solver is trusted for the rest. A negative offset
/// falls through to the orientation lookup and fails there. Values that do
/// not fit in a command byte after shifting are reported as out of range.
pub fn translate(
    piece: PieceKind,
    offset: i32,
    x: i32,
    y: i32,
) -> Result<MoveCommand, TranslateError> {
    if x > MAX_MOVE_X || y > MAX_MOVE_Y || offset > MAX_MOVE_OFFSET {
        return Err(TranslateError::MoveOutOfRange { offset, x, y });
    }

    let orientation = OrientationMap::code_for(piece, offset)
        .ok_or(TranslateError::UnknownOrientationMapping { piece, offset })?;

    let row = u8::try_from(y).map_err(|_| TranslateError::MoveOutOfRange { offset, x, y })?;
    let column = u8::try_from(COLUMN_ORIGIN + x)
        .map_err(|_| TranslateError::MoveOutOfRange { offset, x, y })?;

    Ok(MoveCommand {
        orientation,
        row,
        column,
    })
}
