//! Solver wire protocol
//!
//! Requests are the pipe-delimited payload produced by the core decoder,
//! terminated by a newline. The solver answers with one line holding the
//! chosen placement as three integers `offset, x, y`, optionally wrapped in
//! `(...)` or `[...]`:
//!
//! ```text
//! -> 0000...0000|18|120|4|2|X......|
//! <- (1, -2, 17)
//! ```
//!
//! The answer is parsed strictly. It is data, never code.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Placement chosen by the solver, in solver coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolverMove {
    /// Rotation offset from the spawn rotation.
    pub offset: i32,
    /// Column, origin-shifted relative to the device.
    pub x: i32,
    /// Target row.
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResponseError {
    Empty,
    UnbalancedBrackets,
    FieldCount { found: usize },
    InvalidField { index: usize, field: String },
}

impl fmt::Display for SolverResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResponseError::Empty => write!(f, "empty solver response"),
            SolverResponseError::UnbalancedBrackets => {
                write!(f, "solver response has unbalanced brackets")
            }
            SolverResponseError::FieldCount { found } => {
                write!(f, "solver response has {found} fields, expected 3")
            }
            SolverResponseError::InvalidField { index, field } => {
                write!(f, "solver response field {index} is not an integer: {field:?}")
            }
        }
    }
}

impl std::error::Error for SolverResponseError {}

/// Parse a solver answer into a [`SolverMove`].
pub fn parse_move(response: &str) -> Result<SolverMove, SolverResponseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(SolverResponseError::Empty);
    }

    let inner = strip_brackets(trimmed)?;

    let mut fields = ArrayVec::<i32, 3>::new();
    let mut found = 0usize;
    for (index, field) in inner.split(',').enumerate() {
        found += 1;
        let field = field.trim();
        let value = field
            .parse::<i32>()
            .map_err(|_| SolverResponseError::InvalidField {
                index,
                field: field.to_string(),
            })?;
        if fields.try_push(value).is_err() {
            // Count the rest so the error reports the real arity.
            found += inner.split(',').skip(index + 1).count();
            return Err(SolverResponseError::FieldCount { found });
        }
    }

    match fields.as_slice() {
        &[offset, x, y] => Ok(SolverMove { offset, x, y }),
        _ => Err(SolverResponseError::FieldCount { found }),
    }
}

fn strip_brackets(s: &str) -> Result<&str, SolverResponseError> {
    let open = s.chars().next();
    let close = s.chars().last();
    match (open, close) {
        (Some('('), Some(')')) | (Some('['), Some(']')) => Ok(&s[1..s.len() - 1]),
        (Some('(' | '['), _) | (_, Some(')' | ']')) => Err(SolverResponseError::UnbalancedBrackets),
        _ => Ok(s),
    }
}

/// Frame a payload as one request line.
pub fn encode_request(payload: &str) -> String {
    let mut line = String::with_capacity(payload.len() + 1);
    line.push_str(payload);
    line.push('\n');
    line
}
