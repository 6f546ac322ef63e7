//! Core bridge logic - pure, deterministic, and testable
//!
//! This crate turns a raw cartridge snapshot into the solver's input and the
//! solver's answer into cartridge command bytes. It has **no I/O**: the
//! transport and the solver live in the adapter crate.
//!
//! # Module Structure
//!
//! - [`snapshot`]: 205-byte snapshot, decoding, solver payload serialization
//! - [`orientation`]: spawn orientation codes vs. solver piece ids and offsets
//! - [`translate`]: solver placement to the 3-byte move command
//! - [`error`]: decode and translate errors
//!
//! # Example
//!
//! ```
//! use everdrive_tetris_core::{decode, translate, RawSnapshot};
//! use everdrive_tetris_types::GAME_DATA_LEN;
//!
//! let mut raw = [0x80u8; GAME_DATA_LEN];
//! raw[200] = 18; // I
//! raw[201] = 10; // O
//! raw[202] = 5;
//! raw[203] = 0x00;
//! raw[204] = 0;
//!
//! let state = decode(&RawSnapshot::from(raw), None, None).unwrap();
//! assert!(state.to_solver_payload().ends_with("|5|0|0|1|X......|"));
//!
//! let cmd = translate(state.current_piece, 0, 3, 10).unwrap();
//! assert_eq!(cmd.to_bytes(), [18, 10, 8]);
//! ```

pub mod error;
pub mod orientation;
pub mod snapshot;
pub mod translate;

pub use everdrive_tetris_types as types;

pub use error::{DecodeError, SnapshotLengthError, Slot, TranslateError};
pub use orientation::OrientationMap;
pub use snapshot::{decode, to_solver_payload, PlayfieldState, RawSnapshot};
pub use translate::{translate, MoveCommand};
