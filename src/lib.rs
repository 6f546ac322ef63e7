//! Everdrive Tetris bridge (workspace facade crate).
//!
//! Re-exports the workspace crates as `everdrive_tetris::{adapter,core,types}`
//! and holds the command-line configuration of the binary.

pub mod cli;

pub use everdrive_tetris_adapter as adapter;
pub use everdrive_tetris_core as core;
pub use everdrive_tetris_types as types;
