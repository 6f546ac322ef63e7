//! Adapter - cartridge link, solver client and the bridge loop
//!
//! This crate connects the pure decoding/translation logic of
//! `everdrive-tetris-core` to the outside world: a serial link to the
//! Everdrive cartridge on one side and a move solver on the other.
//!
//! # Loop Overview
//!
//! 1. **Read**: ask the transport for a 205-byte snapshot
//! 2. **Resync**: a read of any other length is dropped and the link drained
//! 3. **Decode**: snapshot -> playfield state -> pipe-delimited payload
//! 4. **Solve**: payload -> solver -> `(offset, x, y)` answer line
//! 5. **Translate**: answer -> 3-byte command -> transport
//!
//! Any failure in steps 3-5 drops that snapshot and the loop carries on.
//!
//! # Solver Protocol
//!
//! Line-delimited over TCP (default `127.0.0.1:3000`):
//!
//! ```text
//! -> 0000000000...0000|18|120|4|2|X......|
//! <- (1, -2, 17)
//! ```
//!
//! # Implementation
//!
//! - The loop is synchronous; tokio is only used for the solver socket and
//!   the Ctrl-C watcher (see [`runtime`])
//! - See [`protocol`] for the answer grammar
//! - See [`transport`] for the serial link

pub mod bridge;
pub mod protocol;
pub mod runtime;
pub mod session_log;
pub mod solver;
pub mod transport;

pub use everdrive_tetris_core as core;
pub use everdrive_tetris_types as types;

pub use bridge::{Bridge, BridgeConfig, BridgeStats, Discard, Step};
pub use protocol::{parse_move, SolverMove, SolverResponseError};
pub use runtime::{AdapterRuntime, Interrupt};
pub use session_log::{SessionLog, SessionRecord};
pub use solver::{Solver, SolverConfig, SolverConnection, TcpSolver};
pub use transport::{SerialConfig, SerialTransport, Transport};
