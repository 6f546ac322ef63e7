//! Bridge loop - cartridge snapshots in, solver moves out
//!
//! Two states: waiting for a snapshot, and processing one. Every failure
//! while processing is logged and the loop goes back to waiting; nothing
//! is written to the cartridge for that snapshot.

use std::fmt;
use std::io;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::core::{decode, translate, DecodeError, MoveCommand, RawSnapshot, TranslateError};
use crate::protocol::{parse_move, SolverResponseError};
use crate::runtime::Interrupt;
use crate::session_log::{SessionLog, SessionRecord};
use crate::solver::Solver;
use crate::transport::Transport;
use crate::types::GAME_DATA_LEN;

/// Process-wide overrides, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub level: Option<u32>,
    pub timeline: Option<String>,
}

/// Why a snapshot produced no command.
#[derive(Debug)]
pub enum Discard {
    Decode(DecodeError),
    Solver(anyhow::Error),
    Response(SolverResponseError),
    Translate(TranslateError),
    Transport(io::Error),
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discard::Decode(e) => write!(f, "decode: {e}"),
            Discard::Solver(e) => write!(f, "solver: {e:#}"),
            Discard::Response(e) => write!(f, "response: {e}"),
            Discard::Translate(e) => write!(f, "translate: {e}"),
            Discard::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

/// Outcome of one loop iteration.
#[derive(Debug)]
pub enum Step {
    /// Nothing pending on the transport.
    Idle,
    /// A wrong-length read was dropped along with `drained` buffered bytes.
    Resynced { received: usize, drained: usize },
    /// A command was written.
    Sent(MoveCommand),
    /// The snapshot was dropped.
    Discarded(Discard),
    /// The transport read itself failed; no snapshot was seen.
    ReadFailed(io::Error),
    /// The interrupt was set before this iteration started.
    Interrupted,
}

/// Solver traffic of one snapshot, kept for the session log.
#[derive(Debug, Default)]
struct Exchange {
    payload: Option<String>,
    response: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub snapshots: u64,
    pub moves_sent: u64,
    pub discarded: u64,
    pub resyncs: u64,
    pub read_errors: u64,
}

/// First pause after a failed read; doubles per consecutive failure.
const READ_RETRY_MIN: Duration = Duration::from_millis(10);
const READ_RETRY_MAX: Duration = Duration::from_millis(500);

pub struct Bridge<T, S> {
    transport: T,
    solver: S,
    config: BridgeConfig,
    interrupt: Interrupt,
    session_log: Option<SessionLog>,
    stats: BridgeStats,
    failed_reads: u32,
}

impl<T: Transport, S: Solver> Bridge<T, S> {
    pub fn new(transport: T, solver: S, config: BridgeConfig, interrupt: Interrupt) -> Self {
        Self {
            transport,
            solver,
            config,
            interrupt,
            session_log: None,
            stats: BridgeStats::default(),
            failed_reads: 0,
        }
    }

    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session_log = Some(log);
        self
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_parts(self) -> (T, S) {
        (self.transport, self.solver)
    }

    /// Run until interrupted.
    pub fn run(&mut self) -> BridgeStats {
        info!(
            level = ?self.config.level,
            timeline = self.config.timeline.as_deref().unwrap_or(crate::types::DEFAULT_TIMELINE),
            "bridge loop started"
        );
        loop {
            match self.step() {
                Step::Interrupted => break,
                Step::ReadFailed(_) => thread::sleep(self.read_retry_delay()),
                _ => {}
            }
        }
        info!(
            snapshots = self.stats.snapshots,
            moves = self.stats.moves_sent,
            discarded = self.stats.discarded,
            resyncs = self.stats.resyncs,
            read_errors = self.stats.read_errors,
            "bridge loop stopped"
        );
        self.stats
    }

    /// One iteration: read, and if a full snapshot arrived, process it.
    pub fn step(&mut self) -> Step {
        if self.interrupt.is_triggered() {
            return Step::Interrupted;
        }

        let read = self.transport.receive_data(GAME_DATA_LEN);
        if read.is_ok() && self.failed_reads > 0 {
            info!("transport recovered after {} failed reads", self.failed_reads);
            self.failed_reads = 0;
        }
        let data = match read {
            Ok(Some(data)) if !data.is_empty() => data,
            Ok(_) => return Step::Idle,
            Err(e) => {
                self.failed_reads = self.failed_reads.saturating_add(1);
                self.stats.read_errors += 1;
                // Log the first failure of a run and every 64th after it.
                if self.failed_reads % 64 == 1 {
                    error!(failures = self.failed_reads, "transport read failed: {e}");
                } else {
                    trace!("transport read failed: {e}");
                }
                return Step::ReadFailed(e);
            }
        };

        let raw = match RawSnapshot::try_from(data.as_slice()) {
            Ok(raw) => raw,
            Err(e) => {
                error!("{e}");
                let drained = self.drain();
                info!("emptied the buffer of {drained} bytes");
                self.stats.resyncs += 1;
                return Step::Resynced {
                    received: e.len,
                    drained,
                };
            }
        };

        debug!("received {} bytes", data.len());
        self.stats.snapshots += 1;

        match self.process(&raw) {
            Ok(cmd) => {
                self.stats.moves_sent += 1;
                Step::Sent(cmd)
            }
            Err(reason) => {
                warn!("no valid move: {reason}");
                self.stats.discarded += 1;
                Step::Discarded(reason)
            }
        }
    }

    fn process(&mut self, raw: &RawSnapshot) -> Result<MoveCommand, Discard> {
        let mut exchange = Exchange::default();
        let result = self.solve(raw, &mut exchange);

        if let Some(log) = self.session_log.as_mut() {
            log.record(&SessionRecord {
                payload: exchange.payload.as_deref(),
                response: exchange.response.as_deref(),
                command: result.as_ref().ok().map(MoveCommand::to_bytes),
                error: result.as_ref().err().map(ToString::to_string),
            });
        }

        result
    }

    fn solve(
        &mut self,
        raw: &RawSnapshot,
        exchange: &mut Exchange,
    ) -> Result<MoveCommand, Discard> {
        let state = decode(raw, self.config.level, self.config.timeline.as_deref())
            .map_err(Discard::Decode)?;
        trace!("board:\n{state}");
        debug!(current = %state.current_piece, next = %state.next_piece, "querying solver");

        let payload = exchange.payload.insert(state.to_solver_payload());
        let response = self.solver.best_move(payload).map_err(Discard::Solver)?;
        let response = exchange.response.insert(response);
        debug!("solver says to: {response}");

        let mv = parse_move(response).map_err(Discard::Response)?;
        let cmd = translate(state.current_piece, mv.offset, mv.x, mv.y)
            .map_err(Discard::Translate)?;

        self.transport
            .write_command(&cmd.to_bytes())
            .map_err(Discard::Transport)?;
        debug!(command = ?cmd.to_bytes(), "command written");
        Ok(cmd)
    }

    /// Pause before the next read after `failed_reads` consecutive failures.
    fn read_retry_delay(&self) -> Duration {
        let shift = self.failed_reads.saturating_sub(1).min(16);
        READ_RETRY_MIN.saturating_mul(1 << shift).min(READ_RETRY_MAX)
    }

    /// Read single bytes until the transport has nothing left.
    fn drain(&mut self) -> usize {
        let mut drained = 0usize;
        loop {
            match self.transport.receive_data(1) {
                Ok(Some(b)) if !b.is_empty() => drained += b.len(),
                Ok(_) => break,
                Err(e) => {
                    error!("transport read failed while draining: {e}");
                    break;
                }
            }
        }
        drained
    }
}
