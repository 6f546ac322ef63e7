//! Optional JSONL record of every processed snapshot.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::warn;

use crate::types::MOVE_COMMAND_LEN;

/// One processed snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord<'a> {
    pub payload: Option<&'a str>,
    pub response: Option<&'a str>,
    pub command: Option<[u8; MOVE_COMMAND_LEN]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SessionLog {
    out: Option<BufWriter<File>>,
    buf: Vec<u8>,
}

impl SessionLog {
    /// Append to `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open session log {}", path.display()))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
            buf: Vec::with_capacity(512),
        })
    }

    /// Write one record. The first failure disables the log.
    pub fn record(&mut self, rec: &SessionRecord<'_>) {
        let Some(out) = self.out.as_mut() else {
            return;
        };

        self.buf.clear();
        if let Err(e) = serde_json::to_writer(&mut self.buf, rec) {
            warn!("session log record skipped: {e}");
            return;
        }
        self.buf.push(b'\n');

        if let Err(e) = out.write_all(&self.buf).and_then(|_| out.flush()) {
            warn!("session log disabled after write error: {e}");
            self.out = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }
}
