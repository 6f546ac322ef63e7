//! Solver client
//!
//! The solver is an external service reached over TCP with the line protocol
//! from [`crate::protocol`]. The bridge loop is synchronous, so [`TcpSolver`]
//! drives its async socket through a tokio [`Handle`].

use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Handle;

use crate::protocol::encode_request;

/// Anything that can answer "where should this piece go?".
pub trait Solver {
    /// Send one payload, return the raw answer line.
    fn best_move(&mut self, payload: &str) -> anyhow::Result<String>;
}

impl<F> Solver for F
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    fn best_move(&mut self, payload: &str) -> anyhow::Result<String> {
        self(payload)
    }
}

/// Solver client configuration
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            timeout_ms: 1000,
        }
    }
}

impl SolverConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// One open line-protocol connection to the solver.
pub struct SolverConnection {
    stream: BufReader<TcpStream>,
    line: String,
}

impl SolverConnection {
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("connecting to solver at {addr}"))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: BufReader::new(stream),
            line: String::new(),
        })
    }

    /// Write one request line and wait for one answer line.
    pub async fn request(&mut self, payload: &str) -> anyhow::Result<String> {
        let writer = self.stream.get_mut();
        writer.write_all(encode_request(payload).as_bytes()).await?;
        writer.flush().await?;

        self.line.clear();
        let n = self.stream.read_line(&mut self.line).await?;
        if n == 0 {
            return Err(anyhow!("solver closed the connection"));
        }
        Ok(self
            .line
            .trim_end_matches(|c| c == '\n' || c == '\r')
            .to_string())
    }
}

/// Blocking solver client over TCP.
///
/// A failed request drops the connection; the next request reconnects.
pub struct TcpSolver {
    handle: Handle,
    config: SolverConfig,
    conn: Option<SolverConnection>,
}

impl TcpSolver {
    /// Connect eagerly so a missing solver is reported at startup.
    pub fn connect(handle: Handle, config: SolverConfig) -> anyhow::Result<Self> {
        let conn = handle.block_on(async {
            tokio::time::timeout(config.timeout(), SolverConnection::connect(&config.addr()))
                .await
                .map_err(|_| anyhow!("timed out connecting to solver at {}", config.addr()))?
        })?;
        Ok(Self {
            handle,
            config,
            conn: Some(conn),
        })
    }
}

impl Solver for TcpSolver {
    fn best_move(&mut self, payload: &str) -> anyhow::Result<String> {
        let timeout = self.config.timeout();
        let addr = self.config.addr();
        let conn = self.conn.take();

        let result = self.handle.block_on(async move {
            tokio::time::timeout(timeout, async move {
                let mut conn = match conn {
                    Some(c) => c,
                    None => SolverConnection::connect(&addr).await?,
                };
                let answer = conn.request(payload).await?;
                Ok::<_, anyhow::Error>((conn, answer))
            })
            .await
            .map_err(|_| anyhow!("solver did not answer within {timeout:?}"))?
        });

        match result {
            Ok((conn, answer)) => {
                self.conn = Some(conn);
                Ok(answer)
            }
            Err(e) => Err(e),
        }
    }
}
