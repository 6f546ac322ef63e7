//! Adapter runtime integration.
//!
//! Owns the tokio runtime that the synchronous bridge loop borrows for the
//! solver socket, and the Ctrl-C watcher that asks the loop to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::{Handle, Runtime};
use tracing::info;

/// Cooperative stop flag shared between the signal watcher and the loop.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Running adapter runtime.
pub struct AdapterRuntime {
    rt: Runtime,
    interrupt: Interrupt,
}

impl AdapterRuntime {
    pub fn new() -> anyhow::Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        Ok(Self {
            rt,
            interrupt: Interrupt::new(),
        })
    }

    /// Start watching for Ctrl-C. The first signal triggers the interrupt.
    pub fn watch_ctrl_c(&self) {
        let interrupt = self.interrupt.clone();
        self.rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after this iteration");
                interrupt.trigger();
            }
        });
    }

    pub fn handle(&self) -> Handle {
        self.rt.handle().clone()
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_shared() {
        let a = Interrupt::new();
        let b = a.clone();
        assert!(!b.is_triggered());
        a.trigger();
        assert!(b.is_triggered());
    }

    #[test]
    fn test_runtime_handle_runs_tasks() {
        let rt = AdapterRuntime::new().unwrap();
        let v = rt.handle().block_on(async { 40 + 2 });
        assert_eq!(v, 42);
    }
}
