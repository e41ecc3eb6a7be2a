//! Shutdown signal handling
//!
//! SIGINT and SIGTERM take the same graceful path. Handlers are installed
//! before anything is loaded so an early Ctrl-C is not lost: the pending
//! signal completes [`ShutdownSignals::wait`] as soon as the session reaches
//! it.

use std::fmt;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Which signal ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => f.write_str("SIGINT"),
            ShutdownReason::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installed SIGINT/SIGTERM listeners
pub struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignals {
    /// Register the signal listeners
    ///
    /// # Errors
    /// Returns an error if the handlers cannot be registered
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Block until SIGINT or SIGTERM arrives
    pub async fn wait(mut self) -> ShutdownReason {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownReason::Interrupt,
            _ = self.terminate.recv() => ShutdownReason::Terminate,
        }
    }
}
