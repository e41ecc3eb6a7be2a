//! Tracing session: start delivery, wait for shutdown, tear down
//!
//! Teardown runs in reverse acquisition order: stop the pump, detach the
//! program, then let the consumer drain what is already queued.

use std::future::Future;
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;

use super::{Attached, EventPump, ProgramHost};
use crate::domain::PumpError;
use crate::shutdown::ShutdownReason;

/// How long the consumer may take to drain queued samples after shutdown
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of a completed session
#[derive(Debug)]
pub struct SessionReport<T> {
    pub reason: ShutdownReason,
    /// Consumer state after draining, `None` if it had to be aborted
    pub consumer: Option<T>,
}

/// Run one tracing session until `shutdown` resolves
///
/// The program is detached exactly once on every path out of this function.
///
/// # Errors
/// Returns [`PumpError`] if event delivery cannot start; the program is
/// detached and the consumer aborted before returning
pub async fn run_session<H, P, T, F>(
    attached: Attached<H>,
    mut pump: P,
    mut consumer: JoinHandle<T>,
    shutdown: F,
) -> Result<SessionReport<T>, PumpError>
where
    H: ProgramHost,
    P: EventPump,
    F: Future<Output = ShutdownReason>,
{
    if let Err(e) = pump.start() {
        pump.stop();
        attached.detach();
        consumer.abort();
        return Err(e);
    }

    let reason = shutdown.await;
    info!("Received {reason}, shutting down");

    pump.stop();
    attached.detach();

    let consumer = match tokio::time::timeout(DRAIN_TIMEOUT, &mut consumer).await {
        Ok(Ok(state)) => Some(state),
        Ok(Err(e)) => {
            warn!("Event consumer task failed: {e}");
            None
        }
        Err(_) => {
            warn!("Event consumer did not drain within {DRAIN_TIMEOUT:?}, aborting");
            consumer.abort();
            None
        }
    };

    Ok(SessionReport { reason, consumer })
}
