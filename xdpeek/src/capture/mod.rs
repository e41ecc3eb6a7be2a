//! Capture pipeline
//!
//! Everything between the kernel and the trace lines:
//! - Program lifecycle (load, attach, guaranteed detach)
//! - aya-backed program host
//! - Per-CPU perf buffer pump
//! - Event consumer task
//! - Session orchestration and teardown

pub mod aya_host;
pub mod consumer;
pub mod cpu_utils;
pub mod lifecycle;
pub mod pump;
pub mod session;

// Re-export common types
pub use aya_host::AyaHost;
pub use consumer::{ConsumerStats, EventConsumer};
pub use cpu_utils::online_cpus;
pub use lifecycle::{Attached, Loaded, ProgramHost, Unloaded};
pub use pump::{EventPump, PerfEventPump};
pub use session::{run_session, SessionReport, DRAIN_TIMEOUT};
