//! Structured error types for xdpeek
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Startup errors are fatal and surface through `anyhow` in `main`; decode
//! errors stay inside the consumer loop; detach errors are only logged.

use std::path::PathBuf;

use thiserror::Error;

use super::types::{CpuId, Interface};

// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_NOPERM: i32 = 77;

/// Loading the byte-code artifact or its entry function failed
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read program file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse program object: {0}")]
    Parse(String),

    #[error("Program object targets {0}, expected BPF")]
    NotBpf(String),

    #[error("Program {0} not found in object")]
    MissingProgram(String),

    #[error("Program {name} is not an XDP program: {reason}")]
    WrongProgramType { name: String, reason: String },

    #[error("Kernel rejected program {name}: {reason}")]
    Verify { name: String, reason: String },
}

/// Binding the loaded program to an interface failed
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("Interface {0} does not exist")]
    UnknownInterface(Interface),

    #[error("Failed to attach XDP program to interface {iface}: {reason}")]
    Rejected { iface: Interface, reason: String },
}

/// Releasing the interface binding failed (logged, never propagated)
#[derive(Error, Debug)]
#[error("Failed to detach XDP program from interface {iface}: {reason}")]
pub struct DetachError {
    pub iface: Interface,
    pub reason: String,
}

/// A raw record could not be turned into a `NetworkEvent`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Record too short: {len} bytes, expected at least {expected}")]
    Truncated { len: usize, expected: usize },
}

/// The system boot time could not be determined
#[derive(Error, Debug)]
#[error("Cannot determine system boot time (clock: {clock}; /proc/stat: {proc_stat})")]
pub struct BootTimeError {
    pub clock: String,
    pub proc_stat: String,
}

/// The event delivery pump could not be set up
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("Event map {0} not found in program object")]
    MissingMap(String),

    #[error("Event map {name} is not a perf event array: {reason}")]
    Map { name: String, reason: String },

    #[error("Failed to read online CPUs: {0}")]
    OnlineCpus(String),

    #[error("Failed to open perf buffer on {cpu}: {reason}")]
    OpenBuffer { cpu: CpuId, reason: String },
}

/// Host requirements not met before anything is loaded
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error(
        "Permission denied: xdpeek requires root privileges to load XDP programs.\n\n\
         Run with: sudo xdpeek ..."
    )]
    PermissionDenied,

    #[error(
        "Kernel version {found} is too old.\n\n\
         xdpeek requires Linux {required} or newer for generic XDP."
    )]
    KernelTooOld { found: String, required: String },

    #[error("Failed to read kernel version from /proc/version")]
    KernelVersion(#[source] std::io::Error),
}

/// Map a fatal error to the process exit code
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let denied = err.chain().any(|cause| {
        matches!(cause.downcast_ref::<PreflightError>(), Some(PreflightError::PermissionDenied))
    });

    if denied {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}
