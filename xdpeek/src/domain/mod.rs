//! Domain model for xdpeek
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - Self-documenting function signatures
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{AttachMode, CpuId, Interface};

pub use errors::{
    exit_code_for, AttachError, BootTimeError, DecodeError, DetachError, LoadError,
    PreflightError, PumpError, EXIT_ERROR, EXIT_NOPERM, EXIT_SUCCESS,
};
