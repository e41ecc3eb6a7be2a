//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep interface names and CPU indices from being
//! mixed up with arbitrary strings and integers in function signatures.

use std::fmt;

use clap::ValueEnum;

/// CPU ID
///
/// Represents a CPU core ID (0, 1, 2, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpuId(pub u32);

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU:{}", self.0)
    }
}

/// Network interface name (e.g. `eth0`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interface(pub String);

impl Interface {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Interface {
    fn from(name: &str) -> Self {
        Interface(name.to_string())
    }
}

/// How the XDP program is bound to the interface
///
/// Generic mode runs in the kernel's software path (`XDP_FLAGS_SKB_MODE`) and
/// works with any driver. Native mode requires driver support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AttachMode {
    /// Software path, supported by every interface
    #[default]
    Generic,
    /// Driver path, faster but driver dependent
    Native,
}

impl fmt::Display for AttachMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachMode::Generic => f.write_str("generic"),
            AttachMode::Native => f.write_str("native"),
        }
    }
}
