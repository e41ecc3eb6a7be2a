//! Pre-flight checks for xdpeek
//!
//! Validates system requirements before attempting to load the XDP program.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use log::warn;
use object::{Architecture, Object};

use crate::domain::{LoadError, PreflightError};

/// Minimum kernel version for generic XDP with perf event output
const MIN_KERNEL_VERSION: (u32, u32) = (4, 18);

/// Section the XDP program is placed in by `#[xdp]`
const XDP_SECTION: &str = "xdp";

/// Run all host checks before eBPF loading
///
/// # Errors
/// Returns [`PreflightError`] for the first unmet requirement
pub fn run_preflight_checks() -> Result<(), PreflightError> {
    check_privileges()?;
    check_kernel_version()?;
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<(), PreflightError> {
    // CAP_BPF + CAP_NET_ADMIN would do, but checking capabilities needs more
    // than libc, so root is required
    if unsafe { libc::geteuid() } == 0 {
        Ok(())
    } else {
        Err(PreflightError::PermissionDenied)
    }
}

/// Check if the kernel version is sufficient for generic XDP
fn check_kernel_version() -> Result<(), PreflightError> {
    let version_str =
        std::fs::read_to_string("/proc/version").map_err(PreflightError::KernelVersion)?;

    // Parse version like "Linux version 5.15.0-generic ..." or "Linux version 6.1.0-arch1-1 ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    let Some((major, minor)) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        return Err(PreflightError::KernelTooOld {
            found: release.to_string(),
            required: format!("{}.{}", MIN_KERNEL_VERSION.0, MIN_KERNEL_VERSION.1),
        });
    }

    Ok(())
}

/// Extract `(major, minor)` from a release string such as `6.1.0-arch1-1`
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Check that the program file is a BPF object before handing it to the kernel
///
/// # Errors
/// Returns [`LoadError::Parse`] for non-object data and [`LoadError::NotBpf`]
/// for objects built for another architecture
pub fn check_program_object(data: &[u8]) -> Result<(), LoadError> {
    let obj = object::File::parse(data).map_err(|e| LoadError::Parse(e.to_string()))?;

    if obj.architecture() != Architecture::Bpf {
        return Err(LoadError::NotBpf(format!("{:?}", obj.architecture())));
    }

    if obj.section_by_name(XDP_SECTION).is_none() {
        warn!("program object has no {XDP_SECTION} section, entry lookup will likely fail");
    }

    Ok(())
}
