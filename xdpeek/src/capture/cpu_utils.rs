//! CPU utility functions
//!
//! Utilities for querying CPU information from /sys filesystem.

use anyhow::{Context, Result};
use std::fs;

use crate::domain::CpuId;

/// Get list of online CPU IDs from /sys/devices/system/cpu/online
///
/// One perf buffer is opened per entry, so offline CPUs must be skipped.
pub fn online_cpus() -> Result<Vec<CpuId>> {
    let content = fs::read_to_string("/sys/devices/system/cpu/online")
        .context("Failed to read /sys/devices/system/cpu/online")?;

    parse_cpu_list(&content)
}

/// Parse a kernel CPU list like "0-3" or "0-3,8-11" (NUMA systems)
pub fn parse_cpu_list(content: &str) -> Result<Vec<CpuId>> {
    let mut cpus = Vec::new();

    for range in content.trim().split(',') {
        if let Some((start, end)) = range.split_once('-') {
            let start: u32 = start.parse().with_context(|| format!("Bad CPU range: {range}"))?;
            let end: u32 = end.parse().with_context(|| format!("Bad CPU range: {range}"))?;
            cpus.extend((start..=end).map(CpuId));
        } else {
            let cpu: u32 = range.parse().with_context(|| format!("Bad CPU id: {range}"))?;
            cpus.push(CpuId(cpu));
        }
    }

    Ok(cpus)
}
