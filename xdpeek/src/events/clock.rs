//! # Boot Clock
//!
//! `bpf_ktime_get_ns()` counts nanoseconds on the kernel's monotonic clock.
//! [`BootClock`] holds the wall-clock instant of that clock's zero, captured
//! once at startup, and turns event timestamps into wall-clock time.
//!
//! ## Sources
//!
//! 1. `CLOCK_REALTIME - CLOCK_MONOTONIC` (nanosecond resolution)
//! 2. `btime` from `/proc/stat` (seconds resolution, fallback)

#![allow(unsafe_code)] // clock_gettime() requires unsafe

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::domain::BootTimeError;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Wall-clock offset of the kernel monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootClock {
    boot_offset_ns: u64,
}

impl BootClock {
    /// Build a clock from a known offset (nanoseconds since the epoch)
    #[must_use]
    pub const fn from_offset_ns(boot_offset_ns: u64) -> Self {
        Self { boot_offset_ns }
    }

    /// Capture the boot offset of the running system
    ///
    /// # Errors
    /// Returns [`BootTimeError`] if neither the clock pair nor `/proc/stat`
    /// yields a boot time
    pub fn capture() -> Result<Self, BootTimeError> {
        let clock_err = match offset_from_clocks() {
            Ok(offset) => {
                debug!("Boot offset from clocks: {offset} ns");
                return Ok(Self::from_offset_ns(offset));
            }
            Err(e) => e,
        };

        warn!("Clock-based boot time unavailable ({clock_err}), falling back to /proc/stat");
        let stat = std::fs::read_to_string("/proc/stat").map_err(|e| BootTimeError {
            clock: clock_err.clone(),
            proc_stat: e.to_string(),
        })?;

        parse_btime(&stat)
            .map(|secs| Self::from_offset_ns(secs.saturating_mul(NANOS_PER_SEC)))
            .ok_or_else(|| BootTimeError {
                clock: clock_err,
                proc_stat: "no btime line".to_string(),
            })
    }

    #[must_use]
    pub const fn offset_ns(&self) -> u64 {
        self.boot_offset_ns
    }

    /// Convert a kernel monotonic timestamp to wall-clock time
    ///
    /// Saturates at the latest representable instant, so the result never
    /// decreases as `timestamp_ns` grows.
    #[must_use]
    pub fn normalize(&self, timestamp_ns: u64) -> DateTime<Utc> {
        let epoch_ns = self.boot_offset_ns.saturating_add(timestamp_ns);
        let epoch_ns = i64::try_from(epoch_ns).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(epoch_ns)
    }
}

fn read_clock(clock: libc::clockid_t) -> Result<u64, String> {
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    if unsafe { libc::clock_gettime(clock, &mut ts) } != 0 {
        return Err(std::io::Error::last_os_error().to_string());
    }

    let secs = u64::try_from(ts.tv_sec).map_err(|e| e.to_string())?;
    let nanos = u64::try_from(ts.tv_nsec).map_err(|e| e.to_string())?;
    Ok(secs * NANOS_PER_SEC + nanos)
}

fn offset_from_clocks() -> Result<u64, String> {
    let monotonic = read_clock(libc::CLOCK_MONOTONIC)?;
    let realtime = read_clock(libc::CLOCK_REALTIME)?;
    realtime
        .checked_sub(monotonic)
        .ok_or_else(|| "realtime clock is behind the monotonic clock".to_string())
}

/// Extract the `btime` (boot time, seconds since the epoch) from `/proc/stat`
#[must_use]
pub fn parse_btime(stat: &str) -> Option<u64> {
    stat.lines()
        .find_map(|line| line.strip_prefix("btime "))
        .and_then(|value| value.trim().parse().ok())
}
