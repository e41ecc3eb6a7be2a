//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::domain::{AttachMode, Interface};
use crate::events::TimeZone;

/// Where `cargo xtask build-ebpf` leaves the compiled program
pub const DEFAULT_PROGRAM_PATH: &str = "target/bpfel-unknown-none/release/xdpeek";

#[derive(Parser, Debug)]
#[command(
    name = "xdpeek",
    version,
    about = "Trace IPv4 packets on a network interface with XDP",
    after_help = "\
EXAMPLES:
    sudo xdpeek                              Trace eth0
    sudo xdpeek --iface wlan0                Trace another interface
    sudo xdpeek -i eth1 --mode native        Attach in driver mode"
)]
pub struct Args {
    /// Network interface to monitor
    #[arg(short, long, default_value = "eth0")]
    pub iface: String,

    /// Compiled XDP program object
    #[arg(long, value_name = "FILE", default_value = DEFAULT_PROGRAM_PATH)]
    pub program: PathBuf,

    /// XDP attachment mode
    #[arg(long, value_enum, default_value_t = AttachMode::Generic)]
    pub mode: AttachMode,

    /// Print timestamps in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Samples buffered between the perf readers and the printer
    #[arg(long, default_value = "1024", value_parser = clap::value_parser!(u32).range(1..))]
    pub queue_depth: u32,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn interface(&self) -> Interface {
        Interface(self.iface.clone())
    }

    #[must_use]
    pub fn time_zone(&self) -> TimeZone {
        if self.utc {
            TimeZone::Utc
        } else {
            TimeZone::Local
        }
    }
}
