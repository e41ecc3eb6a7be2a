//! # xdpeek - XDP Packet Tracer
//!
//! xdpeek attaches a small XDP program to a network interface and prints one
//! line for every IPv4 packet the interface receives:
//!
//! ```text
//! 2024-05-01 12:00:00.123456 TCP 10.0.0.5:51234 -> 93.184.216.34:443 74 bytes
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 XDP program (kernel, xdpeek-ebpf)               │
//! │     trace_packet: Ethernet → IPv4 → TCP/UDP/ICMP header peek    │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ 32-byte NetworkEvent per packet
//!                         ▼ EVENTS perf event array (one ring per CPU)
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     xdpeek (this crate)                         │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Perf pump   │──▶│   Consumer   │──▶│   Renderer   │──▶ out  │
//! │  │  (per-CPU)   │   │ decode+clock │   │ trace lines  │         │
//! │  └──────────────┘   └──────────────┘   └──────────────┘         │
//! │                                                                 │
//! │  Lifecycle: Unloaded → Loaded → Attached → Detached             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`capture`]: program lifecycle, aya host, perf pump, consumer task, session
//! - [`events`]: record decoding, boot clock, protocol names, trace line rendering
//! - [`shutdown`]: SIGINT/SIGTERM handling
//! - [`preflight`]: privilege, kernel and program object checks
//! - [`cli`]: command-line arguments
//! - [`domain`]: newtypes and error types
//!
//! ## Typical Usage
//!
//! ```bash
//! # Build the kernel program, then trace eth0
//! cargo xtask build-ebpf
//! sudo ./target/release/xdpeek --iface eth0
//! ```

pub mod capture;
pub mod cli;
pub mod domain;
pub mod events;
pub mod preflight;
pub mod shutdown;
