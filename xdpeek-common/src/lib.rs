//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Defines the record written by the XDP program into the `EVENTS` perf event
//! array and read back by userspace. The type uses `#[repr(C)]` so both sides
//! agree on the layout across the kernel/userspace boundary.
//!
//! ## Key Types
//!
//! - [`NetworkEvent`] - One observed IPv4 packet (32 bytes on the wire)

#![no_std]

/// Name of the perf event array map shared with userspace
pub const EVENTS_MAP: &str = "EVENTS";

/// Name of the XDP entry function inside the compiled program
pub const ENTRY_FUNCTION: &str = "trace_packet";

/// Size of a [`NetworkEvent`] on the wire, padding included
pub const NETWORK_EVENT_SIZE: usize = 32;

/// IP protocol numbers the tracer names explicitly
pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

/// Event sent from the XDP program to userspace via the perf event array
///
/// **Memory Layout**:
///
/// ```text
/// 0        8      12      16    18    20  21      24        28        32
/// ├────────┼──────┼───────┼─────┼─────┼───┼───────┼─────────┼─────────┤
/// │ ts_ns  │saddr │ daddr │sport│dport│pro│ pad×3 │pkt_size │ reserved│
/// ```
///
/// All fields are written in the host (little-endian) order of the kernel,
/// except `sport`/`dport`, which hold the raw packet bytes and therefore read
/// back byte-swapped.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkEvent {
    /// Timestamp in nanoseconds (from `bpf_ktime_get_ns()`)
    ///
    /// Monotonic clock, relative to system boot (not wall-clock time).
    pub timestamp_ns: u64,

    /// IPv4 source address as loaded from the IP header
    ///
    /// The little-endian bytes of this value are the dotted-decimal octets
    /// in order.
    pub saddr: u32,

    /// IPv4 destination address, same convention as `saddr`
    pub daddr: u32,

    /// Source port (TCP/UDP) or echo identifier (ICMP), network byte order
    pub sport: u16,

    /// Destination port (TCP/UDP) or echo sequence (ICMP), network byte order
    pub dport: u16,

    /// IP protocol number (see `IPPROTO_*`)
    pub protocol: u8,

    /// Padding before the 4-byte aligned `pkt_size`
    #[allow(clippy::pub_underscore_fields)]
    pub _padding: [u8; 3],

    /// Frame length seen by XDP (`data_end - data`)
    pub pkt_size: u32,

    /// Tail padding to the struct's 8-byte alignment
    #[allow(clippy::pub_underscore_fields)]
    pub _reserved: [u8; 4],
}

const _: () = assert!(core::mem::size_of::<NetworkEvent>() == NETWORK_EVENT_SIZE);

#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl aya::Pod for NetworkEvent {}
