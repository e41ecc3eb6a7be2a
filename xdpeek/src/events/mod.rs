//! Event decoding and presentation
//!
//! Turns raw perf samples into trace lines:
//! - [`decode`]: 32-byte record → [`NetworkEvent`]
//! - [`clock`]: kernel monotonic timestamp → wall clock
//! - [`TraceRecord::from_event`]: port byte order, protocol names, addresses
//! - [`render`]: trace line formatting and output

pub mod clock;
pub mod decode;
pub mod render;

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use chrono::{DateTime, Utc};
use xdpeek_common::{NetworkEvent, IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};

pub use clock::BootClock;
pub use decode::decode;
pub use render::{format_record, Renderer, TimeZone};

/// IP protocol of a traced packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Other(u8),
}

impl From<u8> for Protocol {
    fn from(number: u8) -> Self {
        match number {
            IPPROTO_TCP => Protocol::Tcp,
            IPPROTO_UDP => Protocol::Udp,
            IPPROTO_ICMP => Protocol::Icmp,
            other => Protocol::Other(other),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
            Protocol::Icmp => f.write_str("ICMP"),
            Protocol::Other(number) => write!(f, "{number}"),
        }
    }
}

/// Port as displayed, from the value decoded off the wire
///
/// The kernel copies the port bytes straight out of the packet (network
/// order), so the little-endian read comes back byte-swapped. Swapping is its
/// own inverse.
#[must_use]
pub const fn display_port(wire: u16) -> u16 {
    wire.swap_bytes()
}

/// IPv4 address from the host integer loaded off the IP header
#[must_use]
pub fn ipv4_from_raw(raw: u32) -> Ipv4Addr {
    Ipv4Addr::from(raw.to_le_bytes())
}

/// A decoded event normalized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub timestamp: DateTime<Utc>,
    pub protocol: Protocol,
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    pub size: u32,
}

impl TraceRecord {
    #[must_use]
    pub fn from_event(event: &NetworkEvent, clock: &BootClock) -> Self {
        Self {
            timestamp: clock.normalize(event.timestamp_ns),
            protocol: Protocol::from(event.protocol),
            source: SocketAddrV4::new(ipv4_from_raw(event.saddr), display_port(event.sport)),
            destination: SocketAddrV4::new(ipv4_from_raw(event.daddr), display_port(event.dport)),
            size: event.pkt_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_names() {
        assert_eq!(Protocol::from(6).to_string(), "TCP");
        assert_eq!(Protocol::from(17).to_string(), "UDP");
        assert_eq!(Protocol::from(1).to_string(), "ICMP");
        for number in (0..=u8::MAX).filter(|n| ![1, 6, 17].contains(n)) {
            assert_eq!(Protocol::from(number).to_string(), number.to_string());
        }
    }

    #[test]
    fn test_display_port_is_an_involution() {
        for wire in [0u16, 1, 0x0050, 0x5000, 0x1F90, 0x901F, 0xFFFF, 12_345] {
            assert_eq!(display_port(display_port(wire)), wire);
        }
        assert_eq!(display_port(0x5000), 80);
        assert_eq!(display_port(0x901F), 8080);
    }

    #[test]
    fn test_ipv4_from_raw() {
        assert_eq!(ipv4_from_raw(0x0100_007F), Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(ipv4_from_raw(0x0101_010A), Ipv4Addr::new(10, 1, 1, 1));
    }

    #[test]
    fn test_record_from_event() {
        let event = NetworkEvent {
            timestamp_ns: 2_000,
            saddr: 0x0100_007F,
            daddr: 0x0101_010A,
            sport: 0x5000,
            dport: 0x901F,
            protocol: 6,
            pkt_size: 1500,
            ..NetworkEvent::default()
        };
        let record = TraceRecord::from_event(&event, &BootClock::from_offset_ns(1_000));

        assert_eq!(record.timestamp, DateTime::from_timestamp_nanos(3_000));
        assert_eq!(record.protocol, Protocol::Tcp);
        assert_eq!(record.source, "127.0.0.1:80".parse().unwrap());
        assert_eq!(record.destination, "10.1.1.1:8080".parse().unwrap());
        assert_eq!(record.size, 1500);
    }
}
