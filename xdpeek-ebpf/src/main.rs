//! # eBPF Kernel-Side Packet Tracer
//!
//! XDP program that records one [`NetworkEvent`] per IPv4 frame and passes
//! every frame on unchanged.
//!
//! ## Programs
//!
//! - **XDP**: `trace_packet` - attached to one interface (generic mode by default)
//!
//! ## Maps (Shared with Userspace)
//!
//! - `EVENTS` - Per-CPU perf event array carrying `NetworkEvent` records
//!
//! ## Build
//!
//! Always compiled in release mode (debug includes incompatible formatting code):
//! ```bash
//! cargo xtask build-ebpf --release
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use core::mem;

use aya_ebpf::{
    bindings::xdp_action,
    helpers::bpf_ktime_get_ns,
    macros::{map, xdp},
    maps::PerfEventArray,
    programs::XdpContext,
};
use aya_log_ebpf::debug;
use xdpeek_common::{NetworkEvent, IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};

// ============================================================================
// Header Layouts
// ============================================================================

const ETH_HDR_LEN: usize = 14;
const ETH_P_IP: u16 = 0x0800;

/// Options are not parsed; transport headers are read right after the
/// fixed part of the IPv4 header.
const IPV4_HDR_LEN: usize = 20;

#[repr(C)]
#[allow(dead_code)]
struct EthHdr {
    dst: [u8; 6],
    src: [u8; 6],
    ether_type: u16,
}

#[repr(C)]
#[allow(dead_code)]
struct Ipv4Hdr {
    version_ihl: u8,
    tos: u8,
    tot_len: u16,
    id: u16,
    frag_off: u16,
    ttl: u8,
    protocol: u8,
    check: u16,
    saddr: u32,
    daddr: u32,
}

/// Leading ports of a TCP or UDP header
#[repr(C)]
#[allow(dead_code)]
struct PortsHdr {
    source: u16,
    dest: u16,
}

/// Echo part of an ICMP header
#[repr(C)]
#[allow(dead_code)]
struct IcmpEchoHdr {
    kind: u8,
    code: u8,
    checksum: u16,
    id: u16,
    sequence: u16,
}

// ============================================================================
// eBPF Maps
// ============================================================================

/// Perf event array for sending events to userspace
///
/// - **Type**: one perf ring per CPU
/// - **Usage**: Kernel writes with `EVENTS.output()`, userspace drains each
///   CPU buffer with `AsyncPerfEventArray`
#[map]
static EVENTS: PerfEventArray<NetworkEvent> = PerfEventArray::new(0);

// ============================================================================
// eBPF Program Hooks
// ============================================================================

/// Hook: XDP ingress on the attached interface
#[xdp]
pub fn trace_packet(ctx: XdpContext) -> u32 {
    match try_trace_packet(&ctx) {
        Ok(action) => action,
        Err(()) => {
            debug!(&ctx, "frame shorter than its headers, passing");
            xdp_action::XDP_PASS
        }
    }
}

#[inline(always)]
fn ptr_at<T>(ctx: &XdpContext, offset: usize) -> Result<*const T, ()> {
    let start = ctx.data();
    let end = ctx.data_end();

    if start + offset + mem::size_of::<T>() > end {
        return Err(());
    }

    Ok((start + offset) as *const T)
}

fn try_trace_packet(ctx: &XdpContext) -> Result<u32, ()> {
    let eth: *const EthHdr = ptr_at(ctx, 0)?;
    if unsafe { (*eth).ether_type } != ETH_P_IP.to_be() {
        return Ok(xdp_action::XDP_PASS);
    }

    let ip: *const Ipv4Hdr = ptr_at(ctx, ETH_HDR_LEN)?;
    let protocol = unsafe { (*ip).protocol };

    let mut event = NetworkEvent {
        timestamp_ns: unsafe { bpf_ktime_get_ns() },
        saddr: unsafe { (*ip).saddr },
        daddr: unsafe { (*ip).daddr },
        protocol,
        pkt_size: (ctx.data_end() - ctx.data()) as u32,
        ..NetworkEvent::default()
    };

    // Ports stay zero when the transport header is cut short
    let transport = ETH_HDR_LEN + IPV4_HDR_LEN;
    match protocol {
        IPPROTO_TCP | IPPROTO_UDP => {
            if let Ok(ports) = ptr_at::<PortsHdr>(ctx, transport) {
                event.sport = unsafe { (*ports).source };
                event.dport = unsafe { (*ports).dest };
            }
        }
        IPPROTO_ICMP => {
            if let Ok(icmp) = ptr_at::<IcmpEchoHdr>(ctx, transport) {
                event.sport = unsafe { (*icmp).id };
                event.dport = unsafe { (*icmp).sequence };
            }
        }
        _ => {}
    }

    EVENTS.output(ctx, &event, 0);

    Ok(xdp_action::XDP_PASS)
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
