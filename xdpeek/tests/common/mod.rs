//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use xdpeek_common::{NetworkEvent, NETWORK_EVENT_SIZE};

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn line_count(&self) -> usize {
        self.contents().lines().count()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Lay out a record the way the XDP program writes it
pub fn encode(event: &NetworkEvent) -> [u8; NETWORK_EVENT_SIZE] {
    let mut buf = [0u8; NETWORK_EVENT_SIZE];
    buf[0..8].copy_from_slice(&event.timestamp_ns.to_le_bytes());
    buf[8..12].copy_from_slice(&event.saddr.to_le_bytes());
    buf[12..16].copy_from_slice(&event.daddr.to_le_bytes());
    buf[16..18].copy_from_slice(&event.sport.to_le_bytes());
    buf[18..20].copy_from_slice(&event.dport.to_le_bytes());
    buf[20] = event.protocol;
    buf[24..28].copy_from_slice(&event.pkt_size.to_le_bytes());
    buf
}

/// 127.0.0.1:80 -> 10.1.1.1:8080, TCP, 1500 bytes, as captured off the wire
pub fn http_alt_record() -> [u8; NETWORK_EVENT_SIZE] {
    let mut buf = [0u8; NETWORK_EVENT_SIZE];
    buf[8..12].copy_from_slice(&0x0100_007F_u32.to_le_bytes());
    buf[12..16].copy_from_slice(&0x0101_010A_u32.to_le_bytes());
    // Ports hold the packet's network-order bytes
    buf[16..18].copy_from_slice(&80u16.to_be_bytes());
    buf[18..20].copy_from_slice(&8080u16.to_be_bytes());
    buf[20] = 6;
    buf[24..28].copy_from_slice(&1500u32.to_le_bytes());
    buf
}
