//! Fixed-layout decoder for records read from the `EVENTS` perf array

use xdpeek_common::{NetworkEvent, NETWORK_EVENT_SIZE};

use crate::domain::DecodeError;

/// Decode one raw record into a [`NetworkEvent`]
///
/// Every field is read little-endian at its `#[repr(C)]` offset. Bytes past
/// [`NETWORK_EVENT_SIZE`] are ignored (perf samples may carry tail padding).
///
/// # Errors
/// Returns [`DecodeError::Truncated`] if `buf` is shorter than a full record
pub fn decode(buf: &[u8]) -> Result<NetworkEvent, DecodeError> {
    let Some(raw) = buf.first_chunk::<NETWORK_EVENT_SIZE>() else {
        return Err(DecodeError::Truncated { len: buf.len(), expected: NETWORK_EVENT_SIZE });
    };

    Ok(NetworkEvent {
        timestamp_ns: u64::from_le_bytes([
            raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
        ]),
        saddr: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
        daddr: u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]),
        sport: u16::from_le_bytes([raw[16], raw[17]]),
        dport: u16::from_le_bytes([raw[18], raw[19]]),
        protocol: raw[20],
        _padding: [0; 3],
        pkt_size: u32::from_le_bytes([raw[24], raw[25], raw[26], raw[27]]),
        _reserved: [0; 4],
    })
}
