//! Trace line formatting
//!
//! One line per packet:
//!
//! ```text
//! 2024-05-01 12:00:00.123456 TCP 127.0.0.1:80 -> 10.1.1.1:8080 1500 bytes
//! ```

use std::io::Write;

use chrono::Local;
use log::debug;

use super::TraceRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Time zone used for the timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    #[default]
    Local,
    Utc,
}

/// Format one record as a trace line (without newline)
#[must_use]
pub fn format_record(record: &TraceRecord, zone: TimeZone) -> String {
    let timestamp = match zone {
        TimeZone::Utc => record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        TimeZone::Local => {
            record.timestamp.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
        }
    };

    format!(
        "{timestamp} {} {} -> {} {} bytes",
        record.protocol, record.source, record.destination, record.size
    )
}

/// Writes trace lines to an output stream
pub struct Renderer<W> {
    out: W,
    zone: TimeZone,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, zone: TimeZone) -> Self {
        Self { out, zone }
    }

    /// Write one record; output errors are not fatal to tracing
    pub fn render(&mut self, record: &TraceRecord) {
        let line = format_record(record, self.zone);
        if let Err(e) = writeln!(self.out, "{line}") {
            debug!("Failed to write trace line: {e}");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Protocol;
    use chrono::DateTime;

    fn record() -> TraceRecord {
        TraceRecord {
            timestamp: DateTime::from_timestamp_nanos(1_714_564_800_123_456_789),
            protocol: Protocol::Udp,
            source: "192.168.1.20:53".parse().unwrap(),
            destination: "8.8.8.8:40000".parse().unwrap(),
            size: 74,
        }
    }

    #[test]
    fn test_format_record_utc() {
        assert_eq!(
            format_record(&record(), TimeZone::Utc),
            "2024-05-01 12:00:00.123456 UDP 192.168.1.20:53 -> 8.8.8.8:40000 74 bytes"
        );
    }

    #[test]
    fn test_format_record_unknown_protocol() {
        let record = TraceRecord { protocol: Protocol::Other(47), ..record() };
        let line = format_record(&record, TimeZone::Utc);
        assert!(line.contains(" 47 192.168.1.20:53 -> "));
    }

    #[test]
    fn test_renderer_writes_one_line_per_record() {
        let mut renderer = Renderer::new(Vec::new(), TimeZone::Utc);
        renderer.render(&record());
        renderer.render(&record());

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.ends_with("74 bytes\n"));
    }
}
