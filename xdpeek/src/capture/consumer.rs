//! # Event Consumer
//!
//! Drains the event channel on its own task. Each raw sample is decoded,
//! normalized and rendered in arrival order. A sample that fails to decode
//! produces one diagnostic line and is skipped; the loop keeps going.

use std::io::Write;

use bytes::Bytes;
use log::{debug, info};
use tokio::sync::mpsc;

use crate::domain::DecodeError;
use crate::events::{decode, BootClock, Renderer, TraceRecord};

/// Per-run counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub decoded: u64,
    pub malformed: u64,
}

/// Decodes raw samples and writes trace lines
pub struct EventConsumer<O, E> {
    clock: BootClock,
    renderer: Renderer<O>,
    diagnostics: E,
    stats: ConsumerStats,
}

impl<O: Write, E: Write> EventConsumer<O, E> {
    pub fn new(clock: BootClock, renderer: Renderer<O>, diagnostics: E) -> Self {
        Self { clock, renderer, diagnostics, stats: ConsumerStats::default() }
    }

    /// Handle one raw sample
    ///
    /// # Errors
    /// Returns the [`DecodeError`] after reporting it on the diagnostics stream
    pub fn process(&mut self, raw: &[u8]) -> Result<(), DecodeError> {
        match decode(raw) {
            Ok(event) => {
                self.stats.decoded += 1;
                self.renderer.render(&TraceRecord::from_event(&event, &self.clock));
                Ok(())
            }
            Err(e) => {
                self.stats.malformed += 1;
                if let Err(io) = writeln!(self.diagnostics, "Failed to decode received data: {e}") {
                    debug!("Failed to write diagnostic: {io}");
                }
                Err(e)
            }
        }
    }

    /// Consume samples until every sender is gone
    pub async fn run(mut self, mut rx: mpsc::Receiver<Bytes>) -> Self {
        while let Some(raw) = rx.recv().await {
            // Errors are already reported; one bad sample never ends the loop
            let _ = self.process(&raw);
        }

        info!(
            "Event channel closed: {} decoded, {} malformed",
            self.stats.decoded, self.stats.malformed
        );
        self
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Recover the output and diagnostics streams
    pub fn into_parts(self) -> (O, E) {
        (self.renderer.into_inner(), self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TimeZone;
    use xdpeek_common::NETWORK_EVENT_SIZE;

    fn consumer() -> EventConsumer<Vec<u8>, Vec<u8>> {
        EventConsumer::new(
            BootClock::from_offset_ns(0),
            Renderer::new(Vec::new(), TimeZone::Utc),
            Vec::new(),
        )
    }

    #[test]
    fn test_process_counts_outcomes() {
        let mut consumer = consumer();
        assert!(consumer.process(&[0u8; NETWORK_EVENT_SIZE]).is_ok());
        assert!(consumer.process(&[0u8; 3]).is_err());
        assert_eq!(consumer.stats(), ConsumerStats { decoded: 1, malformed: 1 });

        let (out, err) = consumer.into_parts();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1970-01-01 00:00:00.000000 0 0.0.0.0:0 -> 0.0.0.0:0 0 bytes\n"
        );
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Failed to decode received data: Record too short: 3 bytes, expected at least 32\n"
        );
    }

    #[tokio::test]
    async fn test_run_ends_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Bytes::from_static(&[0u8; NETWORK_EVENT_SIZE])).await.unwrap();
        drop(tx);

        let consumer = consumer().run(rx).await;
        assert_eq!(consumer.stats().decoded, 1);
    }
}
