//! # Event Pump
//!
//! Moves raw samples from the kernel's per-CPU perf buffers into the single
//! channel read by the consumer. One reader task per online CPU; each task
//! copies samples out of aya's scratch buffers and sends them as [`Bytes`].
//!
//! Delivery order is FIFO per CPU only. Samples from different CPUs may
//! interleave in any order.

use aya::maps::{
    perf::{AsyncPerfEventArray, AsyncPerfEventArrayBuffer, Events},
    MapData,
};
use bytes::{Bytes, BytesMut};
use log::{debug, error, info, warn};
use tokio::{sync::mpsc, task::JoinHandle};
use xdpeek_common::NETWORK_EVENT_SIZE;

use super::online_cpus;
use crate::domain::{CpuId, PumpError};

/// Scratch buffers handed to each `read_events` call
const BUFFERS_PER_READ: usize = 16;

/// Start/stop control over event delivery
pub trait EventPump {
    /// Begin forwarding samples into the channel
    ///
    /// # Errors
    /// Returns [`PumpError`] if delivery cannot be set up
    fn start(&mut self) -> Result<(), PumpError>;

    /// Stop forwarding and release the channel's sending side
    fn stop(&mut self);
}

/// Pump backed by the `EVENTS` perf event array
pub struct PerfEventPump {
    events: AsyncPerfEventArray<MapData>,
    tx: Option<mpsc::Sender<Bytes>>,
    readers: Vec<JoinHandle<()>>,
}

impl PerfEventPump {
    pub fn new(events: AsyncPerfEventArray<MapData>, tx: mpsc::Sender<Bytes>) -> Self {
        Self { events, tx: Some(tx), readers: Vec::new() }
    }
}

impl EventPump for PerfEventPump {
    fn start(&mut self) -> Result<(), PumpError> {
        let Some(tx) = self.tx.as_ref() else {
            return Ok(());
        };
        if !self.readers.is_empty() {
            return Ok(());
        }

        let cpus = online_cpus().map_err(|e| PumpError::OnlineCpus(format!("{e:#}")))?;
        for cpu in cpus {
            let buf = self
                .events
                .open(cpu.0, None)
                .map_err(|e| PumpError::OpenBuffer { cpu, reason: e.to_string() })?;
            self.readers.push(tokio::spawn(read_cpu_buffer(cpu, buf, tx.clone())));
        }

        info!("✓ Reading perf buffers on {} CPUs", self.readers.len());
        Ok(())
    }

    fn stop(&mut self) {
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        if self.tx.take().is_some() {
            debug!("Perf event pump stopped");
        }
    }
}

impl Drop for PerfEventPump {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_cpu_buffer(
    cpu: CpuId,
    mut buf: AsyncPerfEventArrayBuffer<MapData>,
    tx: mpsc::Sender<Bytes>,
) {
    let mut buffers = (0..BUFFERS_PER_READ)
        .map(|_| BytesMut::with_capacity(NETWORK_EVENT_SIZE))
        .collect::<Vec<_>>();

    loop {
        let Events { read, lost } = match buf.read_events(&mut buffers).await {
            Ok(events) => events,
            Err(e) => {
                error!("Perf buffer read failed on {cpu}, reader exiting: {e}");
                return;
            }
        };

        if lost > 0 {
            warn!("Perf buffer on {cpu} lost {lost} events");
        }

        for buffer in buffers.iter_mut().take(read) {
            let sample = Bytes::copy_from_slice(buffer);
            buffer.clear();
            if tx.send(sample).await.is_err() {
                debug!("Event channel closed, reader on {cpu} exiting");
                return;
            }
        }
    }
}
