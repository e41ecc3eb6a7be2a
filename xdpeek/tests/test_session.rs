mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::sync::mpsc;
use xdpeek::capture::{run_session, EventConsumer, EventPump, ProgramHost, Unloaded};
use xdpeek::domain::{
    exit_code_for, AttachError, AttachMode, CpuId, DetachError, Interface, LoadError, PumpError,
    EXIT_SUCCESS,
};
use xdpeek::events::{BootClock, Renderer, TimeZone};
use xdpeek::shutdown::ShutdownReason;

use common::{http_alt_record, SharedBuf};

/// Host that knows a single interface and records detach calls
struct FakeHost {
    detaches: Arc<AtomicUsize>,
    /// Trace lines already printed when detach ran
    lines_at_detach: Arc<AtomicUsize>,
    out: SharedBuf,
}

impl FakeHost {
    fn new(out: SharedBuf) -> Self {
        Self {
            detaches: Arc::default(),
            lines_at_detach: Arc::default(),
            out,
        }
    }
}

impl ProgramHost for FakeHost {
    fn load(&mut self, _entry: &str) -> Result<(), LoadError> {
        Ok(())
    }

    fn attach(
        &mut self,
        _entry: &str,
        iface: &Interface,
        _mode: AttachMode,
    ) -> Result<(), AttachError> {
        if iface.as_str() == "veth-test" {
            Ok(())
        } else {
            Err(AttachError::UnknownInterface(iface.clone()))
        }
    }

    fn detach(&mut self, _entry: &str, _iface: &Interface) -> Result<(), DetachError> {
        self.detaches.fetch_add(1, Ordering::SeqCst);
        self.lines_at_detach.store(self.out.line_count(), Ordering::SeqCst);
        Ok(())
    }
}

/// Pump that delivers a fixed batch of samples on start
struct FakePump {
    tx: Option<mpsc::Sender<Bytes>>,
    samples: Vec<Bytes>,
    fail_start: bool,
    stops: Arc<AtomicUsize>,
}

impl EventPump for FakePump {
    fn start(&mut self) -> Result<(), PumpError> {
        if self.fail_start {
            return Err(PumpError::OpenBuffer { cpu: CpuId(0), reason: "EBUSY".to_string() });
        }
        let tx = self.tx.as_ref().expect("started twice after stop");
        for sample in self.samples.drain(..) {
            tx.try_send(sample).expect("channel sized for the batch");
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
    }
}

fn consumer(out: &SharedBuf) -> EventConsumer<SharedBuf, std::io::Sink> {
    EventConsumer::new(
        BootClock::from_offset_ns(0),
        Renderer::new(out.clone(), TimeZone::Utc),
        std::io::sink(),
    )
}

#[test]
fn test_unknown_interface_fails_without_detach() {
    let host = FakeHost::new(SharedBuf::default());
    let detaches = Arc::clone(&host.detaches);

    let loaded = Unloaded::new(host).load("trace_packet").unwrap();
    let result = loaded
        .attach(Interface::from("nope0"), AttachMode::Generic)
        .context("Failed to attach XDP program to interface nope0");

    let err = result.err().unwrap();
    assert_ne!(exit_code_for(&err), EXIT_SUCCESS);
    assert!(format!("{err:#}").contains("Interface nope0 does not exist"));
    assert_eq!(detaches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_shutdown_detaches_once_while_records_are_queued() {
    const SAMPLES: usize = 50;

    let out = SharedBuf::default();
    let host = FakeHost::new(out.clone());
    let detaches = Arc::clone(&host.detaches);
    let lines_at_detach = Arc::clone(&host.lines_at_detach);

    let attached = Unloaded::new(host)
        .load("trace_packet")
        .unwrap()
        .attach(Interface::from("veth-test"), AttachMode::Generic)
        .unwrap();

    let (tx, rx) = mpsc::channel(SAMPLES);
    let stops = Arc::new(AtomicUsize::new(0));
    let pump = FakePump {
        tx: Some(tx),
        samples: vec![Bytes::copy_from_slice(&http_alt_record()); SAMPLES],
        fail_start: false,
        stops: Arc::clone(&stops),
    };
    let consumer = tokio::spawn(consumer(&out).run(rx));

    let report =
        run_session(attached, pump, consumer, std::future::ready(ShutdownReason::Interrupt))
            .await
            .unwrap();

    assert_eq!(report.reason, ShutdownReason::Interrupt);
    assert_eq!(detaches.load(Ordering::SeqCst), 1);
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    // Detach ran before the consumer finished the queued samples
    assert!(lines_at_detach.load(Ordering::SeqCst) < SAMPLES);

    // Queued samples are still printed after detach
    let consumer = report.consumer.expect("consumer drains after shutdown");
    assert_eq!(consumer.stats().decoded, SAMPLES as u64);
    assert_eq!(out.line_count(), SAMPLES);
}

#[tokio::test]
async fn test_pump_failure_still_detaches() {
    let out = SharedBuf::default();
    let host = FakeHost::new(out.clone());
    let detaches = Arc::clone(&host.detaches);

    let attached = Unloaded::new(host)
        .load("trace_packet")
        .unwrap()
        .attach(Interface::from("veth-test"), AttachMode::Generic)
        .unwrap();

    let (tx, rx) = mpsc::channel(1);
    let pump = FakePump {
        tx: Some(tx),
        samples: Vec::new(),
        fail_start: true,
        stops: Arc::default(),
    };
    let consumer = tokio::spawn(consumer(&out).run(rx));

    let result =
        run_session(attached, pump, consumer, std::future::ready(ShutdownReason::Terminate)).await;

    assert!(matches!(result, Err(PumpError::OpenBuffer { .. })));
    assert_eq!(detaches.load(Ordering::SeqCst), 1);
}
