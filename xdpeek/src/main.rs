//! # xdpeek - Main Entry Point
//!
//! Startup runs in fixed stages, each fatal on failure: pre-flight checks,
//! program file read, boot clock capture, program load, interface attach,
//! perf map setup. Tracing then runs until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::sync::mpsc;
use xdpeek_common::{ENTRY_FUNCTION, EVENTS_MAP};

use xdpeek::capture::{run_session, AyaHost, EventConsumer, PerfEventPump, Unloaded};
use xdpeek::cli::Args;
use xdpeek::domain::{exit_code_for, EXIT_SUCCESS};
use xdpeek::events::{BootClock, Renderer};
use xdpeek::preflight::{check_program_object, run_preflight_checks};
use xdpeek::shutdown::ShutdownSignals;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let iface = args.interface();
    let quiet = args.quiet;

    run_preflight_checks().context("Pre-flight checks failed")?;
    let signals = ShutdownSignals::install().context("Failed to install signal handlers")?;

    // ── Program file and clock ──────────────────────────────────────────
    let host = AyaHost::open(&args.program).context("Failed to read BPF program file")?;
    check_program_object(host.object_bytes()).context("Failed to load BPF program")?;

    let clock = BootClock::capture().context("Failed to get boot time")?;

    // ── Load and attach ─────────────────────────────────────────────────
    let loaded =
        Unloaded::new(host).load(ENTRY_FUNCTION).context("Failed to load BPF program")?;
    let mut attached = loaded
        .attach(iface.clone(), args.mode)
        .with_context(|| format!("Failed to attach XDP program to interface {iface}"))?;

    // ── Event delivery ──────────────────────────────────────────────────
    let (tx, rx) = mpsc::channel(args.queue_depth as usize);
    let events =
        attached.host_mut().take_events(EVENTS_MAP).context("Failed to init perf map")?;
    let pump = PerfEventPump::new(events, tx);

    if !quiet {
        println!("Starting packet tracing on interface {iface}... Press Ctrl-C to end.");
    }

    let renderer = Renderer::new(std::io::stdout(), args.time_zone());
    let consumer = EventConsumer::new(clock, renderer, std::io::stderr());
    let consumer = tokio::spawn(consumer.run(rx));

    let shutdown = async {
        let reason = signals.wait().await;
        if !quiet {
            println!("\nRemoving filter from interface {iface}");
        }
        reason
    };

    let report = run_session(attached, pump, consumer, shutdown)
        .await
        .context("Failed to start perf event delivery")?;

    if let Some(consumer) = report.consumer {
        let stats = consumer.stats();
        info!(
            "{}: {} events traced, {} malformed",
            report.reason, stats.decoded, stats.malformed
        );
    }

    Ok(())
}
