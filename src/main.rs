//! # Track Simulation Entry Point
//!
//! Generator thread → rendezvous channel → reporter loop on the main thread.
//!
//! ## Key Architecture
//! - **Generator:** one randomized Track per interval (default 1 s), blocking handoff.
//! - **Reporter:** prints tracks with speed > 10 to stdout, discards the rest.
//!
//! ## Concurrency
//! - Zero-capacity channel: a slow reporter throttles the generator, nothing queues.
//! - Shutdown token (Ctrl-C or `TRACKSIM_RUN_SECS`): generator stops, handoff closes,
//!   reporter drains and returns.
//!
//! ## Exit codes
//! - 0 after cancellation, 1 if the entropy source fails or stdout is unwritable.

use track_simulation::{
    component_a::generator::{Generator, GeneratorConfig},
    component_b::reporter::Reporter,
    utils::{
        config::Config,
        metrics::{self, log_summary},
        shutdown::Shutdown,
    },
};

use crossbeam::channel::bounded;
use std::{
    io::stdout,
    process::ExitCode,
    thread,
};
use log::{info, error};

fn main() -> ExitCode {
    env_logger::init();
    info!("=== TRACK SIMULATION START ===");

    let config = Config::from_env();
    info!(
        "[Main] interval={:?} pacing={:?} run_for={:?}",
        config.interval, config.pacing, config.run_for
    );

    let shutdown = Shutdown::new();
    let metrics = metrics::shared();

    {
        let on_signal = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("[Main] Ctrl-C received, shutting down...");
            on_signal.cancel();
        }) {
            error!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    // Optional fixed-duration run
    if let Some(run_for) = config.run_for {
        let timer = shutdown.clone();
        thread::spawn(move || {
            if !timer.wait_timeout(run_for) {
                info!("[Main] Time's up after {:?}", run_for);
                timer.cancel();
            }
        });
    }

    // Capacity 0: rendezvous, at most one track in flight
    let (tx, rx) = bounded(0);

    let generator_handle = Generator::new(
        GeneratorConfig::from(&config),
        shutdown.clone(),
        metrics.clone(),
    )
    .spawn(tx);

    let mut reporter = Reporter::new(rx, stdout().lock(), metrics.clone());
    let reported = reporter.run();

    // Receiver goes away before the join so a generator blocked on send wakes up
    drop(reporter);
    shutdown.cancel();

    let mut code = ExitCode::SUCCESS;

    match reported {
        Ok(summary) => info!(
            "[Main] Reporter done: received={} reported={}",
            summary.received, summary.reported
        ),
        Err(e) => {
            error!("[Main] Failed to write report: {}", e);
            code = ExitCode::FAILURE;
        }
    }

    match generator_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("[Main] Generator failed: {}", e);
            code = ExitCode::FAILURE;
        }
        Err(_) => {
            error!("[Main] Generator thread panicked");
            code = ExitCode::FAILURE;
        }
    }

    log_summary(&metrics);
    info!("=== TRACK SIMULATION FINISHED ===");
    code
}
