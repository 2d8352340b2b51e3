//! reporter.rs
//! Consumer loop: receives each Track from the generator and prints the fast ones.
//! - single consumer, strict FIFO (rendezvous channel, no buffering)
//! - filter: speed strictly above SPEED_THRESHOLD, everything else is dropped silently
//! - exits when the generator closes the handoff

use crossbeam::channel::Receiver;
use std::io::{self, Write};
use log::debug;

use crate::component_a::track::Track;
use crate::utils::metrics::{self, SharedMetrics};

pub const SPEED_THRESHOLD: u32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReporterSummary {
    pub received: u64,
    pub reported: u64,
}

#[inline]
pub fn exceeds_threshold(track: &Track) -> bool {
    track.speed() > SPEED_THRESHOLD
}

/// Human-readable line: label, id, latitude, longitude, speed.
pub fn format_report(track: &Track) -> String {
    format!(
        "Vehicle is going faster than {} mph ID:  {} Latitude:  {} Longitude:  {} Speed:  {}",
        SPEED_THRESHOLD,
        track.id(),
        track.latitude(),
        track.longitude(),
        track.speed()
    )
}

pub struct Reporter<W: Write> {
    rx: Receiver<Track>,
    out: W,
    metrics: SharedMetrics,
    summary: ReporterSummary,
}

impl<W: Write> Reporter<W> {
    pub fn new(rx: Receiver<Track>, out: W, metrics: SharedMetrics) -> Self {
        Self {
            rx,
            out,
            metrics,
            summary: ReporterSummary::default(),
        }
    }

    /// Applies the filter to one track. Ok(true) if a line was written.
    pub fn handle_track(&mut self, track: &Track) -> io::Result<bool> {
        self.summary.received += 1;

        if !exceeds_threshold(track) {
            metrics::lock(&self.metrics).discarded += 1;
            return Ok(false);
        }

        writeln!(self.out, "{}", format_report(track))?;
        self.out.flush()?;

        self.summary.reported += 1;
        metrics::lock(&self.metrics).reported += 1;
        Ok(true)
    }

    /// Blocks on the handoff until the generator closes it.
    /// A failed write stops the loop; dropping the receiver then stops the generator.
    pub fn run(&mut self) -> io::Result<ReporterSummary> {
        while let Ok(track) = self.rx.recv() {
            self.handle_track(&track)?;
        }
        debug!(
            "[Reporter] end of stream: received={} reported={}",
            self.summary.received, self.summary.reported
        );
        Ok(self.summary)
    }

    pub fn summary(&self) -> ReporterSummary {
        self.summary
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
