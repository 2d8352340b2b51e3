//! generator.rs
//! Periodic track producer.
//! - Releases one Track per interval on a fixed schedule (missed ticks are skipped, not replayed)
//! - Handoff is a rendezvous send: a slow reporter holds the generator back, nothing queues
//! - Cancellation (Shutdown) interrupts both the release wait and a pending handoff, then closes the channel

use crossbeam::channel::{select, Sender};
use rand::{TryRngCore, rngs::OsRng};
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::{
    thread,
    time::{Duration, Instant},
};
use log::{debug, info};

use crate::component_a::track::{Track, TrackError};
use crate::utils::{
    config::{Config, Pacing},
    metrics::{self, SharedMetrics, push_capped_u64},
    shutdown::Shutdown,
};

/// Shortest accepted interval; a zero period would never leave the release schedule.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    interval: Duration,
    pacing: Pacing,
}

impl GeneratorConfig {
    /// Intervals below `MIN_INTERVAL` are raised to it.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            pacing: Pacing::Blocking,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }
}

impl From<&Config> for GeneratorConfig {
    fn from(config: &Config) -> Self {
        Self::new(config.interval).with_pacing(config.pacing)
    }
}

/// Timed producer. `I` is the cryptographic source for track ids.
pub struct Generator<I = OsRng> {
    config: GeneratorConfig,
    id_rng: I,
    shutdown: Shutdown,
    metrics: SharedMetrics,
}

impl Generator<OsRng> {
    pub fn new(config: GeneratorConfig, shutdown: Shutdown, metrics: SharedMetrics) -> Self {
        Self::with_id_source(config, OsRng, shutdown, metrics)
    }
}

impl<I: TryRngCore> Generator<I> {
    pub fn with_id_source(
        config: GeneratorConfig,
        id_rng: I,
        shutdown: Shutdown,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            config,
            id_rng,
            shutdown,
            metrics,
        }
    }

    /// Main generator loop: periodic release, build, rendezvous handoff.
    ///
    /// Returns Ok(()) once cancelled or once the reporter hangs up. An id
    /// generation failure ends the loop with the error; nothing is sent for
    /// that tick. `tx` is dropped on every exit path, which closes the handoff.
    pub fn run(mut self, tx: Sender<Track>) -> Result<(), TrackError> {
        // ====================================================================
        // Periodic release schedule
        // ====================================================================
        let period = self.config.interval;
        let period_us = period.as_micros() as u64;
        let sleeper = SpinSleeper::new(100_000)
            .with_spin_strategy(SpinStrategy::YieldThread);
        let mut rng = rand::rng();

        let mut next_release = Instant::now() + period;
        let mut last_tick = Instant::now();
        let mut seq: u64 = 1;

        info!(
            "[Generator] started: interval={:?} pacing={:?}",
            period, self.config.pacing
        );

        while self.wait_for_release(next_release, &sleeper) {
            let actual_tick = Instant::now();

            let actual_period_us = actual_tick.duration_since(last_tick).as_micros() as u64;
            let jitter_us = actual_period_us.abs_diff(period_us);
            last_tick = actual_tick;

            // Fatal for the generator: never emit a degraded id
            let track = Track::generate(&mut self.id_rng, &mut rng)?;

            {
                let mut m = metrics::lock(&self.metrics);
                m.generated += 1;
                push_capped_u64(&mut m.jitter_us, jitter_us);
            }
            debug!("[Generator] #{} {} speed={}", seq, track.id(), track.speed());

            // ================================================================
            // Rendezvous handoff (blocks until the reporter takes it)
            // ================================================================
            let handoff_start = Instant::now();
            select! {
                send(tx, track) -> res => {
                    if res.is_err() {
                        debug!("[Generator] reporter hung up");
                        break;
                    }
                }
                recv(self.shutdown.signal()) -> _ => break,
            }
            let waited = handoff_start.elapsed();

            let skipped = schedule_next(&mut next_release, period, Instant::now());
            {
                let mut m = metrics::lock(&self.metrics);
                m.delivered += 1;
                if waited > period {
                    m.throttled += 1;
                }
                m.deadline_miss += skipped;
            }
            if skipped > 0 {
                debug!("[Generator] #{} overran, skipped {} tick(s)", seq, skipped);
            }

            seq += 1;
        }

        drop(tx);
        debug!("[Generator] stopped after {} release(s).", seq - 1);
        Ok(())
    }

    /// Sleeps until `release`. False once cancelled.
    fn wait_for_release(&self, release: Instant, sleeper: &SpinSleeper) -> bool {
        let now = Instant::now();
        if now < release {
            match self.config.pacing {
                Pacing::Blocking => return !self.shutdown.wait_timeout(release - now),
                Pacing::Spin => sleeper.sleep(release - now),
            }
        }
        !self.shutdown.is_cancelled()
    }
}

impl<I: TryRngCore + Send + 'static> Generator<I> {
    /// Runs the generator on its own thread.
    pub fn spawn(self, tx: Sender<Track>) -> thread::JoinHandle<Result<(), TrackError>> {
        thread::spawn(move || self.run(tx))
    }
}

/// Advances `next` past `now` in whole periods. Returns how many ticks were
/// skipped beyond the one just served.
pub fn schedule_next(next: &mut Instant, period: Duration, now: Instant) -> u64 {
    if period.is_zero() {
        *next = now;
        return 0;
    }

    *next += period;
    if *next > now {
        return 0;
    }

    let behind = now.duration_since(*next).as_nanos();
    let skipped = behind / period.as_nanos() + 1;
    *next += Duration::from_nanos((period.as_nanos() * skipped) as u64);
    skipped as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;

    #[test]
    fn test_schedule_next_on_time() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let mut next = start + period;
        let skipped = schedule_next(&mut next, period, start + Duration::from_millis(12));
        assert_eq!(skipped, 0);
        assert_eq!(next, start + period * 2);
    }

    #[test]
    fn test_schedule_next_skips_missed_ticks() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let mut next = start + period;
        // reporter held the handoff until t=45ms: ticks at 20, 30, 40 are gone
        let skipped = schedule_next(&mut next, period, start + Duration::from_millis(45));
        assert_eq!(skipped, 3);
        assert_eq!(next, start + period * 5);
    }

    #[test]
    fn test_schedule_next_deadline_equal_to_now() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let mut next = start + period;
        let skipped = schedule_next(&mut next, period, start + period * 2);
        assert_eq!(skipped, 1);
        assert_eq!(next, start + period * 3);
    }

    #[test]
    fn test_schedule_next_zero_period_returns() {
        let now = Instant::now();
        let mut next = now - Duration::from_millis(5);
        assert_eq!(schedule_next(&mut next, Duration::ZERO, now), 0);
        assert_eq!(next, now);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let config = GeneratorConfig::new(Duration::ZERO);
        assert_eq!(config.interval(), MIN_INTERVAL);
        assert_eq!(config.pacing(), Pacing::Blocking);

        let from_config = GeneratorConfig::from(&Config {
            interval: Duration::ZERO,
            pacing: Pacing::Spin,
            run_for: None,
        });
        assert_eq!(from_config.interval(), MIN_INTERVAL);
        assert_eq!(from_config.pacing(), Pacing::Spin);
    }

    #[test]
    fn test_zero_interval_still_cancellable() {
        let shutdown = Shutdown::new();
        let (tx, rx) = bounded(0);
        let handle = Generator::new(
            GeneratorConfig::new(Duration::ZERO),
            shutdown.clone(),
            metrics::shared(),
        )
        .spawn(tx);

        for _ in 0..3 {
            assert!(rx.recv_timeout(Duration::from_secs(3)).is_ok());
        }
        shutdown.cancel();

        let deadline = Instant::now() + Duration::from_secs(3);
        while !handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished(), "generator ignored cancellation");
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_emits_tracks_until_cancelled() {
        let shutdown = Shutdown::new();
        let metrics = metrics::shared();
        let (tx, rx) = bounded(0);
        let generator = Generator::new(
            GeneratorConfig::new(Duration::from_millis(2)),
            shutdown.clone(),
            metrics.clone(),
        );
        let handle = generator.spawn(tx);

        let received: Vec<Track> = rx.iter().take(5).collect();
        shutdown.cancel();

        assert!(handle.join().unwrap().is_ok());
        assert_eq!(received.len(), 5);
        assert!(rx.recv().is_err(), "handoff must close after cancel");
        assert!(metrics::lock(&metrics).delivered >= 5);
    }

    #[test]
    fn test_spin_pacing_emits_tracks() {
        let shutdown = Shutdown::new();
        let (tx, rx) = bounded(0);
        let generator = Generator::new(
            GeneratorConfig::new(Duration::from_millis(1)).with_pacing(Pacing::Spin),
            shutdown.clone(),
            metrics::shared(),
        );
        let handle = generator.spawn(tx);

        assert_eq!(rx.iter().take(3).count(), 3);
        shutdown.cancel();
        drop(rx);
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_stops_when_reporter_hangs_up() {
        let (tx, rx) = bounded(0);
        let generator = Generator::new(
            GeneratorConfig::new(Duration::from_millis(1)),
            Shutdown::new(),
            metrics::shared(),
        );
        drop(rx);
        assert!(generator.run(tx).is_ok());
    }
}
