//! Run metrics for the generator → reporter pipeline.
//!
//! - **Counters:** tracks generated, delivered (accepted by the reporter), reported, discarded.
//! - **Release timing:** late releases (deadline misses) and release jitter, bounded to 1000 points.
//! - **Backpressure:** handoffs where the reporter kept the generator waiting longer than one interval.
//!
//! Shared as `Arc<Mutex<Metrics>>`; locks are held only for a counter bump.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};
use log::info;

#[derive(Debug, Default, Clone)]
pub struct Metrics {
    pub generated: u64,
    pub delivered: u64,
    pub reported: u64,
    pub discarded: u64,

    /// Releases that woke up after their scheduled tick
    pub deadline_miss: u64,
    /// Handoffs that blocked for longer than one interval
    pub throttled: u64,

    /// Release jitter (microseconds, last 1000 ticks)
    pub jitter_us: VecDeque<u64>,
}

pub type SharedMetrics = Arc<Mutex<Metrics>>;

pub const MAX_POINTS: usize = 1_000;

pub fn shared() -> SharedMetrics {
    Arc::new(Mutex::new(Metrics::default()))
}

/// Locks the metrics block; a panicked holder only leaves counters behind, so poison is ignored.
#[inline]
pub fn lock(metrics: &SharedMetrics) -> MutexGuard<'_, Metrics> {
    match metrics.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Appends u64 value to metrics buffer; removes oldest if at capacity.
#[inline]
pub fn push_capped_u64(buf: &mut VecDeque<u64>, val: u64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Computes min, max, mean for u64 buffer (cast to f64).
pub fn calculate_stats_u64(data: &VecDeque<u64>) -> Option<Stats> {
    if data.is_empty() {
        return None;
    }

    let count = data.len();
    let min = data.iter().map(|&x| x as f64).fold(f64::INFINITY, f64::min);
    let max = data.iter().map(|&x| x as f64).fold(f64::NEG_INFINITY, f64::max);
    let mean = data.iter().map(|&x| x as f64).sum::<f64>() / count as f64;

    Some(Stats { min, max, mean, count })
}

/// Logs the end-of-run summary at info level.
pub fn log_summary(metrics: &SharedMetrics) {
    let m = lock(metrics);

    info!(
        "[Summary] generated={} delivered={} reported={} discarded={}",
        m.generated, m.delivered, m.reported, m.discarded
    );
    info!(
        "[Summary] deadline_misses={} throttled_handoffs={}",
        m.deadline_miss, m.throttled
    );

    if let Some(jitter) = calculate_stats_u64(&m.jitter_us) {
        info!(
            "[Summary] jitter_us min={:.2} max={:.2} avg={:.2} samples={}",
            jitter.min, jitter.max, jitter.mean, jitter.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_capped_drops_oldest() {
        let mut buf = VecDeque::new();
        for v in 0..(MAX_POINTS as u64 + 5) {
            push_capped_u64(&mut buf, v);
        }
        assert_eq!(buf.len(), MAX_POINTS);
        assert_eq!(buf.front(), Some(&5));
        assert_eq!(buf.back(), Some(&(MAX_POINTS as u64 + 4)));
    }

    #[test]
    fn test_stats_empty_buffer() {
        assert_eq!(calculate_stats_u64(&VecDeque::new()), None);
    }

    #[test]
    fn test_stats_values() {
        let buf: VecDeque<u64> = vec![10, 20, 30].into();
        let s = calculate_stats_u64(&buf).unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 30.0);
        assert_eq!(s.mean, 20.0);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_lock_survives_poison() {
        let metrics = shared();
        let m2 = metrics.clone();
        let _ = std::thread::spawn(move || {
            let _guard = m2.lock().unwrap();
            panic!("poison the metrics");
        })
        .join();

        lock(&metrics).generated += 1;
        assert_eq!(lock(&metrics).generated, 1);
    }
}
