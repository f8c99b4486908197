//! Inference statistics (lock-free counters)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    rows_scored: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub inference_count: u64,
    pub rows_scored: u64,
    pub failures: u64,
    pub avg_latency_ms: f32,
}

impl InferenceStats {
    pub fn record_success(&self, elapsed: Duration, rows: usize) {
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.rows_scored.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        StatsSnapshot {
            inference_count: count,
            rows_scored: self.rows_scored.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(InferenceStats::default().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_average_latency() {
        let stats = InferenceStats::default();
        stats.record_success(Duration::from_millis(2), 1);
        stats.record_success(Duration::from_millis(4), 10);
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.inference_count, 2);
        assert_eq!(snap.rows_scored, 11);
        assert_eq!(snap.failures, 1);
        assert!((snap.avg_latency_ms - 3.0).abs() < 1e-3);
    }
}
