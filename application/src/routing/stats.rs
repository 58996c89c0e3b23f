//! Per-backend telemetry.

use serde::Serialize;

/// Latency at or beyond which the speed component of the score is zero.
const SLOW_LATENCY_MS: f64 = 10_000.0;

/// Running counters for one backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendStats {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub cache_hits: u64,
    pub total_latency_ms: u64,
}

impl BackendStats {
    pub fn record_success(&mut self, latency_ms: u64) {
        self.requests += 1;
        self.successes += 1;
        self.total_latency_ms += latency_ms;
    }

    pub fn record_failure(&mut self, latency_ms: u64) {
        self.requests += 1;
        self.failures += 1;
        self.total_latency_ms += latency_ms;
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            return 1.0;
        }
        self.successes as f64 / self.requests as f64
    }

    pub fn mean_latency_ms(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.total_latency_ms as f64 / self.requests as f64
    }

    /// `0.7 * success_rate + 0.3 * speed`, where speed falls linearly to zero at 10s.
    pub fn score(&self) -> f64 {
        let speed = 1.0 - (self.mean_latency_ms() / SLOW_LATENCY_MS).min(1.0);
        0.7 * self.success_rate() + 0.3 * speed
    }
}

/// Point-in-time view of one backend, for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendSnapshot {
    pub name: String,
    pub model: String,
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub cache_hits: u64,
    pub mean_latency_ms: f64,
    pub score: f64,
}

impl BackendSnapshot {
    pub fn from_stats(name: &str, model: &str, stats: &BackendStats) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
            requests: stats.requests,
            successes: stats.successes,
            failures: stats.failures,
            cache_hits: stats.cache_hits,
            mean_latency_ms: stats.mean_latency_ms(),
            score: stats.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_backend_scores_full() {
        assert!((BackendStats::default().score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_weights_success_and_speed() {
        let mut stats = BackendStats::default();
        stats.record_success(5_000);
        stats.record_failure(5_000);
        // success 0.5, speed 0.5
        assert!((stats.score() - (0.35 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn test_slow_backend_loses_speed_component() {
        let mut stats = BackendStats::default();
        stats.record_success(60_000);
        assert!((stats.score() - 0.7).abs() < 1e-9);
    }
}
