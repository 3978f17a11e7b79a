//! Token-bucket rate limiting
//!
//! Sits after the sampler in the emit pipeline: once a record is accepted by
//! sampling, the rate limiter decides whether the pipeline has budget left to
//! actually write it. Global by default, or one bucket per [`Level`] when
//! `per_level` is configured — continuous refill rather than fixed windows,
//! so a burst right at a window boundary cannot double the effective rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::level::Level;
use crate::sampler::GateStats;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(burst_size: f64) -> Self {
        Self {
            tokens: burst_size,
            last_refill: Instant::now(),
        }
    }

    fn try_consume(&mut self, max_per_second: f64, burst_size: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed * max_per_second).min(burst_size);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

fn level_slot(level: Level) -> usize {
    match level {
        Level::Trace => 0,
        Level::Debug => 1,
        Level::Info => 2,
        Level::Success => 3,
        Level::Warning => 4,
        Level::Error => 5,
        Level::Fail => 6,
        Level::Critical => 7,
    }
}

/// Configuration for [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub max_per_second: f64,
    pub burst_size: f64,
    /// When true, each [`Level`] gets its own independent bucket.
    pub per_level: bool,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_per_second: 1000.0,
            burst_size: 1000.0,
            per_level: false,
        }
    }
}

enum Buckets {
    Single(Mutex<Bucket>),
    PerLevel([Mutex<Bucket>; 8]),
}

/// A token-bucket rate limiter applied after sampling in the emit pipeline.
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: Buckets,
    accepted: AtomicU64,
    rejected: AtomicU64,
    stats: GateStats,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let buckets = if config.per_level {
            Buckets::PerLevel(std::array::from_fn(|_| Mutex::new(Bucket::new(config.burst_size))))
        } else {
            Buckets::Single(Mutex::new(Bucket::new(config.burst_size)))
        };

        Self {
            config,
            buckets,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            stats: GateStats::default(),
        }
    }

    /// Attempts to admit a record at the given level. Returns `true` if
    /// there was budget, `false` if it should be dropped.
    pub fn try_acquire(&self, level: Level) -> bool {
        let allowed = match &self.buckets {
            Buckets::Single(bucket) => bucket
                .lock()
                .try_consume(self.config.max_per_second, self.config.burst_size),
            Buckets::PerLevel(buckets) => buckets[level_slot(level)]
                .lock()
                .try_consume(self.config.max_per_second, self.config.burst_size),
        };

        if allowed {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.record(level, allowed);

        allowed
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> &GateStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_throttle() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_per_second: 1.0,
            burst_size: 2.0,
            per_level: false,
        });

        assert!(limiter.try_acquire(Level::Info));
        assert!(limiter.try_acquire(Level::Info));
        assert!(!limiter.try_acquire(Level::Info));
        assert_eq!(limiter.rejected(), 1);
    }

    #[test]
    fn test_per_level_buckets_are_independent() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_per_second: 1.0,
            burst_size: 1.0,
            per_level: true,
        });

        assert!(limiter.try_acquire(Level::Info));
        assert!(!limiter.try_acquire(Level::Info));
        assert!(limiter.try_acquire(Level::Error));
    }
}
