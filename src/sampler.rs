//! Record sampling strategies
//!
//! Sampling decides, after filtering, whether an accepted record is actually
//! emitted. Kept dependency-free of an RNG crate (the teacher never pulls in
//! `rand`) via a small thread-local xorshift64 generator, seeded once from
//! the current time and thread id — adequate for a non-cryptographic
//! sampling decision, not for anything security sensitive.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::level::Level;

thread_local! {
    static RNG_STATE: Cell<u64> = Cell::new(seed());
}

fn seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E3779B97F4A7C15);
    let tid = format!("{:?}", std::thread::current().id());
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in tid.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (nanos ^ hash) | 1
}

/// Returns a uniform `f64` in `[0, 1)` using a thread-local xorshift64 state.
fn next_f64() -> f64 {
    RNG_STATE.with(|cell| {
        let mut x = cell.get();
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        cell.set(x);
        (x >> 11) as f64 / (1u64 << 53) as f64
    })
}

/// Lock-free gate statistics shared by the filter, sampler and rate limiter.
#[derive(Default)]
pub struct GateStats {
    pub total_processed: AtomicU64,
    pub total_accepted: AtomicU64,
    pub total_rejected: AtomicU64,
    pub per_level_accepted: [AtomicU64; 8],
}

impl GateStats {
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

    pub fn record(&self, level: Level, accepted: bool) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
        if accepted {
            self.total_accepted.fetch_add(1, Ordering::Relaxed);
            self.per_level_accepted[Self::level_slot(level)].fetch_add(1, Ordering::Relaxed);
        } else {
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn current_rate(&self) -> f64 {
        let processed = self.total_processed.load(Ordering::Relaxed);
        if processed == 0 {
            return 1.0;
        }
        self.total_accepted.load(Ordering::Relaxed) as f64 / processed as f64
    }
}

struct AdaptiveState {
    probability: f64,
    window_start: Instant,
    window_accepted: u64,
}

/// A single sampling strategy applied to accepted records.
pub enum SamplerStrategy {
    /// Every record is emitted.
    None,
    /// Emit with fixed probability `p` in `[0, 1]`.
    Probability(f64),
    /// Emit every Nth record, counted from 1.
    EveryN(u64),
    /// Token-bucket style cap: at most `max_records` per `window_ms`.
    RateLimit { max_records: u64, window_ms: u64 },
    /// Periodically recompute a probability to approach `target_rate`.
    Adaptive {
        target_rate: f64,
        min_rate: f64,
        adjustment_interval_ms: u64,
    },
}

/// Applies a [`SamplerStrategy`] to a stream of records, tracking stats.
pub struct Sampler {
    strategy: SamplerStrategy,
    stats: GateStats,
    every_n_counter: AtomicU64,
    rate_limit_state: Mutex<(Instant, u64)>,
    adaptive_state: Mutex<AdaptiveState>,
}

impl Sampler {
    pub fn new(strategy: SamplerStrategy) -> Self {
        Self {
            strategy,
            stats: GateStats::default(),
            every_n_counter: AtomicU64::new(0),
            rate_limit_state: Mutex::new((Instant::now(), 0)),
            adaptive_state: Mutex::new(AdaptiveState {
                probability: 1.0,
                window_start: Instant::now(),
                window_accepted: 0,
            }),
        }
    }

    /// Returns whether the given level's record should be emitted.
    pub fn should_sample(&self, level: Level) -> bool {
        let accept = match &self.strategy {
            SamplerStrategy::None => true,
            SamplerStrategy::Probability(p) => next_f64() < *p,
            SamplerStrategy::EveryN(n) => {
                if *n <= 1 {
                    true
                } else {
                    self.every_n_counter.fetch_add(1, Ordering::Relaxed) % n == 0
                }
            }
            SamplerStrategy::RateLimit {
                max_records,
                window_ms,
            } => {
                let mut state = self.rate_limit_state.lock();
                let (window_start, count) = &mut *state;
                if window_start.elapsed().as_millis() as u64 >= *window_ms {
                    *window_start = Instant::now();
                    *count = 0;
                }
                if *count < *max_records {
                    *count += 1;
                    true
                } else {
                    false
                }
            }
            SamplerStrategy::Adaptive {
                target_rate,
                min_rate,
                adjustment_interval_ms,
            } => {
                let mut state = self.adaptive_state.lock();
                if state.window_start.elapsed().as_millis() as u64 >= *adjustment_interval_ms {
                    let observed = self.stats.current_rate();
                    state.probability = if observed > 0.0 {
                        (*target_rate / observed).clamp(*min_rate, 1.0)
                    } else {
                        1.0
                    };
                    state.window_start = Instant::now();
                    state.window_accepted = 0;
                }
                let p = state.probability;
                let sampled = next_f64() < p;
                if sampled {
                    state.window_accepted += 1;
                }
                sampled
            }
        };

        self.stats.record(level, accept);
        accept
    }

    pub fn stats(&self) -> &GateStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_always_accepts() {
        let sampler = Sampler::new(SamplerStrategy::None);
        for _ in 0..10 {
            assert!(sampler.should_sample(Level::Info));
        }
    }

    #[test]
    fn test_every_n() {
        let sampler = Sampler::new(SamplerStrategy::EveryN(3));
        let accepted: Vec<bool> = (0..6).map(|_| sampler.should_sample(Level::Info)).collect();
        assert_eq!(accepted, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn test_probability_zero_never_accepts() {
        let sampler = Sampler::new(SamplerStrategy::Probability(0.0));
        for _ in 0..20 {
            assert!(!sampler.should_sample(Level::Debug));
        }
    }

    #[test]
    fn test_rate_limit_caps_within_window() {
        let sampler = Sampler::new(SamplerStrategy::RateLimit {
            max_records: 2,
            window_ms: 10_000,
        });
        assert!(sampler.should_sample(Level::Info));
        assert!(sampler.should_sample(Level::Info));
        assert!(!sampler.should_sample(Level::Info));
    }
}
