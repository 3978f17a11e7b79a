//! Runtime metrics for the logging pipeline
//!
//! A single `Arc`-shared counter block updated on the hot emit path and
//! snapshotted on demand. Per-slot atomics avoid taking any lock to read a
//! single counter; only the per-sink map takes a lock, and only one
//! `RwLock` read per snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::level::Level;

const LEVEL_SLOTS: usize = 8;

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

/// Per-sink atomic counters.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    pub records_written: AtomicU64,
    pub bytes_written: AtomicU64,
    pub write_errors: AtomicU64,
}

impl SinkMetrics {
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        SinkMetricsSnapshot {
            records_written: self.records_written.load(Ordering::Acquire),
            bytes_written: self.bytes_written.load(Ordering::Acquire),
            write_errors: self.write_errors.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkMetricsSnapshot {
    pub records_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
}

/// Shared, lock-light counters for the whole logger.
pub struct Metrics {
    total_records: AtomicU64,
    total_bytes: AtomicU64,
    dropped_records: AtomicU64,
    error_count: AtomicU64,
    per_level: [AtomicU64; LEVEL_SLOTS],
    per_sink: parking_lot::RwLock<HashMap<usize, Arc<SinkMetrics>>>,
    start_time_ns: AtomicI64,
}

impl Metrics {
    pub fn new(start_time_ns: i64) -> Arc<Self> {
        Arc::new(Self {
            total_records: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            dropped_records: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            per_level: Default::default(),
            per_sink: parking_lot::RwLock::new(HashMap::new()),
            start_time_ns: AtomicI64::new(start_time_ns),
        })
    }

    pub fn record_emitted(&self, level: Level, bytes: u64) {
        self.total_records.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.per_level[level_slot(level)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_metrics(&self, sink_id: usize) -> Arc<SinkMetrics> {
        if let Some(m) = self.per_sink.read().get(&sink_id) {
            return m.clone();
        }
        let mut write = self.per_sink.write();
        write
            .entry(sink_id)
            .or_insert_with(|| Arc::new(SinkMetrics::default()))
            .clone()
    }

    pub fn remove_sink_metrics(&self, sink_id: usize) {
        self.per_sink.write().remove(&sink_id);
    }

    pub fn get_snapshot(&self, now_ns: i64) -> MetricsSnapshot {
        let total_records = self.total_records.load(Ordering::Acquire);
        let total_bytes = self.total_bytes.load(Ordering::Acquire);
        let dropped_records = self.dropped_records.load(Ordering::Acquire);
        let error_count = self.error_count.load(Ordering::Acquire);
        let start_time_ns = self.start_time_ns.load(Ordering::Acquire);

        let uptime_ns = (now_ns - start_time_ns).max(1) as f64;
        let uptime_ms = uptime_ns / 1_000_000.0;
        let uptime_s = uptime_ns / 1_000_000_000.0;

        let per_level = self
            .per_level
            .iter()
            .map(|c| c.load(Ordering::Acquire))
            .collect();

        let per_sink = self
            .per_sink
            .read()
            .iter()
            .map(|(id, m)| (*id, m.snapshot()))
            .collect();

        let processed = total_records + dropped_records;
        let drop_rate = if processed == 0 {
            0.0
        } else {
            dropped_records as f64 / processed as f64
        };
        let error_rate = if total_records == 0 {
            0.0
        } else {
            error_count as f64 / total_records as f64
        };

        MetricsSnapshot {
            total_records,
            total_bytes,
            dropped_records,
            error_count,
            per_level,
            per_sink,
            uptime_ms,
            records_per_second: total_records as f64 / uptime_s.max(1e-6),
            bytes_per_second: total_bytes as f64 / uptime_s.max(1e-6),
            drop_rate,
            error_rate,
        }
    }
}

/// Point-in-time, serializable view of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_records: u64,
    pub total_bytes: u64,
    pub dropped_records: u64,
    pub error_count: u64,
    pub per_level: Vec<u64>,
    pub per_sink: HashMap<usize, SinkMetricsSnapshot>,
    pub uptime_ms: f64,
    pub records_per_second: f64,
    pub bytes_per_second: f64,
    pub drop_rate: f64,
    pub error_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let metrics = Metrics::new(0);
        metrics.record_emitted(Level::Info, 128);
        metrics.record_emitted(Level::Error, 64);
        metrics.record_dropped();

        let snap = metrics.get_snapshot(1_000_000_000);
        assert_eq!(snap.total_records, 2);
        assert_eq!(snap.total_bytes, 192);
        assert_eq!(snap.dropped_records, 1);
        assert_eq!(snap.per_level[level_slot(Level::Info)], 1);
        assert_eq!(snap.per_level[level_slot(Level::Error)], 1);
    }

    #[test]
    fn test_sink_metrics_created_on_demand() {
        let metrics = Metrics::new(0);
        let sink_metrics = metrics.sink_metrics(7);
        sink_metrics.records_written.fetch_add(3, Ordering::Relaxed);
        let snap = metrics.get_snapshot(1);
        assert_eq!(snap.per_sink[&7].records_written, 3);
    }
}
