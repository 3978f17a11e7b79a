//! Portable environment snapshot for format placeholders and diagnostics records
//!
//! Only uses facilities the standard library exposes on every target triple
//! the crate supports. Anything the platform can't answer portably comes
//! back as `None` rather than shelling out to `/proc` or platform-specific
//! crates.

use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time snapshot of the host environment.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    pub os_tag: &'static str,
    pub arch: &'static str,
    pub cpu_model: Option<String>,
    pub logical_cores: Option<usize>,
    pub total_mem_bytes: Option<u64>,
    pub avail_mem_bytes: Option<u64>,
    pub drives: Vec<DriveInfo>,
}

#[derive(Debug, Clone)]
pub struct DriveInfo {
    pub mount_point: String,
    pub total_bytes: Option<u64>,
    pub avail_bytes: Option<u64>,
}

static LAST_COLLECTED_NS: AtomicU64 = AtomicU64::new(0);

/// Collects what the standard library can answer portably; everything else
/// is `None`. `cpu_model` and memory/drive figures are left unset here since
/// reading them requires platform-specific APIs outside this crate's
/// dependency set.
pub fn collect() -> DiagnosticsSnapshot {
    DiagnosticsSnapshot {
        os_tag: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        cpu_model: None,
        logical_cores: std::thread::available_parallelism().ok().map(|n| n.get()),
        total_mem_bytes: None,
        avail_mem_bytes: None,
        drives: Vec::new(),
    }
}

/// Records the timestamp (nanoseconds since epoch) of the most recent
/// [`collect`] call, so callers that poll on a timer can skip redundant work.
pub fn mark_collected(now_ns: i64) {
    LAST_COLLECTED_NS.store(now_ns as u64, Ordering::Relaxed);
}

pub fn last_collected_ns() -> i64 {
    LAST_COLLECTED_NS.load(Ordering::Relaxed) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_returns_known_os_and_arch() {
        let snap = collect();
        assert!(!snap.os_tag.is_empty());
        assert!(!snap.arch.is_empty());
    }

    #[test]
    fn test_collect_reports_at_least_one_core() {
        let snap = collect();
        assert!(snap.logical_cores.unwrap_or(1) >= 1);
    }

    #[test]
    fn test_mark_and_read_last_collected() {
        mark_collected(12345);
        assert_eq!(last_collected_ns(), 12345);
    }
}
