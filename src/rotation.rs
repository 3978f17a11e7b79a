//! File rotation and retention management
//!
//! Provides automatic log file rotation based on size or time intervals,
//! with configurable retention policies to manage disk space, optional
//! archiving to a separate directory, and optional synchronous or
//! thread-pooled compression of rotated files.
//!
//! # Rotation Policies
//!
//! - **Size**: Rotate when file reaches specified size
//! - **Time**: Rotate at specified intervals (hourly, daily, weekly, monthly, yearly)
//! - **Both**: Rotate when either size or time threshold is reached
//!
//! # Example
//!
//! ```no_run
//! use logly::rotation::{RotationManager, RotationPolicy};
//! use std::path::PathBuf;
//!
//! let policy = RotationPolicy::Both(10 * 1024 * 1024, "daily".to_string());
//! let mut manager = RotationManager::new(
//!     PathBuf::from("logs/app.log"),
//!     policy,
//!     Some(7) // Keep 7 rotated files
//! );
//! ```

use crate::error::{LoglyError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Policy for determining when to rotate log files.
#[derive(Debug, Clone)]
pub enum RotationPolicy {
    /// Rotate when file size exceeds the specified bytes
    Size(u64),
    /// Rotate at time intervals: "hourly", "daily", "weekly", "monthly", "yearly"
    Time(String),
    /// Rotate when either size or time threshold is reached
    Both(u64, String),
}

/// How rotated files are named.
#[derive(Debug, Clone)]
pub enum NamingStrategy {
    Timestamp,
    Date,
    IsoDatetime,
    Index,
    Custom(String),
}

/// What happened during a rotation, passed to registered callbacks.
#[derive(Debug, Clone)]
pub enum RotationEvent {
    Started { path: PathBuf },
    Completed { rotated_path: PathBuf },
    Archived { archived_path: PathBuf },
    CleanedUp { removed: Vec<PathBuf> },
    Error { message: String },
}

type RotationCallback = Arc<dyn Fn(RotationEvent) + Send + Sync>;

/// Aggregate rotation/retention statistics.
#[derive(Default)]
pub struct RotationStats {
    pub total_rotations: AtomicU64,
    pub files_archived: AtomicU64,
    pub files_deleted: AtomicU64,
    pub last_rotation_time_ns: AtomicU64,
    pub rotation_errors: AtomicU64,
    pub compression_errors: AtomicU64,
}

/// Manages log file rotation and retention.
///
/// Tracks file size and time, rotates files when thresholds are reached,
/// and applies retention policies to clean up old files.
pub struct RotationManager {
    /// Base path for the log file
    base_path: PathBuf,
    /// Rotation policy (size, time, or both)
    policy: RotationPolicy,
    /// Maximum number of rotated files to keep (None = unlimited)
    retention: Option<usize>,
    /// Maximum age of a rotated file before it is deleted, in nanoseconds
    retention_max_age_ns: Option<i64>,
    /// Directory rotated (and optionally compressed) files are moved into
    archive_dir: Option<PathBuf>,
    /// How rotated filenames are generated
    naming_strategy: NamingStrategy,
    /// Current size of the active log file in bytes
    current_size: u64,
    /// Timestamp of the last rotation
    last_rotation: DateTime<Utc>,
    /// Disambiguates rotations landing within the same wall-clock second
    same_second_counter: u32,
    last_rotation_second: i64,
    pub stats: RotationStats,
    callbacks: Vec<RotationCallback>,
}

impl RotationManager {
    /// Creates a new rotation manager.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Path to the log file
    /// * `policy` - Rotation policy (size, time, or both)
    /// * `retention` - Maximum number of rotated files to keep (None = unlimited)
    pub fn new(base_path: PathBuf, policy: RotationPolicy, retention: Option<usize>) -> Self {
        Self {
            base_path,
            policy,
            retention,
            retention_max_age_ns: None,
            archive_dir: None,
            naming_strategy: NamingStrategy::Timestamp,
            current_size: 0,
            last_rotation: Utc::now(),
            same_second_counter: 0,
            last_rotation_second: 0,
            stats: RotationStats::default(),
            callbacks: Vec::new(),
        }
    }

    pub fn with_archive_dir(mut self, dir: PathBuf) -> Self {
        self.archive_dir = Some(dir);
        self
    }

    pub fn with_naming_strategy(mut self, strategy: NamingStrategy) -> Self {
        self.naming_strategy = strategy;
        self
    }

    pub fn with_retention_max_age(mut self, max_age_ns: i64) -> Self {
        self.retention_max_age_ns = Some(max_age_ns);
        self
    }

    pub fn on_event(&mut self, callback: RotationCallback) {
        self.callbacks.push(callback);
    }

    fn fire(&self, event: RotationEvent) {
        for cb in &self.callbacks {
            cb(event.clone());
        }
    }

    /// Checks if the log file should be rotated.
    ///
    /// # Arguments
    ///
    /// * `additional_size` - Size of data about to be written
    ///
    /// # Returns
    ///
    /// `true` if rotation is needed, `false` otherwise
    pub fn should_rotate(&mut self, additional_size: u64) -> bool {
        match &self.policy {
            RotationPolicy::Size(max_size) => self.current_size + additional_size >= *max_size,
            RotationPolicy::Time(interval) => self.should_rotate_by_time(interval),
            RotationPolicy::Both(max_size, interval) => {
                (self.current_size + additional_size >= *max_size)
                    || self.should_rotate_by_time(interval)
            }
        }
    }

    /// Checks if rotation is needed based on time interval.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time interval string ("hourly", "daily", "weekly", "monthly", "yearly")
    ///
    /// # Returns
    ///
    /// `true` if the interval has elapsed since last rotation
    fn should_rotate_by_time(&self, interval: &str) -> bool {
        let now = Utc::now();
        let duration = now.signed_duration_since(self.last_rotation);

        match interval.to_lowercase().as_str() {
            "hourly" => duration.num_hours() >= 1,
            "daily" => duration.num_days() >= 1,
            "weekly" => duration.num_weeks() >= 1,
            "monthly" => duration.num_days() >= 30,
            "yearly" => duration.num_days() >= 365,
            _ => false,
        }
    }

    fn rotated_name(&mut self, stem: &str, extension: &str, now: DateTime<Utc>) -> String {
        let second = now.timestamp();
        if second == self.last_rotation_second {
            self.same_second_counter += 1;
        } else {
            self.same_second_counter = 0;
            self.last_rotation_second = second;
        }
        let suffix = self.same_second_counter;

        let base = match &self.naming_strategy {
            NamingStrategy::Timestamp => format!("{}_{}", stem, now.format("%Y%m%d_%H%M%S")),
            NamingStrategy::Date => format!("{}_{}", stem, now.format("%Y%m%d")),
            NamingStrategy::IsoDatetime => format!("{}_{}", stem, now.format("%Y%m%dT%H%M%S")),
            NamingStrategy::Index => format!("{}_{}", stem, self.stats.total_rotations.load(Ordering::Relaxed)),
            NamingStrategy::Custom(template) => template
                .replace("{base}", stem)
                .replace("{ext}", extension)
                .replace("{date}", &now.format("%Y%m%d").to_string())
                .replace("{time}", &now.format("%H%M%S").to_string())
                .replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
                .replace("{iso}", &now.to_rfc3339()),
        };

        if suffix > 0 {
            format!("{}.{}.{}", base, suffix, extension)
        } else {
            format!("{}.{}", base, extension)
        }
    }

    /// Rotates the log file by renaming it with a timestamp, per the
    /// 7-step sequence: (1) fire `Started`, (2) compute the rotated name,
    /// (3) rename, (4) optionally move to the archive directory, (5)
    /// optionally compress, (6) apply retention, (7) fire `Completed`.
    pub fn rotate(&mut self) -> Result<PathBuf> {
        let now = Utc::now();
        self.fire(RotationEvent::Started {
            path: self.base_path.clone(),
        });

        let extension = self
            .base_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("log")
            .to_string();

        let stem = self
            .base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoglyError::InvalidConfig("Invalid file path".to_string()))?
            .to_string();

        let parent = self
            .base_path
            .parent()
            .ok_or_else(|| LoglyError::InvalidConfig("Invalid file path".to_string()))?
            .to_path_buf();

        let name = self.rotated_name(&stem, &extension, now);
        let mut rotated_path = parent.join(&name);

        let rotate_result = (|| -> Result<()> {
            if self.base_path.exists() {
                fs::rename(&self.base_path, &rotated_path)?;
            }
            Ok(())
        })();

        if let Err(err) = rotate_result {
            self.stats.rotation_errors.fetch_add(1, Ordering::Relaxed);
            self.fire(RotationEvent::Error {
                message: err.to_string(),
            });
            return Err(err);
        }

        if let Some(ref archive_dir) = self.archive_dir {
            fs::create_dir_all(archive_dir)?;
            let archived_path = archive_dir.join(&name);
            if rotated_path.exists() {
                fs::rename(&rotated_path, &archived_path)?;
                rotated_path = archived_path.clone();
                self.stats.files_archived.fetch_add(1, Ordering::Relaxed);
                self.fire(RotationEvent::Archived { archived_path });
            }
        }

        self.current_size = 0;
        self.last_rotation = now;
        self.stats.total_rotations.fetch_add(1, Ordering::Relaxed);
        self.stats
            .last_rotation_time_ns
            .store(now.timestamp_nanos_opt().unwrap_or(0) as u64, Ordering::Relaxed);

        if let Some(retention) = self.retention {
            let dir = self.archive_dir.as_deref().unwrap_or(&parent);
            self.apply_retention(dir, &stem, &extension, retention)?;
        }
        if let Some(max_age_ns) = self.retention_max_age_ns {
            let dir = self.archive_dir.as_deref().unwrap_or(&parent).to_path_buf();
            self.apply_max_age(&dir, &stem, max_age_ns)?;
        }

        self.fire(RotationEvent::Completed {
            rotated_path: rotated_path.clone(),
        });

        Ok(rotated_path)
    }

    /// Compresses a just-rotated file in place, replacing it with a
    /// `.logc` container and removing the uncompressed original.
    pub fn compress_rotated(
        &self,
        rotated_path: &Path,
        level: crate::compression::CompressionLevel,
        buffer_size: usize,
        stats: &crate::compression::CompressionStats,
    ) -> Result<PathBuf> {
        let dest = rotated_path.with_extension(format!(
            "{}.logc",
            rotated_path.extension().and_then(|e| e.to_str()).unwrap_or("log")
        ));
        match crate::compression::compress_file(rotated_path, &dest, level, buffer_size, stats) {
            Ok(()) => {
                let _ = fs::remove_file(rotated_path);
                Ok(dest)
            }
            Err(err) => {
                self.stats.compression_errors.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Applies retention policy by deleting old rotated files.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory containing log files
    /// * `stem` - Base filename without extension
    /// * `extension` - File extension
    /// * `max_files` - Maximum number of files to keep
    fn apply_retention(
        &self,
        dir: &Path,
        stem: &str,
        extension: &str,
        max_files: usize,
    ) -> Result<()> {
        let mut log_files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                if let Some(name) = entry.file_name().to_str() {
                    name.starts_with(stem) && (name.ends_with(extension) || name.ends_with("logc"))
                } else {
                    false
                }
            })
            .collect();

        log_files.sort_by_key(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        if log_files.len() > max_files {
            let mut removed = Vec::new();
            for entry in log_files.iter().take(log_files.len() - max_files) {
                fs::remove_file(entry.path())?;
                self.stats.files_deleted.fetch_add(1, Ordering::Relaxed);
                removed.push(entry.path());
            }
            if !removed.is_empty() {
                self.fire(RotationEvent::CleanedUp { removed });
            }
        }

        Ok(())
    }

    fn apply_max_age(&self, dir: &Path, stem: &str, max_age_ns: i64) -> Result<()> {
        let now = Utc::now();
        let mut removed = Vec::new();
        for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
            let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
                continue;
            };
            if !name.starts_with(stem) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let age_ns = now
                .signed_duration_since(DateTime::<Utc>::from(modified))
                .num_nanoseconds()
                .unwrap_or(0);
            if age_ns > max_age_ns {
                fs::remove_file(entry.path())?;
                self.stats.files_deleted.fetch_add(1, Ordering::Relaxed);
                removed.push(entry.path());
            }
        }
        if !removed.is_empty() {
            self.fire(RotationEvent::CleanedUp { removed });
        }
        Ok(())
    }

    /// Updates the current file size by adding the specified bytes.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of bytes to add to current size
    pub fn update_size(&mut self, size: u64) {
        self.current_size += size;
    }

    /// Returns the current file size in bytes.
    pub fn current_size(&self) -> u64 {
        self.current_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_size_policy_triggers_rotation() {
        let mut manager = RotationManager::new(
            PathBuf::from("/tmp/logly_test_rotation.log"),
            RotationPolicy::Size(100),
            None,
        );
        assert!(!manager.should_rotate(50));
        manager.update_size(80);
        assert!(manager.should_rotate(30));
    }

    #[test]
    fn test_rotate_and_retention_with_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"hello").unwrap();

        let mut manager = RotationManager::new(path.clone(), RotationPolicy::Size(1), Some(1));
        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        manager.on_event(Arc::new(move |event| {
            events_clone
                .lock()
                .unwrap()
                .push(format!("{:?}", event));
        }));

        let rotated = manager.rotate().unwrap();
        assert!(rotated.exists());
        assert!(!path.exists());
        assert!(events.lock().unwrap().iter().any(|e| e.contains("Started")));
        assert!(events.lock().unwrap().iter().any(|e| e.contains("Completed")));
    }

    #[test]
    fn test_same_second_disambiguation_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut manager = RotationManager::new(path.clone(), RotationPolicy::Size(1), None);

        let now = Utc::now();
        let first = manager.rotated_name("app", "log", now);
        let second = manager.rotated_name("app", "log", now);
        assert_ne!(first, second);
    }
}
