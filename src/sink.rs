//! Sink management for log outputs
//!
//! Sinks are output destinations for log records (console, files, etc.).
//! Each sink has its own configuration, filters, formatter, and optional rotation.
//!
//! # Features
//!
//! - **Multiple outputs**: Console and file sinks
//! - **Async writes**: Non-blocking file writes with buffering
//! - **Rotation**: Automatic file rotation by size or time
//! - **Filtering**: Per-sink level, module, and function filters
//! - **Formatting**: Custom format templates and JSON output
//! - **Colors**: ANSI color support for console output, auto-detected on a TTY
//!
//! # Example
//!
//! ```no_run
//! use logly::prelude::*;
//! use std::path::PathBuf;
//!
//! let config = SinkConfig {
//!     path: Some(PathBuf::from("logs/app.log")),
//!     rotation: Some("daily".to_string()),
//!     size_limit: Some(10 * 1024 * 1024), // 10MB
//!     retention: Some(7), // Keep 7 files
//!     async_write: true,
//!     ..Default::default()
//! };
//! ```

use crate::callback::CallbackManager;
use crate::compression::{CompressionLevel, CompressionStats};
use crate::error::Result;
use crate::filter::Filter;
use crate::format::Formatter;
use crate::level::Level;
use crate::record::LogRecord;
use crate::rotation::{RotationManager, RotationPolicy};
use crossbeam_channel::{Sender, bounded};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Appends a newline unless one is already present, so the default format's
/// embedded `\n` (and any color wrap around it) is never doubled up while
/// custom templates, which don't terminate themselves, still get one.
fn ensure_trailing_newline(mut line: String) -> String {
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

/// The kind of destination a sink writes to. Network and custom-writer
/// transports are not implemented by this crate (out of scope); `Sink`
/// only tracks the tag and treats the underlying capability as an opaque
/// `Box<dyn Write + Send>` behind `kind`, never implementing a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    #[default]
    Console,
    File,
    Network,
    CustomWriter,
}

/// Compression settings for rotated files belonging to this sink.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub level: CompressionLevel,
    pub async_compress: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: CompressionLevel::Default,
            async_compress: false,
        }
    }
}

/// Configuration for a log sink.
///
/// Defines all settings for a single output destination including path,
/// rotation, filtering, formatting, and performance options.
pub struct SinkConfig {
    /// Destination kind (console, file, or an out-of-scope transport)
    pub kind: SinkKind,
    /// Human-readable sink name, used in diagnostics
    pub name: Option<String>,
    /// Whether this sink starts enabled
    pub enabled: bool,
    /// File path (None = console output)
    pub path: Option<PathBuf>,
    /// Rotation interval: "hourly", "daily", "weekly", "monthly", "yearly"
    pub rotation: Option<String>,
    /// Maximum file size before rotation (bytes)
    pub size_limit: Option<u64>,
    /// Number of rotated files to keep (None = unlimited)
    pub retention: Option<usize>,
    /// Minimum log level to accept
    pub filter_min_level: Option<Level>,
    /// Maximum log level to accept (records above this level are dropped)
    pub filter_max_level: Option<Level>,
    /// Filter by module name
    pub filter_module: Option<String>,
    /// Filter by function name
    pub filter_function: Option<String>,
    /// Enable async writes (recommended for file sinks)
    pub async_write: bool,
    /// Write buffer size in bytes
    pub buffer_size: usize,
    /// Flush interval in milliseconds
    pub flush_interval: u64,
    /// Maximum number of buffered log records
    pub max_buffered_lines: usize,
    /// Custom date/time format pattern
    pub date_style: Option<String>,
    /// Enable timestamp in output
    pub date_enabled: bool,
    /// Custom format template string
    pub format: Option<String>,
    /// Enable JSON output format
    pub json: bool,
    /// Two-space-indent JSON output
    pub pretty_json: bool,
    /// Enable ANSI color codes; `None` auto-detects from the destination TTY
    pub color: Option<bool>,
    /// Include call-site source location in formatted output
    pub include_source: bool,
    /// Include trace/span identifiers in formatted output
    pub include_trace_ids: bool,
    /// Include structured error info in formatted output
    pub include_error_info: bool,
    /// Include rule-engine attachments in formatted output
    pub include_rule_messages: bool,
    /// Whether a fresh file is truncated (`true`) or appended to (`false`)
    pub overwrite_mode: bool,
    /// Compression applied to files once rotated
    pub compression: CompressionConfig,
    /// Consecutive write failures tolerated before the sink self-disables
    pub max_consecutive_errors: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Console,
            name: None,
            enabled: true,
            path: None,
            rotation: None,
            size_limit: None,
            retention: None,
            filter_min_level: None,
            filter_max_level: None,
            filter_module: None,
            filter_function: None,
            async_write: true,
            buffer_size: 8192,
            flush_interval: 100,
            max_buffered_lines: 1000,
            date_style: None,
            date_enabled: false,
            format: None,
            json: false,
            pretty_json: false,
            color: None,
            include_source: false,
            include_trace_ids: false,
            include_error_info: false,
            include_rule_messages: true,
            overwrite_mode: false,
            compression: CompressionConfig::default(),
            max_consecutive_errors: 10,
        }
    }
}

/// A log output destination (sink).
///
/// Manages writing log records to console or file with optional filtering,
/// formatting, rotation, and async writes.
pub struct Sink {
    /// Unique sink identifier
    id: usize,
    /// Sink configuration
    config: SinkConfig,
    /// File writer (None for console sinks)
    writer: Arc<RwLock<Option<BufWriter<File>>>>,
    /// Filter for log records
    filter: Filter,
    /// Formatter for log records
    formatter: Formatter,
    /// Whether this sink is enabled
    enabled: Arc<RwLock<bool>>,
    /// Async write channel sender
    sender: Option<Sender<LogRecord>>,
    /// File rotation manager
    rotation_manager: Arc<RwLock<Option<RotationManager>>>,
    /// Compression throughput stats for this sink's rotated files
    compression_stats: Arc<CompressionStats>,
    /// Whether the JSON array opening bracket has been written yet
    wrote_first_record: Arc<AtomicBool>,
    /// Consecutive write failures since the last success
    consecutive_errors: AtomicU32,
    /// Error/disable callback hooks, shared with the owning Logger
    callbacks: CallbackManager,
}

impl Sink {
    /// Sets custom colors for log levels.
    ///
    /// # Arguments
    ///
    /// * `colors` - Map of log levels to ANSI color codes
    pub fn set_level_colors(
        &mut self,
        colors: std::collections::HashMap<crate::level::Level, String>,
    ) {
        self.formatter = self.formatter.clone().with_level_colors(colors);
    }
}

impl Sink {
    /// Creates a new sink with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique sink identifier
    /// * `config` - Sink configuration
    ///
    /// # Returns
    ///
    /// A new Sink instance, or an error if initialization fails
    pub fn new(id: usize, config: SinkConfig) -> Result<Self> {
        Self::with_callbacks(id, config, CallbackManager::new())
    }

    pub fn with_callbacks(id: usize, config: SinkConfig, callbacks: CallbackManager) -> Result<Self> {
        let mut filter = Filter::new(
            config.filter_min_level,
            config.filter_module.clone(),
            config.filter_function.clone(),
        );
        if let Some(max) = config.filter_max_level {
            filter.add_rule(crate::filter::FilterRule::LevelMax(max));
        }

        let is_console = matches!(config.kind, SinkKind::Console) && config.path.is_none();
        let color_enabled = config
            .color
            .unwrap_or_else(|| is_console && std::io::stdout().is_terminal());

        let formatter = Formatter::new(
            config.format.clone(),
            config.json,
            config.date_enabled,
            config.date_style.clone(),
        )
        .with_color(color_enabled)
        .with_pretty_json(config.pretty_json)
        .with_show_source(config.include_source);

        let writer = if let Some(ref path) = config.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = if config.overwrite_mode {
                OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)?
            } else {
                OpenOptions::new().create(true).append(true).open(path)?
            };
            Some(BufWriter::with_capacity(config.buffer_size, file))
        } else {
            None
        };

        let wrote_first_record = Arc::new(AtomicBool::new(false));

        let (sender, writer_arc) = if config.async_write {
            let (s, r) = bounded(config.max_buffered_lines);

            let writer_clone = Arc::new(RwLock::new(writer));
            let writer_ref = Arc::clone(&writer_clone);
            let formatter_clone = formatter.clone();
            let is_json = config.json;
            let is_file = config.path.is_some();
            let wrote_first_clone = Arc::clone(&wrote_first_record);

            std::thread::spawn(move || {
                while let Ok(record) = r.recv() {
                    if let Some(ref mut w) = *writer_ref.write() {
                        let body = formatter_clone.format(&record);
                        let line = if is_json && is_file {
                            let prefix = if wrote_first_clone.swap(true, Ordering::AcqRel) {
                                ","
                            } else {
                                "["
                            };
                            format!("{}{}\n", prefix, body)
                        } else if is_json {
                            format!("{}\n", body)
                        } else {
                            ensure_trailing_newline(body)
                        };
                        let _ = write!(w, "{}", line);
                        let _ = w.flush();
                    }
                }
            });

            (Some(s), writer_clone)
        } else {
            (None, Arc::new(RwLock::new(writer)))
        };

        // Initialize rotation manager
        let rotation_manager = if let Some(ref path) = config.path {
            if config.rotation.is_some() || config.size_limit.is_some() {
                let policy = match (&config.rotation, config.size_limit) {
                    (Some(interval), Some(size)) => RotationPolicy::Both(size, interval.clone()),
                    (Some(interval), None) => RotationPolicy::Time(interval.clone()),
                    (None, Some(size)) => RotationPolicy::Size(size),
                    _ => RotationPolicy::Size(10 * 1024 * 1024), // Default 10MB
                };
                Some(RotationManager::new(path.clone(), policy, config.retention))
            } else {
                None
            }
        } else {
            None
        };

        Ok(Self {
            id,
            config,
            writer: writer_arc,
            filter,
            formatter,
            enabled: Arc::new(RwLock::new(true)),
            sender,
            rotation_manager: Arc::new(RwLock::new(rotation_manager)),
            compression_stats: Arc::new(CompressionStats::default()),
            wrote_first_record,
            consecutive_errors: AtomicU32::new(0),
            callbacks,
        })
    }

    fn json_bracket_prefix(&self) -> &'static str {
        if self.wrote_first_record.swap(true, Ordering::AcqRel) {
            ","
        } else {
            "["
        }
    }

    /// Closes the JSON array for a file sink writing bracketed JSON.
    pub fn close(&self) -> Result<()> {
        if self.config.json && self.config.path.is_some() {
            if let Some(ref mut writer) = *self.writer.write() {
                writeln!(writer, "]")?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn note_write_error(&self, message: String) {
        self.callbacks.execute_exception_callbacks(&message, "");
        let failures = self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.max_consecutive_errors {
            self.disable();
        }
    }

    fn note_write_success(&self) {
        self.consecutive_errors.store(0, Ordering::Relaxed);
    }

    /// Writes a log record to this sink.
    ///
    /// # Arguments
    ///
    /// * `record` - The log record to write
    /// * `global_console` - Whether console output is globally enabled
    /// * `global_storage` - Whether file storage is globally enabled
    ///
    /// # Returns
    ///
    /// An error if writing fails
    pub fn log(
        &self,
        record: &LogRecord,
        global_console: bool,
        global_storage: bool,
    ) -> Result<()> {
        if !*self.enabled.read() {
            return Ok(());
        }

        if !self.filter.matches(record) {
            return Ok(());
        }

        let body = self.formatter.format(record);

        // Console output (if no file path and global console enabled). JSON
        // console sinks emit bare newline-separated objects, never the
        // bracket-wrapped array used for JSON files.
        if self.config.path.is_none() && global_console {
            if self.config.json {
                println!("{}", body);
            } else {
                print!("{}", ensure_trailing_newline(body));
            }
            return Ok(());
        }

        // File storage (only if global storage enabled)
        if !global_storage {
            return Ok(());
        }

        let formatted = if self.config.json {
            format!("{}{}\n", self.json_bracket_prefix(), body)
        } else {
            ensure_trailing_newline(body)
        };
        let data_size = formatted.len() as u64;

        // Check rotation
        if let Some(ref mut rotation) = *self.rotation_manager.write() {
            if rotation.should_rotate(data_size) {
                match rotation.rotate() {
                    Ok(rotated_path) => {
                        if let Some(ref path) = self.config.path {
                            if let Some(parent) = path.parent() {
                                std::fs::create_dir_all(parent)?;
                            }
                            let file = OpenOptions::new().create(true).append(true).open(path)?;
                            *self.writer.write() =
                                Some(BufWriter::with_capacity(self.config.buffer_size, file));
                        }
                        if self.config.compression.enabled {
                            let level = self.config.compression.level;
                            let stats = self.compression_stats.clone();
                            if self.config.compression.async_compress {
                                std::thread::spawn(move || {
                                    let buffer_size = 65536;
                                    let _ = crate::compression::compress_file(
                                        &rotated_path,
                                        &rotated_path.with_extension("logc"),
                                        level,
                                        buffer_size,
                                        &stats,
                                    );
                                });
                            } else {
                                let _ = rotation.compress_rotated(&rotated_path, level, 65536, &stats);
                            }
                        }
                    }
                    Err(err) => {
                        self.note_write_error(err.to_string());
                    }
                }
            }
            rotation.update_size(data_size);
        }

        let write_result = if let Some(ref sender) = self.sender {
            sender
                .send(record.clone())
                .map_err(|_| crate::error::LoglyError::ChannelSend)
        } else if let Some(ref mut writer) = *self.writer.write() {
            write!(writer, "{}", formatted)
                .and_then(|_| writer.flush())
                .map_err(crate::error::LoglyError::from)
        } else {
            Ok(())
        };

        match &write_result {
            Ok(()) => self.note_write_success(),
            Err(err) => self.note_write_error(err.to_string()),
        }

        write_result
    }

    /// Returns the sink's unique identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Enables this sink.
    pub fn enable(&self) {
        *self.enabled.write() = true;
    }

    /// Disables this sink.
    pub fn disable(&self) {
        *self.enabled.write() = false;
    }

    /// Checks if this sink is enabled.
    pub fn is_enabled(&self) -> bool {
        *self.enabled.read()
    }

    pub fn compression_stats(&self) -> &CompressionStats {
        &self.compression_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn test_console_sink_color_auto_detect_default_off_in_tests() {
        let config = SinkConfig {
            async_write: false,
            ..Default::default()
        };
        let sink = Sink::new(1, config).unwrap();
        assert!(sink.is_enabled());
    }

    #[test]
    fn test_json_bracket_prefix_transitions_from_open_to_comma() {
        let config = SinkConfig {
            async_write: false,
            json: true,
            path: Some(std::env::temp_dir().join(format!("logly_sink_test_{}.json", std::process::id()))),
            ..Default::default()
        };
        let sink = Sink::new(2, config).unwrap();
        let record = LogRecord::new(Level::Info, "first".to_string());
        sink.log(&record, false, true).unwrap();
        let record2 = LogRecord::new(Level::Info, "second".to_string());
        sink.log(&record2, false, true).unwrap();
        assert_eq!(sink.consecutive_errors.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_sink_disables_after_max_consecutive_errors() {
        let config = SinkConfig {
            async_write: false,
            max_consecutive_errors: 2,
            ..Default::default()
        };
        let sink = Sink::new(3, config).unwrap();
        sink.note_write_error("boom".to_string());
        assert!(sink.is_enabled());
        sink.note_write_error("boom again".to_string());
        assert!(!sink.is_enabled());
    }
}
