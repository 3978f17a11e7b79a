//! Log record formatting with color support
//!
//! This module handles the formatting of log records into human-readable strings.
//! Supports custom format templates, JSON output, time formatting, ANSI colors,
//! thread-local scratch buffers and rule-attachment rendering.

use crate::diagnostics::DiagnosticsSnapshot;
use crate::level::Level;
use crate::record::LogRecord;
use serde_json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    static SCRATCH: RefCell<String> = RefCell::new(String::with_capacity(256));
}

/// Atomic counters tracked by every [`Formatter`] instance, surfaced through
/// [`crate::metrics::Metrics`].
#[derive(Default)]
pub struct FormatterMetrics {
    pub records_formatted: AtomicU64,
    pub json_formats: AtomicU64,
    pub custom_formats: AtomicU64,
    pub format_errors: AtomicU64,
    pub bytes_formatted: AtomicU64,
}

/// Named time formats, resolved alongside the token-replacement pattern path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedTimeFormat {
    Default,
    Iso8601,
    Rfc3339,
    Unix,
    UnixMs,
}

impl NamedTimeFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(NamedTimeFormat::Default),
            "ISO8601" | "iso8601" => Some(NamedTimeFormat::Iso8601),
            "RFC3339" | "rfc3339" => Some(NamedTimeFormat::Rfc3339),
            "unix" => Some(NamedTimeFormat::Unix),
            "unix_ms" => Some(NamedTimeFormat::UnixMs),
            _ => None,
        }
    }
}

/// Formatter for converting log records to formatted strings.
///
/// Supports multiple output formats including plain text, JSON, and custom
/// templates. Handles ANSI color codes for console output and custom time
/// formatting.
#[derive(Clone)]
pub struct Formatter {
    /// Optional custom format template string
    format_string: Option<String>,
    /// Enable JSON output format
    json: bool,
    /// Two-space-indent JSON output
    pretty_json: bool,
    /// Enable timestamp in output
    date_enabled: bool,
    /// Custom date/time format pattern
    date_style: Option<String>,
    /// Enable ANSI color codes
    color_enabled: bool,
    /// Custom colors for each log level
    level_colors: HashMap<Level, String>,
    /// Include call-site location in the default text line
    show_source: bool,
    /// Diagnostics snapshot resolved for `{diag.*}` placeholders
    diagnostics: Option<std::sync::Arc<DiagnosticsSnapshot>>,
    pub metrics: std::sync::Arc<FormatterMetrics>,
}

impl Formatter {
    pub fn new(
        format_string: Option<String>,
        json: bool,
        date_enabled: bool,
        date_style: Option<String>,
    ) -> Self {
        let mut level_colors = HashMap::new();
        for level in Level::all_levels() {
            level_colors.insert(level, level.default_color().to_string());
        }

        Self {
            format_string,
            json,
            pretty_json: false,
            date_enabled,
            date_style,
            color_enabled: true,
            level_colors,
            show_source: false,
            diagnostics: None,
            metrics: std::sync::Arc::new(FormatterMetrics::default()),
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    pub fn with_level_colors(mut self, colors: HashMap<Level, String>) -> Self {
        self.level_colors = colors;
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn with_show_source(mut self, show: bool) -> Self {
        self.show_source = show;
        self
    }

    pub fn with_diagnostics(mut self, snapshot: DiagnosticsSnapshot) -> Self {
        self.diagnostics = Some(std::sync::Arc::new(snapshot));
        self
    }

    pub fn format(&self, record: &LogRecord) -> String {
        let output = if self.json {
            self.metrics.json_formats.fetch_add(1, Ordering::Relaxed);
            self.format_json(record)
        } else if let Some(ref fmt) = self.format_string {
            self.metrics.custom_formats.fetch_add(1, Ordering::Relaxed);
            self.apply_format(fmt, record)
        } else {
            self.format_default(record)
        };

        self.metrics.records_formatted.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .bytes_formatted
            .fetch_add(output.len() as u64, Ordering::Relaxed);
        output
    }

    fn format_default(&self, record: &LogRecord) -> String {
        SCRATCH.with(|scratch| {
            let mut line = scratch.borrow_mut();
            line.clear();

            if self.date_enabled {
                let time_format = self.date_style.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");
                line.push('[');
                line.push_str(&self.format_time(&record.timestamp, time_format));
                line.push_str("] ");
            }

            line.push('[');
            line.push_str(record.level.as_str());
            line.push_str("] ");

            if self.show_source
                && let Some(ref source) = record.source
            {
                let module = source.module.as_deref().unwrap_or("?");
                let lineno = source.line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
                line.push_str(&format!("{}:{}: ", module, lineno));
            }

            line.push_str(&record.message);

            for (key, value) in &record.fields {
                line.push_str(&format!(" | {}={}", key, value));
            }
            line.push('\n');

            let mut output = if self.color_enabled {
                let color = self
                    .level_colors
                    .get(&record.level)
                    .map(|s| s.as_str())
                    .unwrap_or(record.level.default_color());
                self.colorize_level(&line, color)
            } else {
                line.clone()
            };

            for attachment in &record.rule_messages {
                let prefix = attachment
                    .prefix
                    .clone()
                    .unwrap_or_else(|| attachment.category.default_prefix().to_string());
                let color = attachment
                    .color
                    .clone()
                    .unwrap_or_else(|| attachment.category.default_color().to_string());
                output.push('\n');
                if self.color_enabled {
                    output.push_str(&self.colorize_level(
                        &format!("    {} {}", prefix, attachment.message),
                        &color,
                    ));
                } else {
                    output.push_str(&format!("    {} {}", prefix, attachment.message));
                }
            }

            output
        })
    }

    fn render_level(&self, level: Level) -> String {
        if self.color_enabled {
            let color = self
                .level_colors
                .get(&level)
                .map(|s| s.as_str())
                .unwrap_or(level.default_color());
            self.colorize_level(level.as_str(), color)
        } else {
            level.as_str().to_string()
        }
    }

    fn format_json(&self, record: &LogRecord) -> String {
        let mut map = serde_json::Map::new();
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(record.timestamp.to_rfc3339()),
        );
        map.insert(
            "level".to_string(),
            serde_json::Value::String(record.level.as_str().to_string()),
        );
        map.insert(
            "message".to_string(),
            serde_json::Value::String(record.message.clone()),
        );

        if let Some(ref source) = record.source {
            map.insert(
                "source".to_string(),
                serde_json::to_value(source).unwrap_or(serde_json::Value::Null),
            );
        }
        if let Some(ref trace_id) = record.trace_id {
            map.insert("trace_id".to_string(), serde_json::Value::String(trace_id.clone()));
        }
        if let Some(duration_ns) = record.duration_ns {
            map.insert("duration_ns".to_string(), serde_json::Value::from(duration_ns));
        }
        if let Some(ref error_info) = record.error_info {
            map.insert(
                "error".to_string(),
                serde_json::to_value(error_info).unwrap_or(serde_json::Value::Null),
            );
        }

        for (key, value) in &record.fields {
            map.insert(key.clone(), serde_json::Value::from(value.clone()));
        }

        if !record.rule_messages.is_empty() {
            map.insert(
                "rules".to_string(),
                serde_json::to_value(&record.rule_messages).unwrap_or(serde_json::Value::Null),
            );
        }

        let value = serde_json::Value::Object(map);
        if self.pretty_json {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
        }
    }

    fn colorize_level(&self, text: &str, color_code: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", color_code, text)
    }

    fn format_time(&self, timestamp: &chrono::DateTime<chrono::Utc>, pattern: &str) -> String {
        if let Some(named) = NamedTimeFormat::parse(pattern) {
            return match named {
                NamedTimeFormat::Default => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                NamedTimeFormat::Iso8601 => timestamp.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
                NamedTimeFormat::Rfc3339 => timestamp.to_rfc3339(),
                NamedTimeFormat::Unix => timestamp.timestamp().to_string(),
                NamedTimeFormat::UnixMs => timestamp.timestamp_millis().to_string(),
            };
        }

        // Support custom time format patterns
        let mut result = pattern.to_string();

        // Year patterns
        result = result.replace("YYYY", &timestamp.format("%Y").to_string());
        result = result.replace("YY", &timestamp.format("%y").to_string());

        // Month patterns
        result = result.replace("MMMM", &timestamp.format("%B").to_string());
        result = result.replace("MMM", &timestamp.format("%b").to_string());
        result = result.replace("MM", &timestamp.format("%m").to_string());

        // Day patterns
        result = result.replace("dddd", &timestamp.format("%A").to_string());
        result = result.replace("ddd", &timestamp.format("%a").to_string());
        result = result.replace("DD", &timestamp.format("%d").to_string());

        // Hour patterns
        result = result.replace("HH", &timestamp.format("%H").to_string());
        result = result.replace("hh", &timestamp.format("%I").to_string());

        // Minute/Second patterns
        result = result.replace("mm", &timestamp.format("%M").to_string());
        result = result.replace("ss", &timestamp.format("%S").to_string());

        // Milliseconds/Microseconds
        result = result.replace("SSS", &timestamp.format("%3f").to_string());
        result = result.replace("SSSSSS", &timestamp.format("%6f").to_string());

        // AM/PM
        result = result.replace("A", &timestamp.format("%p").to_string());
        result = result.replace("a", &timestamp.format("%P").to_string());

        // Timezone
        result = result.replace("ZZ", &timestamp.format("%:z").to_string());
        result = result.replace("Z", &timestamp.format("%z").to_string());

        result
    }

    fn diag_placeholder(&self, key: &str) -> Option<String> {
        let diag = self.diagnostics.as_ref()?;
        match key {
            "os" => Some(diag.os_tag.to_string()),
            "arch" => Some(diag.arch.to_string()),
            "cores" => diag.logical_cores.map(|c| c.to_string()),
            "cpu_model" => diag.cpu_model.clone(),
            _ => None,
        }
    }

    fn apply_format(&self, fmt: &str, record: &LogRecord) -> String {
        let mut result = fmt.to_string();

        // Handle time with custom format: {time:YYYY-MM-DD HH:mm:ss}
        if result.contains("{time:")
            && let Some(start) = result.find("{time:")
            && let Some(end) = result[start..].find('}')
        {
            let time_pattern = &result[start + 6..start + end];
            let formatted_time = self.format_time(&record.timestamp, time_pattern);
            result = result.replace(&format!("{{time:{}}}", time_pattern), &formatted_time);
        }

        // Default time format
        result = result.replace("{time}", &record.timestamp.to_rfc3339());

        result = result.replace("{level}", &self.render_level(record.level));
        result = result.replace("{message}", &record.message);

        result = result.replace(
            "{thread}",
            &format!("{:?}", std::thread::current().id()),
        );

        if let Some(ref module) = record.source {
            if let Some(ref m) = module.module {
                result = result.replace("{module}", m);
            }
            if let Some(ref f) = module.function {
                result = result.replace("{function}", f);
            }
            if let Some(ref filename) = module.file {
                result = result.replace("{filename}", filename);
            }
            if let Some(line) = module.line {
                result = result.replace("{lineno}", &line.to_string());
            }
            let caller = match (&module.module, module.line) {
                (Some(m), Some(l)) => format!("{}:{}", m, l),
                (Some(m), None) => m.clone(),
                _ => "?".to_string(),
            };
            result = result.replace("{caller}", &caller);
        }

        // Diagnostics placeholders: {diag.os}, {diag.arch}, {diag.cores}, ...
        while let Some(start) = result.find("{diag.") {
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let key = &result[start + 6..start + end];
            let replacement = self.diag_placeholder(key).unwrap_or_default();
            result.replace_range(start..start + end + 1, &replacement);
        }

        // Add extra fields
        for (key, value) in &record.fields {
            result = result.replace(&format!("{{{}}}", key), &value.to_string());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_text_format_includes_level_and_message() {
        let formatter = Formatter::new(None, false, true, None).with_color(false);
        let record = LogRecord::new(Level::Info, "hello".to_string());
        let out = formatter.format(&record);
        assert!(out.contains("[INFO]"));
        assert!(out.contains("hello"));
    }

    #[test]
    fn test_json_format_has_fixed_key_order_fields() {
        let formatter = Formatter::new(None, true, true, None);
        let record = LogRecord::new(Level::Warning, "disk low".to_string());
        let out = formatter.format(&record);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["level"], "WARNING");
        assert_eq!(value["message"], "disk low");
    }

    #[test]
    fn test_custom_template_substitutes_placeholders() {
        let formatter = Formatter::new(Some("{level}: {message}".to_string()), false, false, None)
            .with_color(false);
        let record = LogRecord::new(Level::Error, "boom".to_string());
        assert_eq!(formatter.format(&record), "ERROR: boom");
    }

    #[test]
    fn test_named_time_format_unix() {
        let formatter = Formatter::new(None, false, false, None);
        let record = LogRecord::new(Level::Info, "t".to_string());
        let out = formatter.format_time(&record.timestamp, "unix");
        assert_eq!(out, record.timestamp.timestamp().to_string());
    }

    #[test]
    fn test_rule_attachment_appended_in_text_mode() {
        let formatter = Formatter::new(None, false, false, None).with_color(false);
        let mut record = LogRecord::new(Level::Error, "failure".to_string());
        record.rule_messages.push(crate::rules::RuleAttachment {
            category: crate::rules::AttachmentCategory::Security,
            message: "possible breach".to_string(),
            title: None,
            url: None,
            color: None,
            prefix: None,
            background: None,
        });
        let out = formatter.format(&record);
        assert!(out.contains("possible breach"));
    }

    #[test]
    fn test_metrics_increment_on_format() {
        let formatter = Formatter::new(None, true, false, None);
        let record = LogRecord::new(Level::Info, "m".to_string());
        formatter.format(&record);
        assert_eq!(formatter.metrics.json_formats.load(Ordering::Relaxed), 1);
        assert_eq!(formatter.metrics.records_formatted.load(Ordering::Relaxed), 1);
    }
}
