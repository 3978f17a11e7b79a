//! Log record structure
//!
//! Defines the core LogRecord type that represents a single log entry.
//! Records carry a timestamp, level, message, call-site location, trace
//! context, structured error info, and an ordered set of custom fields.

use crate::level::Level;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON-like value carried in a record's context map.
///
/// A tagged sum type rather than a direct `serde_json::Value` re-export so
/// that non-JSON sinks are not forced to round-trip through `serde_json`.
/// Conversions to/from `serde_json::Value` keep the JSON formatter unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ContextValue>),
    Object(IndexMap<String, ContextValue>),
}

impl ContextValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Null => write!(f, "null"),
            ContextValue::Bool(b) => write!(f, "{}", b),
            ContextValue::Integer(i) => write!(f, "{}", i),
            ContextValue::Float(v) => write!(f, "{}", v),
            ContextValue::String(s) => write!(f, "{}", s),
            ContextValue::Array(_) | ContextValue::Object(_) => {
                let json = serde_json::to_string(self).unwrap_or_else(|_| "null".to_string());
                write!(f, "{}", json)
            }
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::String(s)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        ContextValue::Integer(i)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ContextValue::Null,
            serde_json::Value::Bool(b) => ContextValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ContextValue::Integer(i)
                } else {
                    ContextValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => ContextValue::String(s),
            serde_json::Value::Array(arr) => {
                ContextValue::Array(arr.into_iter().map(ContextValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, ContextValue::from(v));
                }
                ContextValue::Object(out)
            }
        }
    }
}

impl From<ContextValue> for serde_json::Value {
    fn from(value: ContextValue) -> Self {
        match value {
            ContextValue::Null => serde_json::Value::Null,
            ContextValue::Bool(b) => serde_json::Value::Bool(b),
            ContextValue::Integer(i) => serde_json::Value::from(i),
            ContextValue::Float(v) => serde_json::json!(v),
            ContextValue::String(s) => serde_json::Value::String(s),
            ContextValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            ContextValue::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, serde_json::Value::from(v));
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

/// Source location captured at the call site, if the caller provided one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub module: Option<String>,
    pub function: Option<String>,
}

/// Structured error information attached to a record, e.g. by an
/// exception-handling callback or a caught `Result::Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    pub stack_trace: Option<String>,
    pub code: Option<i64>,
}

/// A single log record containing all information about a log entry.
///
/// Records are created by the logger and passed through filters, the
/// sampler, the rate limiter, the redactor, and the rules engine before
/// being handed to formatters and sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// UTC timestamp when the log was created
    pub timestamp: DateTime<Utc>,
    /// Monotonic-source nanosecond timestamp, used for ordering rather than display
    #[serde(default)]
    pub timestamp_ns: i64,
    /// Log level (TRACE, DEBUG, INFO, etc.)
    pub level: Level,
    /// Log message text
    pub message: String,
    /// Call-site source location
    #[serde(default)]
    pub source: Option<SourceLocation>,
    /// Distributed tracing identifiers
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub span_id: Option<String>,
    #[serde(default)]
    pub parent_span_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// Duration of a timed operation, in nanoseconds
    #[serde(default)]
    pub duration_ns: Option<u64>,
    /// Structured error information
    #[serde(default)]
    pub error_info: Option<ErrorInfo>,
    /// Additional structured fields (ordered key-value pairs)
    #[serde(default)]
    pub fields: IndexMap<String, ContextValue>,
    /// Diagnostic attachments appended by the rules engine
    #[serde(default)]
    pub rule_messages: Vec<crate::rules::RuleAttachment>,
}

impl LogRecord {
    /// Creates a new log record with the specified level and message.
    pub fn new(level: Level, message: String) -> Self {
        let now = Utc::now();
        Self {
            timestamp_ns: now.timestamp_nanos_opt().unwrap_or_default(),
            timestamp: now,
            level,
            message,
            source: None,
            trace_id: None,
            span_id: None,
            parent_span_id: None,
            correlation_id: None,
            duration_ns: None,
            error_info: None,
            fields: IndexMap::new(),
            rule_messages: Vec::new(),
        }
    }

    /// Adds a custom field to the log record.
    pub fn with_field(mut self, key: String, value: impl Into<ContextValue>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    /// Sets location information for the log record (legacy flat form, kept
    /// for call sites built around the original four-field shape).
    pub fn with_location(
        mut self,
        module: Option<String>,
        function: Option<String>,
        filename: Option<String>,
        lineno: Option<u32>,
    ) -> Self {
        self.source = Some(SourceLocation {
            file: filename,
            line: lineno,
            column: None,
            module,
            function,
        });
        self
    }

    /// Sets a fully-populated source location.
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets trace/span/correlation identifiers in one call.
    pub fn with_trace_ids(
        mut self,
        trace_id: Option<String>,
        span_id: Option<String>,
        parent_span_id: Option<String>,
        correlation_id: Option<String>,
    ) -> Self {
        self.trace_id = trace_id;
        self.span_id = span_id;
        self.parent_span_id = parent_span_id;
        self.correlation_id = correlation_id;
        self
    }

    /// Sets the duration of a timed operation.
    pub fn with_duration(mut self, duration_ns: u64) -> Self {
        self.duration_ns = Some(duration_ns);
        self
    }

    /// Attaches structured error information.
    pub fn with_error_info(mut self, error_info: ErrorInfo) -> Self {
        self.error_info = Some(error_info);
        self
    }

    /// Accessors mirroring the original flat location fields.
    pub fn module(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.module.as_deref())
    }

    pub fn function(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.function.as_deref())
    }

    pub fn filename(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.file.as_deref())
    }

    pub fn lineno(&self) -> Option<u32> {
        self.source.as_ref().and_then(|s| s.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_optional_fields() {
        let record = LogRecord::new(Level::Info, "hello".to_string());
        assert!(record.source.is_none());
        assert!(record.trace_id.is_none());
        assert!(record.rule_messages.is_empty());
    }

    #[test]
    fn test_context_value_json_roundtrip() {
        let value: ContextValue = serde_json::json!({"a": 1, "b": [1, 2, "x"]}).into();
        let back: serde_json::Value = value.into();
        assert_eq!(back["a"], 1);
        assert_eq!(back["b"][2], "x");
    }

    #[test]
    fn test_with_field_preserves_insertion_order() {
        let record = LogRecord::new(Level::Info, "m".to_string())
            .with_field("z".to_string(), 1i64)
            .with_field("a".to_string(), 2i64);
        let keys: Vec<&str> = record.fields.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_location_accessors() {
        let record = LogRecord::new(Level::Debug, "m".to_string()).with_location(
            Some("mod".to_string()),
            Some("func".to_string()),
            Some("file.rs".to_string()),
            Some(42),
        );
        assert_eq!(record.module(), Some("mod"));
        assert_eq!(record.lineno(), Some(42));
    }
}
