//! Log levels with priority-based ordering
//!
//! Defines 8 standard log levels with numeric priorities and support for custom levels.
//! Each level has a default ANSI color code for console output.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Standard log levels with numeric priorities.
/// 
/// Levels are ordered by severity, with lower numbers being less severe.
/// Each level has a unique priority value used for filtering and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Trace level (priority 5) - Most verbose, for detailed debugging
    Trace = 5,
    /// Debug level (priority 10) - Debugging information
    Debug = 10,
    /// Info level (priority 20) - General information
    Info = 20,
    /// Success level (priority 25) - Successful operations
    Success = 25,
    /// Warning level (priority 30) - Warning messages
    Warning = 30,
    /// Error level (priority 40) - Error conditions
    Error = 40,
    /// Fail level (priority 45) - Operation failures
    Fail = 45,
    /// Critical level (priority 50) - Critical errors
    Critical = 50,
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fail => "FAIL",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn priority(&self) -> u8 {
        *self as u8
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            Level::Trace => "36",      // Cyan
            Level::Debug => "34",      // Blue
            Level::Info => "37",       // White
            Level::Success => "32",    // Green
            Level::Warning => "33",    // Yellow
            Level::Error => "31",      // Red
            Level::Fail => "35",       // Magenta
            Level::Critical => "91",   // Bright Red
        }
    }

    pub fn all_levels() -> Vec<Level> {
        vec![
            Level::Trace,
            Level::Debug,
            Level::Info,
            Level::Success,
            Level::Warning,
            Level::Error,
            Level::Fail,
            Level::Critical,
        ]
    }

    pub fn from_priority(priority: u8) -> Option<Self> {
        match priority {
            5 => Some(Level::Trace),
            10 => Some(Level::Debug),
            20 => Some(Level::Info),
            25 => Some(Level::Success),
            30 => Some(Level::Warning),
            40 => Some(Level::Error),
            45 => Some(Level::Fail),
            50 => Some(Level::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = crate::error::LoglyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "SUCCESS" => Ok(Level::Success),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "FAIL" => Ok(Level::Fail),
            "CRITICAL" | "CRIT" => Ok(Level::Critical),
            _ => Err(crate::error::LoglyError::InvalidLevel(s.to_string())),
        }
    }
}

/// Custom log level with user-defined priority and color.
///
/// Allows users to define their own log levels beyond the standard 8 levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomLevel {
    /// Name of the custom level
    pub name: String,
    /// Priority value (0-255)
    pub priority: u8,
    /// ANSI color code for console output
    pub color: String,
}

impl CustomLevel {
    pub fn new(name: String, priority: u8, color: String) -> Self {
        Self { name, priority, color }
    }
}

/// Opaque handle returned by [`register_custom_level`].
///
/// Stable for the lifetime of the process; holding one does not keep the
/// level registered (removal is still possible by name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomLevelHandle(String);

impl CustomLevelHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Process-wide custom level registry.
///
/// Individual `Logger` instances keep their own copy of custom levels in
/// `LoggerConfig` (consulted first by `log_custom`); this registry exists so
/// that a level registered by one part of a process can still be resolved
/// by code that only has a level name, e.g. deserializing a level from a
/// config file written by another logger instance. Name collisions across
/// independent `Logger`s are possible and are the caller's responsibility
/// to avoid.
static CUSTOM_LEVEL_REGISTRY: std::sync::OnceLock<RwLock<HashMap<String, CustomLevel>>> =
    std::sync::OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, CustomLevel>> {
    CUSTOM_LEVEL_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a custom level process-globally, returning a stable handle.
///
/// Re-registering the same name overwrites the previous priority/color;
/// callers that need "fail if exists" semantics should check
/// [`lookup_custom_level`] first.
pub fn register_custom_level(name: String, priority: u8, color: String) -> CustomLevelHandle {
    let level = CustomLevel::new(name.clone(), priority, color);
    registry().write().insert(name.clone(), level);
    CustomLevelHandle(name)
}

/// Looks up a custom level by name in the process-global registry.
pub fn lookup_custom_level(name: &str) -> Option<CustomLevel> {
    registry().read().get(name).cloned()
}

/// Removes a custom level from the process-global registry.
pub fn unregister_custom_level(name: &str) -> bool {
    registry().write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Level::Trace < Level::Critical);
        assert_eq!(Level::Warning.priority(), 30);
    }

    #[test]
    fn test_custom_level_registry_roundtrip() {
        let handle = register_custom_level("NOTICE_L".to_string(), 35, "96".to_string());
        assert_eq!(handle.name(), "NOTICE_L");
        let looked_up = lookup_custom_level("NOTICE_L").expect("registered level");
        assert_eq!(looked_up.priority, 35);
        assert!(unregister_custom_level("NOTICE_L"));
        assert!(lookup_custom_level("NOTICE_L").is_none());
    }
}
