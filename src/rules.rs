//! Rule-based diagnostic attachments
//!
//! Runs after redaction, before per-sink dispatch. A rule matches a record
//! and appends a [`RuleAttachment`] — an annotation carried on the record
//! rather than a side effect — so formatters can render it inline (text mode)
//! or as a `rules` array (JSON mode). An `AtomicBool` fast path lets empty or
//! disabled rulesets skip the mutex entirely.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::record::LogRecord;

/// How a rule matches a record's level.
#[derive(Debug, Clone)]
pub enum LevelMatch {
    Any,
    Exact(Level),
    PriorityMin(u8),
    PriorityMax(u8),
    PriorityRange(u8, u8),
    CustomName(String),
}

impl LevelMatch {
    fn matches(&self, level: Level) -> bool {
        match self {
            LevelMatch::Any => true,
            LevelMatch::Exact(l) => *l == level,
            LevelMatch::PriorityMin(min) => level.priority() >= *min,
            LevelMatch::PriorityMax(max) => level.priority() <= *max,
            LevelMatch::PriorityRange(min, max) => {
                level.priority() >= *min && level.priority() <= *max
            }
            LevelMatch::CustomName(_) => false,
        }
    }
}

/// The category of a rule attachment, driving default color/prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentCategory {
    Cause,
    Fix,
    Suggest,
    Action,
    Docs,
    Report,
    Note,
    Caution,
    Perf,
    Security,
    Custom,
}

impl AttachmentCategory {
    pub fn default_prefix(&self) -> &'static str {
        match self {
            AttachmentCategory::Cause => "🔍",
            AttachmentCategory::Fix => "🔧",
            AttachmentCategory::Suggest => "💡",
            AttachmentCategory::Action => "▶",
            AttachmentCategory::Docs => "📖",
            AttachmentCategory::Report => "📋",
            AttachmentCategory::Note => "ℹ",
            AttachmentCategory::Caution => "⚠",
            AttachmentCategory::Perf => "⏱",
            AttachmentCategory::Security => "🔒",
            AttachmentCategory::Custom => "•",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            AttachmentCategory::Cause => "36",
            AttachmentCategory::Fix => "32",
            AttachmentCategory::Suggest => "34",
            AttachmentCategory::Action => "35",
            AttachmentCategory::Docs => "90",
            AttachmentCategory::Report => "37",
            AttachmentCategory::Note => "36",
            AttachmentCategory::Caution => "33",
            AttachmentCategory::Perf => "34",
            AttachmentCategory::Security => "31",
            AttachmentCategory::Custom => "37",
        }
    }
}

/// A diagnostic note a matched rule attaches to a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleAttachment {
    pub category: AttachmentCategory,
    pub message: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub color: Option<String>,
    pub prefix: Option<String>,
    pub background: Option<String>,
}

/// A single rule in the engine.
pub struct Rule {
    pub id: u32,
    pub level_match: LevelMatch,
    pub module: Option<String>,
    pub function: Option<String>,
    pub message_contains: Option<String>,
    pub once: bool,
    pub fired: AtomicBool,
    pub priority: i32,
    pub enabled: bool,
    pub messages: Vec<RuleAttachment>,
}

impl Rule {
    pub fn new(id: u32, level_match: LevelMatch) -> Self {
        Self {
            id,
            level_match,
            module: None,
            function: None,
            message_contains: None,
            once: false,
            fired: AtomicBool::new(false),
            priority: 0,
            enabled: true,
            messages: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_message_contains(mut self, needle: impl Into<String>) -> Self {
        self.message_contains = Some(needle.into());
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_attachment(mut self, attachment: RuleAttachment) -> Self {
        self.messages.push(attachment);
        self
    }

    fn matches(&self, record: &LogRecord) -> bool {
        if !self.enabled {
            return false;
        }
        if self.once && self.fired.load(Ordering::Acquire) {
            return false;
        }
        if !self.level_match.matches(record.level) {
            return false;
        }
        if let Some(ref module) = self.module {
            if record.module() != Some(module.as_str()) {
                return false;
            }
        }
        if let Some(ref function) = self.function {
            if record.function() != Some(function.as_str()) {
                return false;
            }
        }
        if let Some(ref needle) = self.message_contains {
            if !record.message.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Fires per-rule callbacks registered via [`RulesEngine::set_attach_callback`].
pub type AttachCallback = Arc<dyn Fn(&Rule, &LogRecord) + Send + Sync>;

#[derive(Default)]
pub struct RulesEngineStats {
    pub rules_evaluated: AtomicU64,
    pub rules_matched: AtomicU64,
    pub messages_emitted: AtomicU64,
    pub evaluations_skipped: AtomicU64,
}

/// Ordered, priority-sorted collection of [`Rule`]s applied to each record.
pub struct RulesEngine {
    rules: Mutex<Vec<Rule>>,
    enabled_and_nonempty: AtomicBool,
    next_id: AtomicU32,
    attach_callback: Mutex<Option<AttachCallback>>,
    pub stats: RulesEngineStats,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            enabled_and_nonempty: AtomicBool::new(false),
            next_id: AtomicU32::new(1),
            attach_callback: Mutex::new(None),
            stats: RulesEngineStats::default(),
        }
    }

    pub fn set_attach_callback(&self, callback: AttachCallback) {
        *self.attach_callback.lock() = Some(callback);
    }

    /// Adds a rule, assigning it a fresh id if `rule.id == 0`.
    pub fn add(&self, mut rule: Rule) -> crate::error::Result<u32> {
        let mut rules = self.rules.lock();
        if rule.id == 0 {
            rule.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        } else if rules.iter().any(|r| r.id == rule.id) {
            return Err(crate::error::LoglyError::DuplicateRuleId(rule.id));
        }
        let id = rule.id;
        rules.push(rule);
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.enabled_and_nonempty.store(true, Ordering::Release);
        Ok(id)
    }

    pub fn remove(&self, id: u32) -> bool {
        let mut rules = self.rules.lock();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        if rules.is_empty() {
            self.enabled_and_nonempty.store(false, Ordering::Release);
        }
        rules.len() != before
    }

    /// Evaluates every matching, enabled rule against `record`, appending
    /// attachments directly onto it in priority order.
    pub fn evaluate(&self, record: &mut LogRecord) {
        if !self.enabled_and_nonempty.load(Ordering::Acquire) {
            self.stats.evaluations_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let rules = self.rules.lock();
        let callback = self.attach_callback.lock().clone();

        for rule in rules.iter() {
            self.stats.rules_evaluated.fetch_add(1, Ordering::Relaxed);
            if rule.matches(record) {
                self.stats.rules_matched.fetch_add(1, Ordering::Relaxed);
                if rule.once {
                    rule.fired.store(true, Ordering::Release);
                }
                for attachment in &rule.messages {
                    record.rule_messages.push(attachment.clone());
                    self.stats.messages_emitted.fetch_add(1, Ordering::Relaxed);
                }
                if let Some(ref cb) = callback {
                    cb(rule, record);
                }
            }
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_engine_skips_evaluation() {
        let engine = RulesEngine::new();
        let mut record = LogRecord::new(Level::Info, "hello".to_string());
        engine.evaluate(&mut record);
        assert!(record.rule_messages.is_empty());
        assert_eq!(engine.stats.evaluations_skipped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_matching_rule_attaches_message() {
        let engine = RulesEngine::new();
        let rule = Rule::new(0, LevelMatch::Exact(Level::Error))
            .with_message_contains("timeout")
            .with_attachment(RuleAttachment {
                category: AttachmentCategory::Perf,
                message: "slow downstream call".to_string(),
                title: None,
                url: None,
                color: None,
                prefix: None,
                background: None,
            });
        engine.add(rule).unwrap();

        let mut record = LogRecord::new(Level::Error, "request timeout after 30s".to_string());
        engine.evaluate(&mut record);
        assert_eq!(record.rule_messages.len(), 1);
    }

    #[test]
    fn test_once_rule_fires_only_once() {
        let engine = RulesEngine::new();
        let rule = Rule::new(0, LevelMatch::Any)
            .with_once(true)
            .with_attachment(RuleAttachment {
                category: AttachmentCategory::Note,
                message: "first sighting".to_string(),
                title: None,
                url: None,
                color: None,
                prefix: None,
                background: None,
            });
        engine.add(rule).unwrap();

        let mut first = LogRecord::new(Level::Info, "a".to_string());
        engine.evaluate(&mut first);
        let mut second = LogRecord::new(Level::Info, "b".to_string());
        engine.evaluate(&mut second);

        assert_eq!(first.rule_messages.len(), 1);
        assert_eq!(second.rule_messages.len(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let engine = RulesEngine::new();
        engine.add(Rule::new(5, LevelMatch::Any)).unwrap();
        let err = engine.add(Rule::new(5, LevelMatch::Any)).unwrap_err();
        assert!(matches!(err, crate::error::LoglyError::DuplicateRuleId(5)));
    }
}
