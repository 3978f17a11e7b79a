//! Log record filtering
//!
//! Provides filtering capabilities for log records based on level, module,
//! function, and a richer ordered rule list. Filters are applied before
//! records reach the sampler/rate-limiter/redactor stages.

use crate::level::Level;
use crate::record::LogRecord;

/// A single rule in an ordered [`Filter`] chain. Evaluation is first-deny-wins:
/// the first rule that does not match rejects the record outright.
pub enum FilterRule {
    LevelMin(Level),
    LevelMax(Level),
    LevelExact(Level),
    ModuleMatch(String),
    ModulePrefix(String),
    MessageContains(String),
    MessageRegex(regex::Regex),
    Custom(Box<dyn Fn(&LogRecord) -> bool + Send + Sync>),
}

impl FilterRule {
    fn matches(&self, record: &LogRecord) -> bool {
        match self {
            FilterRule::LevelMin(min) => record.level >= *min,
            FilterRule::LevelMax(max) => record.level <= *max,
            FilterRule::LevelExact(level) => record.level == *level,
            FilterRule::ModuleMatch(module) => record.module() == Some(module.as_str()),
            FilterRule::ModulePrefix(prefix) => record
                .module()
                .map(|m| m.starts_with(prefix.as_str()))
                .unwrap_or(false),
            FilterRule::MessageContains(needle) => record.message.contains(needle.as_str()),
            FilterRule::MessageRegex(re) => re.is_match(&record.message),
            FilterRule::Custom(predicate) => predicate(record),
        }
    }
}

/// Filter for log records based on level, module, function, and an ordered
/// rule chain.
///
/// Filters determine which log records should be processed by a sink.
/// The legacy `min_level`/`module`/`function` criteria (all must match) run
/// first; the `rules` chain then runs in order with first-deny-wins
/// semantics.
pub struct Filter {
    /// Minimum log level to accept (records below this level are filtered out)
    min_level: Option<Level>,
    /// Module name to match (exact match required)
    module: Option<String>,
    /// Function name to match (exact match required)
    function: Option<String>,
    /// Ordered rule chain, evaluated after the legacy criteria above.
    rules: Vec<FilterRule>,
}

impl Filter {
    /// Creates a new filter with the specified criteria.
    ///
    /// # Arguments
    ///
    /// * `min_level` - Minimum log level to accept
    /// * `module` - Module name to match (None accepts all)
    /// * `function` - Function name to match (None accepts all)
    pub fn new(
        min_level: Option<Level>,
        module: Option<String>,
        function: Option<String>,
    ) -> Self {
        Self {
            min_level,
            module,
            function,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    /// Checks if a log record matches all filter criteria.
    ///
    /// # Arguments
    ///
    /// * `record` - The log record to check
    ///
    /// # Returns
    ///
    /// `true` if the record matches all criteria, `false` otherwise
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(min_level) = self.min_level
            && record.level < min_level
        {
            return false;
        }

        if let Some(ref module_filter) = self.module {
            match record.module() {
                Some(record_module) if record_module == module_filter => {}
                _ => return false,
            }
        }

        if let Some(ref function_filter) = self.function {
            match record.function() {
                Some(record_function) if record_function == function_filter => {}
                _ => return false,
            }
        }

        if self.rules.is_empty() {
            return true;
        }

        for rule in &self.rules {
            if !rule.matches(record) {
                return false;
            }
        }

        true
    }

    /// Evaluates a batch of records, returning only those that pass.
    pub fn filter_batch<'a>(&self, records: &'a [LogRecord]) -> Vec<&'a LogRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = Filter::new(None, None, None);
        let record = LogRecord::new(Level::Debug, "hi".to_string());
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_level_min_rule_rejects_below_threshold() {
        let filter = Filter::new(None, None, None).with_rule(FilterRule::LevelMin(Level::Warning));
        let debug = LogRecord::new(Level::Debug, "low".to_string());
        let error = LogRecord::new(Level::Error, "high".to_string());
        assert!(!filter.matches(&debug));
        assert!(filter.matches(&error));
    }

    #[test]
    fn test_module_prefix_rule() {
        let filter =
            Filter::new(None, None, None).with_rule(FilterRule::ModulePrefix("db::".to_string()));
        let record = LogRecord::new(Level::Info, "ok".to_string())
            .with_location(Some("db::pool".to_string()), None, None, None);
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_message_regex_rule() {
        let re = regex::Regex::new(r"^user-\d+$").unwrap();
        let filter = Filter::new(None, None, None).with_rule(FilterRule::MessageRegex(re));
        let matching = LogRecord::new(Level::Info, "user-42".to_string());
        let not_matching = LogRecord::new(Level::Info, "user-abc".to_string());
        assert!(filter.matches(&matching));
        assert!(!filter.matches(&not_matching));
    }

    #[test]
    fn test_custom_rule_predicate() {
        let filter = Filter::new(None, None, None)
            .with_rule(FilterRule::Custom(Box::new(|r| r.message.len() > 3)));
        let short = LogRecord::new(Level::Info, "hi".to_string());
        let long = LogRecord::new(Level::Info, "hello".to_string());
        assert!(!filter.matches(&short));
        assert!(filter.matches(&long));
    }
}
