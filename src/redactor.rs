//! Sensitive-field and pattern redaction
//!
//! Applied after the rate limiter and before the rules engine in the emit
//! pipeline. Message redaction returns a `Cow<str>` so a record with no
//! matching pattern costs no allocation; field redaction mutates a record's
//! context map in place.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::record::ContextValue;

/// How a pattern rule matches against message text.
#[derive(Debug, Clone)]
pub enum PatternType {
    Exact,
    Prefix,
    Suffix,
    Contains,
    Regex,
}

/// A single message-redaction rule.
pub struct PatternRule {
    pub name: String,
    pub pattern_type: PatternType,
    pattern: String,
    regex: Option<regex::Regex>,
    replacement: Option<String>,
    case_sensitive: bool,
}

impl PatternRule {
    pub fn new(
        name: impl Into<String>,
        pattern_type: PatternType,
        pattern: impl Into<String>,
        replacement: Option<String>,
        case_sensitive: bool,
    ) -> crate::error::Result<Self> {
        let pattern = pattern.into();
        let regex = if matches!(pattern_type, PatternType::Regex) {
            Some(regex::Regex::new(&pattern)?)
        } else {
            None
        };

        Ok(Self {
            name: name.into(),
            pattern_type,
            pattern,
            regex,
            replacement,
            case_sensitive,
        })
    }

    fn matches_and_replace(&self, text: &str, default_replacement: &str) -> Option<String> {
        let replacement = self.replacement.as_deref().unwrap_or(default_replacement);

        match self.pattern_type {
            PatternType::Regex => {
                let re = self.regex.as_ref()?;
                if re.is_match(text) {
                    Some(re.replace_all(text, replacement).into_owned())
                } else {
                    None
                }
            }
            PatternType::Exact => {
                let matched = if self.case_sensitive {
                    text == self.pattern
                } else {
                    text.eq_ignore_ascii_case(&self.pattern)
                };
                matched.then(|| replacement.to_string())
            }
            PatternType::Contains => redact_with_trailing_value(
                text,
                &self.pattern,
                replacement,
                MatchAnchor::Anywhere,
                self.case_sensitive,
            ),
            PatternType::Prefix => redact_with_trailing_value(
                text,
                &self.pattern,
                replacement,
                MatchAnchor::Start,
                self.case_sensitive,
            ),
            PatternType::Suffix => redact_with_trailing_value(
                text,
                &self.pattern,
                replacement,
                MatchAnchor::End,
                self.case_sensitive,
            ),
        }
    }
}

/// Where a `Contains`/`Prefix`/`Suffix` pattern must match within the text.
enum MatchAnchor {
    Start,
    End,
    Anywhere,
}

/// Replaces a matched pattern along with any secret value glued to it —
/// e.g. pattern `"password="` against `"user password=hunter2 ok"` drops
/// `hunter2` too, not just the `password=` text, so the value never survives
/// in the replaced output. The value run extends to the next whitespace.
fn redact_with_trailing_value(
    text: &str,
    pattern: &str,
    replacement: &str,
    anchor: MatchAnchor,
    case_sensitive: bool,
) -> Option<String> {
    let haystack: Cow<str> = if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    };
    let needle: Cow<str> = if case_sensitive {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(pattern.to_lowercase())
    };

    if needle.is_empty() {
        return None;
    }

    let mut result = String::with_capacity(text.len());
    let mut search_from = 0usize;
    let mut any_match = false;
    let anchored = matches!(anchor, MatchAnchor::Start | MatchAnchor::End);

    loop {
        let found = match anchor {
            MatchAnchor::Start => (search_from == 0 && haystack.starts_with(needle.as_ref()))
                .then_some(0),
            MatchAnchor::End => (search_from == 0 && haystack.ends_with(needle.as_ref()))
                .then(|| haystack.len() - needle.len()),
            MatchAnchor::Anywhere => haystack[search_from..]
                .find(needle.as_ref())
                .map(|offset| search_from + offset),
        };

        let Some(start) = found else {
            result.push_str(&text[search_from..]);
            break;
        };

        let pattern_end = start + needle.len();
        let value_end = text[pattern_end..]
            .find(char::is_whitespace)
            .map(|offset| pattern_end + offset)
            .unwrap_or(text.len());

        result.push_str(&text[search_from..start]);
        result.push_str(replacement);
        any_match = true;
        search_from = value_end;

        if anchored {
            result.push_str(&text[search_from..]);
            break;
        }
    }

    any_match.then_some(result)
}

/// How a context field's value is redacted.
#[derive(Debug, Clone)]
pub enum RedactionType {
    Full,
    PartialStart { keep: usize },
    PartialEnd { keep: usize },
    Hash,
    MaskMiddle { keep: usize },
}

fn apply_redaction(value: &str, redaction: &RedactionType, default_replacement: &str) -> String {
    match redaction {
        RedactionType::Full => default_replacement.to_string(),
        RedactionType::PartialStart { keep } => {
            let keep = (*keep).min(value.chars().count());
            let head: String = value.chars().take(keep).collect();
            format!("{}{}", head, default_replacement)
        }
        RedactionType::PartialEnd { keep } => {
            let len = value.chars().count();
            let keep = (*keep).min(len);
            let tail: String = value.chars().skip(len - keep).collect();
            format!("{}{}", default_replacement, tail)
        }
        RedactionType::Hash => {
            let mut hasher = Sha256::new();
            hasher.update(value.as_bytes());
            format!("sha256:{:x}", hasher.finalize())
        }
        RedactionType::MaskMiddle { keep } => {
            let chars: Vec<char> = value.chars().collect();
            let len = chars.len();
            if len <= *keep * 2 {
                return default_replacement.repeat(len.max(1));
            }
            let head: String = chars[..*keep].iter().collect();
            let tail: String = chars[len - *keep..].iter().collect();
            format!("{}{}{}", head, default_replacement, tail)
        }
    }
}

/// Redacts message text (pattern rules) and context fields (field rules).
pub struct Redactor {
    pattern_rules: Vec<PatternRule>,
    field_rules: HashMap<String, RedactionType>,
    default_replacement: String,
    patterns_matched: AtomicU64,
    fields_redacted: AtomicU64,
    bytes_redacted: AtomicU64,
}

impl Redactor {
    pub fn new(default_replacement: impl Into<String>) -> Self {
        Self {
            pattern_rules: Vec::new(),
            field_rules: HashMap::new(),
            default_replacement: default_replacement.into(),
            patterns_matched: AtomicU64::new(0),
            fields_redacted: AtomicU64::new(0),
            bytes_redacted: AtomicU64::new(0),
        }
    }

    pub fn add_pattern_rule(&mut self, rule: PatternRule) {
        self.pattern_rules.push(rule);
    }

    pub fn add_field_rule(&mut self, field: impl Into<String>, redaction: RedactionType) {
        self.field_rules.insert(field.into(), redaction);
    }

    /// Redacts a message, returning the original text unchanged (no
    /// allocation) when no pattern rule applies.
    pub fn redact_message<'a>(&self, message: &'a str) -> Cow<'a, str> {
        let mut current: Cow<'a, str> = Cow::Borrowed(message);

        for rule in &self.pattern_rules {
            if let Some(replaced) = rule.matches_and_replace(&current, &self.default_replacement) {
                self.patterns_matched.fetch_add(1, Ordering::Relaxed);
                self.bytes_redacted
                    .fetch_add(current.len() as u64, Ordering::Relaxed);
                current = Cow::Owned(replaced);
            }
        }

        current
    }

    /// Redacts matching fields of a context map in place.
    pub fn redact_context(&self, context: &mut IndexMap<String, ContextValue>) {
        for (key, redaction) in &self.field_rules {
            if let Some(value) = context.get_mut(key) {
                if let ContextValue::String(s) = value {
                    let redacted = apply_redaction(s, redaction, &self.default_replacement);
                    self.bytes_redacted
                        .fetch_add(s.len() as u64, Ordering::Relaxed);
                    *s = redacted;
                    self.fields_redacted.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    pub fn patterns_matched(&self) -> u64 {
        self.patterns_matched.load(Ordering::Relaxed)
    }

    pub fn fields_redacted(&self) -> u64 {
        self.fields_redacted.load(Ordering::Relaxed)
    }

    pub fn bytes_redacted(&self) -> u64 {
        self.bytes_redacted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_borrows_input() {
        let redactor = Redactor::new("***");
        let message = "hello world";
        let result = redactor.redact_message(message);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_contains_rule_replaces() {
        let mut redactor = Redactor::new("***");
        redactor.add_pattern_rule(
            PatternRule::new("password", PatternType::Contains, "secret", None, true).unwrap(),
        );
        let result = redactor.redact_message("login with secret token");
        assert_eq!(result, "login with *** token");
    }

    #[test]
    fn test_field_hash_redaction() {
        let mut redactor = Redactor::new("***");
        redactor.add_field_rule("email", RedactionType::Hash);
        let mut context = IndexMap::new();
        context.insert(
            "email".to_string(),
            ContextValue::String("user@example.com".to_string()),
        );
        redactor.redact_context(&mut context);
        let redacted = context.get("email").unwrap().as_str().unwrap();
        assert!(redacted.starts_with("sha256:"));
    }

    #[test]
    fn test_mask_middle() {
        let mut redactor = Redactor::new("*");
        redactor.add_field_rule("card", RedactionType::MaskMiddle { keep: 2 });
        let mut context = IndexMap::new();
        context.insert(
            "card".to_string(),
            ContextValue::String("1234567890".to_string()),
        );
        redactor.redact_context(&mut context);
        assert_eq!(context.get("card").unwrap().as_str().unwrap(), "12*90");
    }
}
