// redactgate-core/src/finding.rs
//! Records of detected sensitive values, the shared filter result type, and helpers
//! for logging matched values without leaking them.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::RuleAction;

lazy_static! {
    /// Whether matched values may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("REDACTGATE_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// What was detected and what was done about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule name or classifier label.
    pub name: String,
    #[serde(rename = "value")]
    pub matched_value: String,
    pub action: RuleAction,
}

impl Finding {
    pub fn new(name: impl Into<String>, matched_value: impl Into<String>, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            matched_value: matched_value.into(),
            action,
        }
    }

    /// Stable hash of the finding, safe to store where the raw value is not.
    pub fn fingerprint(&self) -> String {
        canonical_sample_hash(&self.name, &self.matched_value)
    }

    /// The same finding with its value replaced by [`Finding::fingerprint`].
    pub fn into_fingerprinted(self) -> Self {
        let matched_value = self.fingerprint();
        Self { matched_value, ..self }
    }
}

/// Result of running a filter (pattern scan or span redaction) over one text.
///
/// A `Blocked` result never carries text: partial edits made before the block was
/// detected are discarded with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Sanitized { text: String, findings: Vec<Finding> },
    Blocked {
        /// Rule name or classifier label responsible for the block.
        name: String,
        message: String,
        /// Findings recorded up to and including the blocking one.
        findings: Vec<Finding>,
    },
}

impl FilterOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, FilterOutcome::Blocked { .. })
    }

    pub fn findings(&self) -> &[Finding] {
        match self {
            FilterOutcome::Sanitized { findings, .. } | FilterOutcome::Blocked { findings, .. } => findings,
        }
    }

    /// The sanitized text, if the filter did not block.
    pub fn text(&self) -> Option<&str> {
        match self {
            FilterOutcome::Sanitized { text, .. } => Some(text),
            FilterOutcome::Blocked { .. } => None,
        }
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.chars().count())
    }
}

pub(crate) fn loggable(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub(crate) fn log_finding_debug(stage: &str, finding: &Finding, replacement: Option<&str>) {
    debug!(
        "[{}] Finding: rule='{}', action={}, original='{}', replacement='{}'",
        stage,
        finding.name,
        finding.action,
        loggable(&finding.matched_value),
        replacement.unwrap_or("-")
    );
}

pub(crate) fn log_skipped_match_debug(stage: &str, rule_name: &str, original: &str, why: &str) {
    debug!(
        "[{}] Skipped match for rule '{}' ({}): '{}'",
        stage,
        rule_name,
        why,
        loggable(original)
    );
}

pub fn canonical_sample_hash(rule_id: &str, snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(rule_id.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn fingerprint_ignores_case_and_spacing() {
        let a = Finding::new("email", "Test@Example.COM ", RuleAction::Mask);
        let b = Finding::new("email", "test@example.com", RuleAction::Mask);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprinted_finding_drops_the_value() {
        let f = Finding::new("live_secret", "sk_live_ABCDEFGHIJKLMNOPQRST", RuleAction::Block);
        let expected = f.fingerprint();
        let hidden = f.into_fingerprinted();
        assert_eq!(hidden.matched_value, expected);
        assert_eq!(hidden.name, "live_secret");
        assert!(!serde_json::to_string(&hidden).unwrap().contains("sk_live_"));
    }

    #[test]
    fn finding_serializes_value_field() {
        let f = Finding::new("card", "4111", RuleAction::Mask);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["value"], "4111");
        assert_eq!(json["action"], "mask");
    }
}
