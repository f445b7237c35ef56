// redactgate-core/src/scanner.rs
//! Deterministic pattern stage.
//!
//! [`scan`] applies every rule of a [`RuleSnapshot`] to a text, in snapshot order
//! (block, then mask, then generalize). Each rule sees the output of the previous one,
//! so substitutions cascade. A block match ends the scan at once and the partially
//! rewritten text is dropped.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::RuleAction;
use crate::finding::{log_finding_debug, log_skipped_match_debug, Finding, FilterOutcome};
use crate::sanitizers::compiler::{CompiledRule, RuleSnapshot};

/// Placeholder labels that mark text as already redacted.
pub const GUARD_LABELS: [&str; 13] = [
    "PHONE",
    "CARD",
    "EMAIL",
    "IP",
    "JWT",
    "UUID",
    "MAC",
    "ADDRESS",
    "ACCOUNT",
    "TOKEN",
    "PASSPORT",
    "DRIVER_LICENSE",
    "CREDENTIAL",
];

static GUARD: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\[(?:{})\]", GUARD_LABELS.join("|"));
    Regex::new(&pattern).expect("guard labels form a valid regex")
});

/// True when `fragment` contains a placeholder such as `[EMAIL]`.
pub fn contains_guard_token(fragment: &str) -> bool {
    GUARD.is_match(fragment)
}

enum RuleStep {
    Unchanged,
    Rewritten(String),
    Blocked,
}

/// Runs the pattern stage over `text`.
pub fn scan(text: &str, snapshot: &RuleSnapshot) -> FilterOutcome {
    let mut current = text.to_string();
    let mut findings = Vec::new();

    for rule in &snapshot.rules {
        match apply_rule(rule, &current, &mut findings) {
            RuleStep::Unchanged => {}
            RuleStep::Rewritten(rewritten) => current = rewritten,
            RuleStep::Blocked => {
                return FilterOutcome::Blocked {
                    name: rule.name.clone(),
                    message: rule.message.clone(),
                    findings,
                };
            }
        }
    }

    FilterOutcome::Sanitized { text: current, findings }
}

fn apply_rule(rule: &CompiledRule, text: &str, findings: &mut Vec<Finding>) -> RuleStep {
    let mut out = String::new();
    let mut last_end = 0usize;
    let mut changed = false;

    for caps in rule.regex.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if m.is_empty() {
            continue;
        }
        let value = m.as_str();

        if contains_guard_token(value) {
            log_skipped_match_debug("pattern", &rule.name, value, "already redacted");
            continue;
        }
        if !rule.validate(value) {
            log_skipped_match_debug("pattern", &rule.name, value, "validator rejected");
            continue;
        }

        let finding = Finding::new(&rule.name, value, rule.action);
        if rule.action == RuleAction::Block {
            log_finding_debug("pattern", &finding, None);
            findings.push(finding);
            return RuleStep::Blocked;
        }

        out.push_str(&text[last_end..m.start()]);
        let replacement_start = out.len();
        if rule.has_backrefs {
            // Expansion only sees this match's groups.
            caps.expand(&rule.replacement, &mut out);
        } else {
            out.push_str(&rule.replacement);
        }
        log_finding_debug("pattern", &finding, Some(&out[replacement_start..]));
        findings.push(finding);

        last_end = m.end();
        changed = true;
    }

    if !changed {
        return RuleStep::Unchanged;
    }
    out.push_str(&text[last_end..]);
    RuleStep::Rewritten(out)
}
