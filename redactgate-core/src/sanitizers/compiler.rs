//! compiler.rs - Turns a `RuleConfig` into an immutable, ready-to-scan `RuleSnapshot`.
//!
//! Compilation resolves everything that can fail up front: regex syntax, pattern size,
//! validator ids, and replacement templates. The resulting snapshot is sorted by action
//! priority (block, mask, generalize) with the configured order kept inside each action,
//! so scanning never has to sort or look anything up.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::config::{PipelineSettings, RuleAction, RuleConfig, DEFAULT_REDACTION_MARKER, MAX_PATTERN_LENGTH};
use crate::errors::RedactGateError;
use crate::validators::{ValidatorFn, ValidatorRegistry};

lazy_static! {
    /// `$$`, `${name}` or `$name` inside a regex-crate replacement template.
    static ref TEMPLATE_REFERENCE: Regex =
        Regex::new(r"\$\$|\$\{([A-Za-z0-9_]+)\}|\$([A-Za-z0-9_]+)").expect("static template regex");
}

/// A single compiled detection rule.
pub struct CompiledRule {
    pub name: String,
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    pub action: RuleAction,
    /// Replacement template with `\N` already rewritten to `${N}`.
    pub replacement: String,
    /// True when `replacement` refers to capture groups.
    pub has_backrefs: bool,
    pub validator_id: Option<String>,
    pub validator: Option<ValidatorFn>,
    /// Reason reported when this rule blocks.
    pub message: String,
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("name", &self.name)
            .field("pattern", &self.regex.as_str())
            .field("action", &self.action)
            .field("replacement", &self.replacement)
            .field("has_backrefs", &self.has_backrefs)
            .field("validator_id", &self.validator_id)
            .finish()
    }
}

impl CompiledRule {
    /// Runs the configured validator; rules without one accept every match.
    pub fn validate(&self, candidate: &str) -> bool {
        match &self.validator {
            Some(validator) => validator(candidate),
            None => true,
        }
    }
}

/// An immutable, priority-ordered rule set. One snapshot serves a whole request.
#[derive(Debug, Default)]
pub struct RuleSnapshot {
    pub rules: Vec<CompiledRule>,
    pub settings: PipelineSettings,
    /// Monotonic generation assigned by the rule store; 0 for ad-hoc snapshots.
    pub generation: u64,
}

impl RuleSnapshot {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

/// Rewrites `\1`-style backreferences into the `${1}` form the regex crate expands.
pub fn normalize_template(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            out.push_str("${");
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                out.push(d);
                chars.next();
            }
            out.push('}');
        } else {
            out.push(c);
        }
    }
    out
}

/// Capture-group names or numbers referenced by a normalized template, in order.
pub fn template_references(template: &str) -> Vec<String> {
    TEMPLATE_REFERENCE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// References in a normalized `template` that name no capture group of `regex`.
pub fn unknown_group_references(regex: &Regex, template: &str) -> Vec<String> {
    let group_count = regex.captures_len() - 1;
    template_references(template)
        .into_iter()
        .filter(|reference| match reference.parse::<usize>() {
            Ok(n) => n > group_count,
            Err(_) => !regex.capture_names().flatten().any(|name| name == reference),
        })
        .collect()
}

/// Compiles the enabled rules of `config` into a `RuleSnapshot`.
pub fn compile_rules(config: &RuleConfig, registry: &ValidatorRegistry) -> Result<RuleSnapshot, RedactGateError> {
    debug!("Starting compilation of {} rules.", config.rules.len());

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in config.active_rules() {
        let Some(pattern) = rule.pattern.as_ref() else {
            warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
            continue;
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(RedactGateError::PatternLengthExceeded(
                rule.name.clone(),
                pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        let validator = match rule.validator.as_deref() {
            Some(id) => match registry.get(id) {
                Some(validator) => Some(validator),
                None => {
                    compilation_errors.push(RedactGateError::UnknownValidator(rule.name.clone(), id.to_string()));
                    continue;
                }
            },
            None => None,
        };

        let regex = match RegexBuilder::new(pattern)
            .multi_line(rule.multiline)
            .case_insensitive(rule.case_insensitive)
            .size_limit(10 * (1 << 20))
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                compilation_errors.push(RedactGateError::RuleCompilationError(rule.name.clone(), e));
                continue;
            }
        };

        let replacement = normalize_template(rule.replacement.as_deref().unwrap_or(DEFAULT_REDACTION_MARKER));
        let unknown = unknown_group_references(&regex, &replacement);
        if !unknown.is_empty() {
            compilation_errors.push(RedactGateError::InvalidRule(format!(
                "rule '{}' replacement references non-existent capture group(s): {}",
                rule.name,
                unknown.join(", ")
            )));
            continue;
        }
        let has_backrefs = !template_references(&replacement).is_empty();

        log::debug!(
            target: "redactgate_core::sanitizer",
            "Rule '{}' compiled successfully (action={}, backrefs={}).",
            &rule.name,
            rule.action,
            has_backrefs
        );

        compiled_rules.push(CompiledRule {
            name: rule.name.clone(),
            regex,
            action: rule.action,
            replacement,
            has_backrefs,
            validator_id: rule.validator.clone(),
            validator,
            message: rule.block_message().to_string(),
        });
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(RedactGateError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    // Stable: configured order survives within each priority band.
    compiled_rules.sort_by_key(|r| r.action.priority());

    debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
    Ok(RuleSnapshot {
        rules: compiled_rules,
        settings: config.pipeline.clone(),
        generation: 0,
    })
}
