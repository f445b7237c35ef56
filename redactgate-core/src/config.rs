//! Configuration management for `redactgate-core`.
//!
//! This module defines the core data structures for detection rules and pipeline settings.
//! It handles deserialization of YAML rule files (and of the legacy JSON pattern-file
//! shape), and provides utilities for loading, merging, and validating these configs.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::sanitizers::compiler::{normalize_template, unknown_group_references};

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Marker used when a mask or generalize rule has no replacement configured.
pub const DEFAULT_REDACTION_MARKER: &str = "[REDACTED]";

/// What happens to text matched by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Refuse the whole text.
    Block,
    /// Replace the match with a placeholder.
    #[default]
    Mask,
    /// Replace the match with a coarser description of it.
    Generalize,
}

impl RuleAction {
    /// Evaluation priority; lower runs first.
    pub fn priority(self) -> u8 {
        match self {
            RuleAction::Block => 0,
            RuleAction::Mask => 1,
            RuleAction::Generalize => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleAction::Block => "block",
            RuleAction::Mask => "mask",
            RuleAction::Generalize => "generalize",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detection rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DetectionRule {
    /// Unique identifier for the rule (e.g., "email").
    pub name: String,
    /// Human-readable description of what the rule targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The regex pattern string.
    #[serde(alias = "regex")]
    pub pattern: Option<String>,
    pub action: RuleAction,
    /// Replacement template. `\1`, `$1`, `${1}` and `${name}` refer to capture groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Id of a validator from the registry (e.g. "LUHN").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Reason reported when a block rule fires. Defaults to the rule name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Explicit switch; `Some(false)` keeps the rule out of compiled snapshots.
    #[serde(alias = "is_active", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// If true, `^` and `$` match at line boundaries.
    pub multiline: bool,
    pub case_insensitive: bool,
}

impl DetectionRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// The reason reported when this rule blocks a text.
    pub fn block_message(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.name)
    }
}

/// Timeouts and switches for the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Upper bound for the classifier call; on expiry the judge contributes nothing.
    pub classification_timeout_ms: u64,
    /// Upper bound for the generation call; on expiry the request fails.
    pub generation_timeout_ms: u64,
    /// When false the classifier is never consulted.
    pub enable_grey_zone: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            classification_timeout_ms: 10_000,
            generation_timeout_ms: 60_000,
            enable_grey_zone: true,
        }
    }
}

impl PipelineSettings {
    pub fn classification_timeout(&self) -> Duration {
        Duration::from_millis(self.classification_timeout_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

/// The top-level configuration document.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleConfig {
    /// Ordered list of detection rules.
    pub rules: Vec<DetectionRule>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// The JSON pattern-file shape: `{"sensitive_patterns": [...]}`.
#[derive(Debug, Deserialize)]
struct PatternFile {
    sensitive_patterns: Vec<DetectionRule>,
}

/// Error type for missing rule configurations.
#[derive(Debug)]
pub struct RuleConfigNotFoundError {
    pub config_name: String,
}

impl fmt::Display for RuleConfigNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rule configuration '{}' not found.", self.config_name)
    }
}

impl std::error::Error for RuleConfigNotFoundError {}

impl RuleConfig {
    /// Loads rules from a file. `.json` files are read as pattern files, anything else as YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RuleConfigNotFoundError {
                config_name: path.display().to_string(),
            }
            .into());
        }
        info!("Loading rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_pattern_json(&text)
        } else {
            Self::from_yaml_str(&text)
        }
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());
        Ok(config)
    }

    /// Parses and validates a YAML rule document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RuleConfig = serde_yml::from_str(text).context("Invalid YAML rule document")?;
        validate_rules(&config.rules)?;
        Ok(config)
    }

    /// Parses and validates a JSON pattern file (`{"sensitive_patterns": [...]}`).
    pub fn from_pattern_json(text: &str) -> Result<Self> {
        let file: PatternFile = serde_json::from_str(text).context("Invalid JSON pattern file")?;
        validate_rules(&file.sensitive_patterns)?;
        Ok(RuleConfig {
            rules: file.sensitive_patterns,
            pipeline: PipelineSettings::default(),
        })
    }

    /// Loads the built-in rule set embedded in the binary.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config = Self::from_yaml_str(default_yaml).context("Failed to parse default rules")?;
        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Marks every rule named in `disable_rules` as disabled.
    pub fn disable_rules(&mut self, disable_rules: &[String]) {
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();
        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();

        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        for rule in &mut self.rules {
            if disable_set.contains(rule.name.as_str()) {
                rule.enabled = Some(false);
            }
        }
    }

    /// Rules that will make it into a compiled snapshot.
    pub fn active_rules(&self) -> impl Iterator<Item = &DetectionRule> {
        self.rules.iter().filter(|r| r.is_enabled())
    }
}

/// Merges user-defined rules and settings over the defaults.
///
/// A user rule replaces the default rule of the same name in place; new user rules are
/// appended in their declared order. User pipeline settings win when a user config is given.
pub fn merge_rules(default_config: RuleConfig, user_config: Option<RuleConfig>) -> RuleConfig {
    debug!(
        "merge_rules called. Initial default rules count: {}",
        default_config.rules.len()
    );

    let Some(user_cfg) = user_config else {
        return default_config;
    };

    let mut rules = default_config.rules;
    let mut index: HashMap<String, usize> = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| (rule.name.clone(), i))
        .collect();

    debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
    for user_rule in user_cfg.rules {
        match index.get(&user_rule.name) {
            Some(&i) => {
                debug!("Overriding default rule '{}'.", user_rule.name);
                rules[i] = user_rule;
            }
            None => {
                index.insert(user_rule.name.clone(), rules.len());
                rules.push(user_rule);
            }
        }
    }

    debug!("Final total rules after merge: {}", rules.len());
    RuleConfig {
        rules,
        pipeline: user_cfg.pipeline,
    }
}

/// Validates rule integrity (names, regex compilation, replacement group references).
fn validate_rules(rules: &[DetectionRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.as_str()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        let pattern = match &rule.pattern {
            Some(p) if !p.is_empty() => p,
            Some(_) => {
                errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
                continue;
            }
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }

        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
                continue;
            }
        };

        if let Some(replacement) = &rule.replacement {
            for reference in unknown_group_references(&regex, &normalize_template(replacement)) {
                errors.push(format!(
                    "Rule '{}': replacement references non-existent capture group '{}'.",
                    rule.name, reference
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Rule validation failed:\n{}", errors.join("\n")))
    }
}
