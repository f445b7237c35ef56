// redactgate-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

use redactgate_core::config::{self, DetectionRule, RuleAction, RuleConfig};
use redactgate_core::{compile_rules, RuleConfigNotFoundError, RuleStore, ValidatorRegistry};

fn rule(name: &str, pattern: &str, replacement: &str) -> DetectionRule {
    DetectionRule {
        name: name.to_string(),
        pattern: Some(pattern.to_string()),
        replacement: Some(replacement.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_load_default_rules() {
    let config = RuleConfig::load_default_rules().unwrap();
    assert!(!config.rules.is_empty());
    let email_rule = config.rules.iter().find(|r| r.name == "email").unwrap();
    assert_eq!(email_rule.action, RuleAction::Mask);
    let card_rule = config.rules.iter().find(|r| r.name == "credit_card").unwrap();
    assert_eq!(card_rule.validator.as_deref(), Some("LUHN"));
    assert!(config.pipeline.enable_grey_zone);

    // Every default rule must compile against the built-in validators.
    let snapshot = compile_rules(&config, &ValidatorRegistry::with_builtins()).unwrap();
    assert_eq!(snapshot.len(), config.rules.len());
}

#[test]
fn test_load_from_yaml_file() -> Result<()> {
    let yaml_content = r#"
rules:
  - name: test_rule
    pattern: "test"
    replacement: "[TEST]"
    description: "A test rule"
  - name: secret_project
    pattern: "(?i)project orion"
    action: block
    message: "Project Orion is confidential."
pipeline:
  classification_timeout_ms: 2500
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let config = RuleConfig::load_from_file(file.path())?;
    assert_eq!(config.rules.len(), 2);
    assert_eq!(config.rules[0].name, "test_rule");
    assert_eq!(config.rules[0].action, RuleAction::Mask);
    assert_eq!(config.rules[1].action, RuleAction::Block);
    assert_eq!(config.rules[1].block_message(), "Project Orion is confidential.");
    assert_eq!(config.pipeline.classification_timeout_ms, 2500);
    // Unset settings keep their defaults.
    assert_eq!(config.pipeline.generation_timeout_ms, 60_000);
    Ok(())
}

#[test]
fn test_load_from_json_pattern_file() -> Result<()> {
    let json_content = r#"{
  "sensitive_patterns": [
    {"name": "card", "regex": "\\b\\d{16}\\b", "action": "mask", "replacement": "[CARD]", "validator": "LUHN"},
    {"name": "acct", "regex": "(account)\\s*(\\d{4})\\d+", "action": "generalize", "replacement": "\\1 \\2-[ACCOUNT]"},
    {"name": "old", "regex": "legacy", "is_active": false}
  ]
}"#;
    let mut file = Builder::new().suffix(".json").tempfile()?;
    file.write_all(json_content.as_bytes())?;
    let config = RuleConfig::load_from_file(file.path())?;

    assert_eq!(config.rules.len(), 3);
    assert_eq!(config.rules[0].pattern.as_deref(), Some(r"\b\d{16}\b"));
    assert!(!config.rules[2].is_enabled());
    assert_eq!(config.active_rules().count(), 2);
    Ok(())
}

#[test]
fn test_load_missing_file_reports_not_found() {
    let err = RuleConfig::load_from_file("/nonexistent/redactgate/rules.yaml").unwrap_err();
    assert!(err.downcast_ref::<RuleConfigNotFoundError>().is_some());
}

#[test]
fn test_invalid_rules_are_rejected_at_load() -> Result<()> {
    let cases = [
        "rules:\n  - name: a\n    pattern: '(open'\n",
        "rules:\n  - name: a\n    pattern: x\n  - name: a\n    pattern: y\n",
        "rules:\n  - name: a\n",
        "rules:\n  - name: a\n    pattern: '(x)'\n    replacement: '\\2'\n",
    ];
    for yaml in cases {
        let mut file = NamedTempFile::new()?;
        file.write_all(yaml.as_bytes())?;
        assert!(RuleConfig::load_from_file(file.path()).is_err(), "accepted: {}", yaml);
    }
    Ok(())
}

#[test]
fn test_pattern_length_limit() {
    let long = "a".repeat(config::MAX_PATTERN_LENGTH + 1);
    let yaml = format!("rules:\n  - name: long\n    pattern: '{}'\n", long);
    assert!(RuleConfig::from_yaml_str(&yaml).is_err());
}

#[test]
fn test_unknown_validator_fails_compilation() {
    let mut r = rule("card", r"\d{16}", "[CARD]");
    r.validator = Some("MOD97".to_string());
    let config = RuleConfig {
        rules: vec![r],
        ..Default::default()
    };
    let err = compile_rules(&config, &ValidatorRegistry::with_builtins()).unwrap_err();
    assert!(err.to_string().contains("MOD97"), "unexpected: {}", err);
}

#[test]
fn test_merge_rules_no_user_config() {
    let default_config = RuleConfig {
        rules: vec![rule("email", "old@example.com", "[OLD_EMAIL]")],
        ..Default::default()
    };
    let merged = config::merge_rules(default_config.clone(), None);
    assert_eq!(merged, default_config);
}

#[test]
fn test_merge_rules_override_keeps_position() {
    let default_config = RuleConfig {
        rules: vec![
            rule("email", "default@example.com", "[DEFAULT_EMAIL]"),
            rule("ipv4_address", "0.0.0.0", "[DEFAULT_IPV4]"),
        ],
        ..Default::default()
    };
    let mut user_email = rule("email", "user@custom.com", "[CUSTOM_EMAIL]");
    user_email.validator = Some("LUHN".to_string());
    let user_config = RuleConfig {
        rules: vec![user_email, rule("new_rule", "new_pattern", "[NEW]")],
        ..Default::default()
    };

    let merged = config::merge_rules(default_config, Some(user_config));
    let names: Vec<&str> = merged.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["email", "ipv4_address", "new_rule"]);
    assert_eq!(merged.rules[0].replacement.as_deref(), Some("[CUSTOM_EMAIL]"));
    assert_eq!(merged.rules[0].validator.as_deref(), Some("LUHN"));
    assert_eq!(merged.rules[1].replacement.as_deref(), Some("[DEFAULT_IPV4]"));
}

#[test]
fn test_disable_rules_excludes_from_snapshot() -> Result<()> {
    let mut config = RuleConfig::load_default_rules()?;
    let total = config.rules.len();
    config.disable_rules(&["email".to_string(), "no_such_rule".to_string()]);

    let snapshot = compile_rules(&config, &ValidatorRegistry::with_builtins())?;
    assert_eq!(snapshot.len(), total - 1);
    assert!(snapshot.rule("email").is_none());
    Ok(())
}

#[test]
fn test_rule_store_swaps_snapshots() -> Result<()> {
    let store = RuleStore::new(&RuleConfig {
        rules: vec![rule("first", "alpha", "[A]")],
        ..Default::default()
    })?;
    let before = store.snapshot();

    store.replace(&RuleConfig {
        rules: vec![rule("second", "beta", "[B]")],
        ..Default::default()
    })?;

    // A request holding the old snapshot keeps seeing it.
    assert!(before.rule("first").is_some());
    let after = store.snapshot();
    assert!(after.rule("second").is_some());
    assert!(after.generation > before.generation);
    Ok(())
}
