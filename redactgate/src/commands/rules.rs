// redactgate/src/commands/rules.rs
//! `redactgate rules list` and `redactgate rules check`.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use redactgate_core::{compile_rules, RuleAction, RuleConfig, ValidatorRegistry};

use crate::commands::EXIT_ERROR;

/// Prints the effective rules in the order the scanner evaluates them.
pub fn list_rules<W: Write>(config: &RuleConfig, writer: &mut W) -> Result<()> {
    let snapshot = compile_rules(config, &ValidatorRegistry::with_builtins())?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Rule", "Action", "Validator", "Replacement"]);
    for (i, rule) in snapshot.rules.iter().enumerate() {
        let replacement = match rule.action {
            RuleAction::Block => "-".to_string(),
            _ => rule.replacement.clone(),
        };
        table.add_row(vec![
            (i + 1).to_string(),
            rule.name.clone(),
            rule.action.to_string(),
            rule.validator_id.clone().unwrap_or_else(|| "-".to_string()),
            replacement,
        ]);
    }
    writeln!(writer, "{table}")?;

    let disabled: Vec<&str> = config
        .rules
        .iter()
        .filter(|r| !r.is_enabled())
        .map(|r| r.name.as_str())
        .collect();
    if !disabled.is_empty() {
        writeln!(writer, "Disabled: {}", disabled.join(", "))?;
    }
    Ok(())
}

/// Loads and compiles `path` on its own. Problems are reported, not propagated.
pub fn check_rules<W: Write>(path: &Path, writer: &mut W) -> Result<ExitCode> {
    let compiled = RuleConfig::load_from_file(path)
        .and_then(|config| compile_rules(&config, &ValidatorRegistry::with_builtins()).map_err(anyhow::Error::from));

    match compiled {
        Ok(snapshot) => {
            let count = |action: RuleAction| snapshot.rules.iter().filter(|r| r.action == action).count();
            writeln!(
                writer,
                "OK: {} rules ({} block, {} mask, {} generalize)",
                snapshot.len(),
                count(RuleAction::Block),
                count(RuleAction::Mask),
                count(RuleAction::Generalize)
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            writeln!(writer, "INVALID: {:#}", e)?;
            Ok(ExitCode::from(EXIT_ERROR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test_log::test]
    fn list_shows_evaluation_order() {
        let config = RuleConfig::load_default_rules().unwrap();
        let mut out = Vec::new();
        list_rules(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let key = text.find("private_key").unwrap();
        let email = text.find("email").unwrap();
        let address = text.find("street_address").unwrap();
        assert!(key < email && email < address);
        assert!(text.contains("LUHN"));
    }

    #[test_log::test]
    fn check_reports_counts_and_errors() {
        let mut good = NamedTempFile::new().unwrap();
        good.write_all(b"rules:\n  - name: a\n    pattern: x\n    action: block\n  - name: b\n    pattern: y\n")
            .unwrap();
        let mut out = Vec::new();
        check_rules(good.path(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "OK: 2 rules (1 block, 1 mask, 0 generalize)\n");

        let mut bad = NamedTempFile::new().unwrap();
        bad.write_all(b"rules:\n  - name: a\n    pattern: x\n    validator: NOPE\n").unwrap();
        let mut out = Vec::new();
        check_rules(bad.path(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("INVALID:"));
        assert!(text.contains("NOPE"));
    }
}
