// redactgate/src/commands/mod.rs
//! Subcommand implementations and the helpers they share.

pub mod chat;
pub mod rules;
pub mod scan;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use redactgate_core::{merge_rules, RuleConfig};

use crate::cli::{Cli, Commands, RulesCommand};
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Exit status for a request or text refused by policy.
pub const EXIT_BLOCKED: u8 = 2;
/// Exit status for configuration, I/O or generation failures.
pub const EXIT_ERROR: u8 = 1;

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing policy refusals to stderr.
pub fn blocked_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_blocked_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Reads the whole input file, or stdin when no file is given.
pub fn read_input(input_file: Option<&Path>) -> Result<String> {
    match input_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Built-in rules, merged with the user's rule file, minus disabled rules.
pub fn load_rule_config(user_config: Option<&Path>, disable: &[String]) -> Result<RuleConfig> {
    let defaults = RuleConfig::load_default_rules()?;
    let user = user_config
        .map(RuleConfig::load_from_file)
        .transpose()
        .context("Failed to load custom rule file")?;
    let mut config = merge_rules(defaults, user);
    if !disable.is_empty() {
        debug!("Disabling rules: {:?}", disable);
        config.disable_rules(disable);
    }
    Ok(config)
}

/// Dispatches the parsed command line.
pub async fn run(cli: Cli, theme: &ThemeMap) -> Result<ExitCode> {
    match cli.command {
        Commands::Scan(cmd) => {
            let config = load_rule_config(cli.config.as_deref(), &cli.disable)?;
            let input = read_input(cmd.input_file.as_deref())?;
            let opts = scan::ScanOptions {
                json: cmd.json,
                show_summary: !cmd.no_summary && !cli.quiet,
            };
            scan::run_scan(&config, &input, &opts, theme)
        }
        Commands::Chat(cmd) => {
            let config = load_rule_config(cli.config.as_deref(), &cli.disable)?;
            let input = read_input(cmd.input_file.as_deref())?;
            chat::run_chat(config, &input, &cmd, cli.quiet, theme).await
        }
        Commands::Rules(RulesCommand::List) => {
            let config = load_rule_config(cli.config.as_deref(), &cli.disable)?;
            rules::list_rules(&config, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rules(RulesCommand::Check { path }) => rules::check_rules(&path, &mut io::stdout().lock()),
    }
}
