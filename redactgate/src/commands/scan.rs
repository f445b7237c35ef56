// redactgate/src/commands/scan.rs
//! `redactgate scan`: the deterministic pattern stage on its own.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;

use redactgate_core::{headless_scan_string, FilterOutcome, Finding, RuleConfig};

use crate::commands::{blocked_msg, EXIT_BLOCKED};
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

pub struct ScanOptions {
    pub json: bool,
    pub show_summary: bool,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ScanReport<'a> {
    Sanitized {
        text: &'a str,
        findings: &'a [Finding],
    },
    Blocked {
        rule: &'a str,
        message: &'a str,
        findings: &'a [Finding],
    },
}

impl<'a> From<&'a FilterOutcome> for ScanReport<'a> {
    fn from(outcome: &'a FilterOutcome) -> Self {
        match outcome {
            FilterOutcome::Sanitized { text, findings } => ScanReport::Sanitized { text, findings },
            FilterOutcome::Blocked { name, message, findings } => ScanReport::Blocked {
                rule: name,
                message,
                findings,
            },
        }
    }
}

/// Scans `input` and writes the result to stdout. Blocked input exits with [`EXIT_BLOCKED`].
pub fn run_scan(config: &RuleConfig, input: &str, opts: &ScanOptions, theme: &ThemeMap) -> Result<ExitCode> {
    info!("Starting scan of {} bytes.", input.len());
    let outcome = headless_scan_string(config, input).context("Failed to compile rules")?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    write_outcome(&outcome, opts.json, &mut writer)?;

    if let FilterOutcome::Blocked { name, message, .. } = &outcome {
        if !opts.json {
            blocked_msg(format!("Rule '{}': {}", name, message), theme);
        }
        return Ok(ExitCode::from(EXIT_BLOCKED));
    }

    if opts.show_summary && !opts.json {
        let stderr_supports_color = io::stderr().is_terminal();
        output_format::print_findings_summary(&mut io::stderr(), outcome.findings(), theme, stderr_supports_color)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Plain mode prints only sanitized text; blocked input prints nothing to stdout.
pub fn write_outcome<W: Write>(outcome: &FilterOutcome, json: bool, writer: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *writer, &ScanReport::from(outcome))?;
        writeln!(writer)?;
    } else if let Some(text) = outcome.text() {
        write!(writer, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(writer)?;
        }
    }
    Ok(())
}
