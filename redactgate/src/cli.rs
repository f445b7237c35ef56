// redactgate/src/cli.rs
//! This file defines the command-line interface (CLI) for the redactgate application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "redactgate",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact sensitive data before and after a text-generation call",
    long_about = "redactgate filters chat turns for personal and secret data. Deterministic rules block, mask or generalize matches; an optional classifier judges the grey zone; the generated reply is filtered with the same rules before it is shown.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// Rule file merged over the built-in rules (YAML, or a JSON pattern file).
    #[arg(long = "config", value_name = "FILE", global = true, env = "REDACTGATE_CONFIG", help = "Path to a custom rule file (YAML or JSON pattern file).")]
    pub config: Option<PathBuf>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', global = true, help = "Disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `redactgate` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the pattern stage over a file or stdin and prints the sanitized text.
    #[command(about = "Runs the pattern stage over a file or stdin and prints the sanitized text.")]
    Scan(ScanCommand),

    /// Runs a conversation through the full pipeline.
    #[command(about = "Runs a conversation (JSON) through the full redaction pipeline.")]
    Chat(ChatCommand),

    /// Inspects rule sets.
    #[command(subcommand, about = "Lists or checks detection rules.")]
    Rules(RulesCommand),
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Print the outcome as JSON to stdout.
    #[arg(long = "json", help = "Print the outcome as JSON instead of plain text.")]
    pub json: bool,

    /// Suppress the findings summary.
    #[arg(long = "no-summary", help = "Suppress the findings summary on stderr.")]
    pub no_summary: bool,
}

/// Arguments for the `chat` command.
#[derive(Parser, Debug)]
pub struct ChatCommand {
    /// Conversation JSON: `[{"role", "content"}, ...]` or `{"messages": [...]}`.
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the conversation JSON from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Which generation/classification backend to use.
    #[arg(long, value_enum, default_value = "echo", env = "REDACTGATE_PROVIDER")]
    pub provider: ProviderChoice,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long = "base-url", value_name = "URL", env = "REDACTGATE_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Model id sent to the API.
    #[arg(long, value_name = "MODEL", env = "REDACTGATE_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Bearer token for the API.
    #[arg(long = "api-key", value_name = "KEY", env = "REDACTGATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip the grey-zone classifier.
    #[arg(long = "no-grey-zone", help = "Do not consult the classifier.")]
    pub no_grey_zone: bool,

    /// Overrides the configured classification timeout.
    #[arg(long = "classification-timeout-ms", value_name = "MS")]
    pub classification_timeout_ms: Option<u64>,

    /// Overrides the configured generation timeout.
    #[arg(long = "generation-timeout-ms", value_name = "MS")]
    pub generation_timeout_ms: Option<u64>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pub pretty: bool,
}

/// Subcommands for the `rules` command.
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    #[command(about = "Lists the effective rules in evaluation order.")]
    List,
    #[command(about = "Validates and compiles a rule file without running anything.")]
    Check {
        /// The rule file to check.
        #[arg(value_name = "FILE", help = "The rule file to check (YAML or JSON pattern file).")]
        path: PathBuf,
    },
}

/// Backend selection for `chat`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProviderChoice {
    /// Offline: echoes a summary of the sanitized message, never flags anything.
    Echo,
    /// An OpenAI-compatible `/chat/completions` endpoint.
    Http,
}
