// redactgate/src/main.rs
//! redactgate entry point.
//!
//! Loads `.env`, parses the command line, initializes logging and dispatches to the
//! selected subcommand. Exit codes: 0 success, 1 error, 2 blocked by policy.

use clap::Parser;
use std::process::ExitCode;

use redactgate::cli::Cli;
use redactgate::commands::{self, error_msg, EXIT_ERROR};
use redactgate::logger;
use redactgate::ui::theme::default_theme_map;

#[tokio::main]
async fn main() -> ExitCode {
    // Must run before parsing so `env = ...` defaults can see the file.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));
    let theme = default_theme_map();

    match commands::run(cli, &theme).await {
        Ok(code) => code,
        Err(e) => {
            error_msg(format!("{:#}", e), &theme);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
