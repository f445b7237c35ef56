// redactgate/src/commands/chat.rs
//! `redactgate chat`: one conversation through the full pipeline, JSON out.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use redactgate_core::{
    ChatMessage, Classifier, EchoGenerator, Generator, HttpChatClient, NoopClassifier, Pipeline,
    PipelineError, PipelineOutcome, RuleConfig, RuleStore,
};

use crate::cli::{ChatCommand, ProviderChoice};
use crate::commands::{blocked_msg, error_msg, info_msg, EXIT_BLOCKED, EXIT_ERROR};
use crate::ui::theme::ThemeMap;

/// Accepted conversation shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConversationInput {
    Wrapped { messages: Vec<ChatMessage> },
    Bare(Vec<ChatMessage>),
}

/// Parses `[{"role", "content"}, ...]` or `{"messages": [...]}`.
pub fn parse_conversation(input: &str) -> Result<Vec<ChatMessage>> {
    let parsed: ConversationInput =
        serde_json::from_str(input).context("Conversation must be a JSON array of messages or {\"messages\": [...]}")?;
    Ok(match parsed {
        ConversationInput::Wrapped { messages } | ConversationInput::Bare(messages) => messages,
    })
}

/// Builds the pipeline for the selected provider.
pub fn build_pipeline(cmd: &ChatCommand) -> Result<Pipeline> {
    match cmd.provider {
        ProviderChoice::Echo => {
            let generator: Arc<dyn Generator> = Arc::new(EchoGenerator);
            let classifier: Arc<dyn Classifier> = Arc::new(NoopClassifier);
            Ok(Pipeline::new(generator).with_classifier(classifier))
        }
        ProviderChoice::Http => {
            let mut client = HttpChatClient::new(&cmd.base_url, &cmd.model)?;
            match &cmd.api_key {
                Some(key) => client = client.with_api_key(key),
                None => warn!("No API key configured; sending unauthenticated requests to {}.", cmd.base_url),
            }
            let client = Arc::new(client);
            let generator: Arc<dyn Generator> = client.clone();
            let classifier: Arc<dyn Classifier> = client;
            Ok(Pipeline::new(generator).with_classifier(classifier))
        }
    }
}

/// Applies command-line overrides to the configured pipeline settings.
fn apply_overrides(config: &mut RuleConfig, cmd: &ChatCommand) {
    if cmd.no_grey_zone {
        config.pipeline.enable_grey_zone = false;
    }
    if let Some(ms) = cmd.classification_timeout_ms {
        config.pipeline.classification_timeout_ms = ms;
    }
    if let Some(ms) = cmd.generation_timeout_ms {
        config.pipeline.generation_timeout_ms = ms;
    }
}

/// JSON document for a run; the notice is added to successful outcomes.
pub fn outcome_json(outcome: &PipelineOutcome) -> Result<Value> {
    let mut value = serde_json::to_value(outcome)?;
    if let Some(notice) = outcome.notice() {
        value["notice"] = Value::String(notice);
    }
    Ok(value)
}

fn error_json(err: &PipelineError) -> Value {
    let kind = if err.is_generation_failure() { "generation" } else { "input" };
    json!({ "status": "error", "kind": kind, "error": err.to_string() })
}

pub async fn run_chat(
    mut config: RuleConfig,
    input: &str,
    cmd: &ChatCommand,
    quiet: bool,
    theme: &ThemeMap,
) -> Result<ExitCode> {
    let conversation = parse_conversation(input)?;
    apply_overrides(&mut config, cmd);
    let store = RuleStore::new(&config)?;
    let pipeline = build_pipeline(cmd)?;
    info!("Running {} message(s) through {:?}.", conversation.len(), pipeline);

    let snapshot = store.snapshot();
    let (document, code) = match pipeline.run(&conversation, &snapshot).await {
        Ok(outcome) => {
            let code = match &outcome {
                PipelineOutcome::Blocked { stage, reason, .. } => {
                    if !quiet {
                        blocked_msg(format!("Stage {}: {}", stage, reason), theme);
                    }
                    ExitCode::from(EXIT_BLOCKED)
                }
                PipelineOutcome::Sanitized { .. } => {
                    match outcome.notice() {
                        Some(notice) if !quiet => info_msg(notice, theme),
                        _ => {}
                    }
                    ExitCode::SUCCESS
                }
            };
            (outcome_json(&outcome)?, code)
        }
        Err(e) => {
            if !quiet {
                error_msg(e.to_string(), theme);
            }
            (error_json(&e), ExitCode::from(EXIT_ERROR))
        }
    };

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.pretty {
        serde_json::to_writer_pretty(&mut writer, &document)?;
    } else {
        serde_json::to_writer(&mut writer, &document)?;
    }
    writeln!(writer)?;
    Ok(code)
}
