// redactgate-core/src/providers/echo.rs
//! Offline providers for demos and tests. Neither makes a network call.

use anyhow::Result;
use async_trait::async_trait;

use crate::capability::{ChatMessage, Classifier, Generator};

/// Number of characters of the user message echoed back.
pub const ECHO_PREVIEW_CHARS: usize = 120;

/// Replies with a short summary of the (already sanitized) last user message.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, _history: &[ChatMessage], last_user_message: &str) -> Result<String> {
        let preview: String = last_user_message.chars().take(ECHO_PREVIEW_CHARS).collect();
        Ok(format!("Input summary: {}", preview))
    }
}

/// Classifier that never flags anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClassifier;

#[async_trait]
impl Classifier for NoopClassifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn classify(&self, _prompt: &str) -> Result<String> {
        Ok("[]".to_string())
    }
}
