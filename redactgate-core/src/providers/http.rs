// redactgate-core/src/providers/http.rs
//! Client for an OpenAI-compatible `/chat/completions` endpoint.
//!
//! One client serves as both [`Classifier`] and [`Generator`]. Timeouts are not set
//! here; the pipeline bounds every call it makes.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::capability::{ChatMessage, Classifier, Generator, Role};

/// Sent ahead of every generation request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You may receive text where personally identifiable \
information is replaced with placeholders like [PHONE], [EMAIL], [CARD], [ADDRESS], [JWT], [UUID], \
etc. Do NOT attempt to reconstruct hidden values. Answer using the available context. If the exact \
value is required to proceed, say so and explain what non-sensitive info you need instead.";

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    system_instruction: String,
}

impl std::fmt::Debug for HttpChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the API key.
        f.debug_struct("HttpChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("redactgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Vec<WireMessage<'_>>, temperature: Option<f32>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, detail.trim());
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .context("Completion response was not valid JSON")?;
        debug!("Completion from model '{}' returned {} choice(s).", self.model, parsed.choices.len());

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow!("Completion response contained no choices"))
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl Classifier for HttpChatClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn classify(&self, prompt: &str) -> Result<String> {
        let messages = vec![WireMessage {
            role: "user",
            content: prompt,
        }];
        self.complete(messages, Some(0.0)).await
    }
}

#[async_trait]
impl Generator for HttpChatClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, history: &[ChatMessage], last_user_message: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_instruction.is_empty() {
            messages.push(WireMessage {
                role: "system",
                content: &self.system_instruction,
            });
        }
        messages.extend(history.iter().map(|m| WireMessage {
            role: wire_role(m.role),
            content: &m.content,
        }));
        messages.push(WireMessage {
            role: "user",
            content: last_user_message,
        });
        self.complete(messages, None).await
    }
}
