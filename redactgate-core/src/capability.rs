// redactgate-core/src/capability.rs
//! Interfaces to the two external capabilities the pipeline depends on.
//!
//! Neither capability is trusted: malformed classifier output is dropped by the judge,
//! and generator output is run through the pattern scanner before it reaches a caller.
//! Implementations live in [`crate::providers`].
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Grey-zone classifier. Given an instruction prompt that embeds the text to judge,
/// returns the model's raw reply, which is expected (not guaranteed) to contain a JSON
/// array of `{span, label, action}` objects.
#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, prompt: &str) -> Result<String>;
}

/// Text generator.
///
/// `history` holds the turns before the last user message, all non-empty.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, history: &[ChatMessage], last_user_message: &str) -> Result<String>;
}
