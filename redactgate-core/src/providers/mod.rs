// redactgate-core/src/providers/mod.rs
//! Implementations of the [`crate::capability`] traits.
//!
//! License: MIT OR APACHE 2.0

pub mod echo;
pub mod http;

pub use echo::{EchoGenerator, NoopClassifier};
pub use http::HttpChatClient;
