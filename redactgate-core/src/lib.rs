// redactgate-core/src/lib.rs
//! # RedactGate Core Library
//!
//! `redactgate-core` sits between an untrusted chat turn and an external text-generation
//! capability. For every request it decides whether to pass text through unchanged,
//! replace sensitive fragments with placeholders, or refuse the request outright, and it
//! filters the generated reply with the same rules before it reaches the caller.
//!
//! ## Modules
//!
//! * `config`: `DetectionRule`s, `RuleConfig` and `PipelineSettings`, loaded from YAML or a JSON pattern file.
//! * `validators`: Checksum and format predicates that gate regex matches (`LUHN`, `IPV4`, `KR_RRN`).
//! * `sanitizers`: Compiles rules into an immutable, priority-ordered `RuleSnapshot`.
//! * `snapshot`: `RuleStore`, which swaps whole snapshots in place when rules change.
//! * `scanner`: The deterministic pattern stage.
//! * `judge`: Grey-zone classification through an external classifier.
//! * `redactor`: Applies classifier span judgements to text.
//! * `pipeline`: Orchestrates all stages around the generation call.
//! * `capability`: The `Classifier` and `Generator` traits.
//! * `providers`: Offline and HTTP implementations of those traits.
//! * `headless`: One-shot scanning without a pipeline.
//!
//! ## Usage Example
//!
//! ```rust
//! use redactgate_core::{headless_scan_string, RuleConfig};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = RuleConfig::load_default_rules()?;
//!     let outcome = headless_scan_string(&config, "Mail me at test@example.com")?;
//!     assert_eq!(outcome.text(), Some("Mail me at [EMAIL]"));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems are reported as [`RedactGateError`] (usually wrapped in
//! `anyhow::Error` by the loaders). A pipeline run returns [`PipelineError`] for bad input
//! and generation failures; a refusal is not an error but [`PipelineOutcome::Blocked`].
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod capability;
pub mod config;
pub mod errors;
pub mod finding;
pub mod headless;
pub mod judge;
pub mod pipeline;
pub mod providers;
pub mod redactor;
pub mod sanitizers;
pub mod scanner;
pub mod snapshot;
pub mod validators;

/// Re-exports the configuration types and functions for managing detection rules.
pub use config::{
    merge_rules,
    DetectionRule,
    PipelineSettings,
    RuleAction,
    RuleConfig,
    RuleConfigNotFoundError,
    MAX_PATTERN_LENGTH,
};

pub use errors::{InputError, PipelineError, RedactGateError};

pub use capability::{ChatMessage, Classifier, Generator, Role};

pub use finding::{redact_sensitive, FilterOutcome, Finding};

pub use judge::{GreyZoneJudge, Judgement, JudgementAction};

pub use pipeline::{BlockStage, Pipeline, PipelineOutcome, StageTimings};

pub use providers::{EchoGenerator, HttpChatClient, NoopClassifier};

pub use headless::headless_scan_string;

pub use sanitizers::compiler::{compile_rules, CompiledRule, RuleSnapshot};

pub use snapshot::RuleStore;

pub use validators::ValidatorRegistry;
