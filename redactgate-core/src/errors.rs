//! errors.rs - Custom error types for the redactgate-core library.
//!
//! This module defines structured error enums for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Configuration problems surface as [`RedactGateError`]; failures of a single
//! pipeline request surface as [`PipelineError`].
//!
//! License: MIT OR APACHE 2.0

use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading, validating, or compiling rule configuration.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RedactGateError {
    #[error("Failed to compile detection rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Rule '{0}' references unknown validator '{1}'")]
    UnknownValidator(String, String),

    #[error("Invalid rule configuration: {0}")]
    InvalidRule(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// The conversation handed to the pipeline cannot be processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("conversation contains no user message")]
    NoUserMessage,

    #[error("the last user message is empty")]
    EmptyUserMessage,

    #[error("conversation must end with a user message, found {0} trailing turn(s) after it")]
    TrailingTurns(usize),
}

/// Failures of a single pipeline run.
///
/// A blocked request is *not* an error; it is reported through
/// [`crate::pipeline::PipelineOutcome::Blocked`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("generation failed: {0}")]
    GenerationFailed(#[source] anyhow::Error),

    #[error("generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("generation returned an empty response")]
    EmptyGeneration,
}

impl PipelineError {
    /// True for failures of the external generation call, as opposed to bad input.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::GenerationFailed(_)
                | PipelineError::GenerationTimeout(_)
                | PipelineError::EmptyGeneration
        )
    }
}
