// redactgate-core/src/judge.rs
//! Grey-zone judge: asks an external classifier which spans of a text are sensitive.
//!
//! The classifier's reply is untrusted. The first JSON array of objects found in it is
//! taken, prose around it is ignored, and every element is checked individually.
//! Any failure (call error, timeout, garbage output) yields no judgements: this stage
//! can only add redactions, never block the pipeline by being unavailable.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::capability::Classifier;

/// Label used when the classifier omits one.
pub const DEFAULT_LABEL: &str = "ETC";

/// What the classifier wants done with a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgementAction {
    Mask,
    Block,
}

impl fmt::Display for JudgementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgementAction::Mask => f.write_str("mask"),
            JudgementAction::Block => f.write_str("block"),
        }
    }
}

/// A classifier verdict over `[start, end)`, in characters of the judged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgement {
    pub span: (usize, usize),
    pub label: String,
    pub action: JudgementAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl Judgement {
    pub fn mask(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            span: (start, end),
            label: label.into(),
            action: JudgementAction::Mask,
            replacement: None,
        }
    }

    pub fn block(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            action: JudgementAction::Block,
            ..Self::mask(start, end, label)
        }
    }

    pub fn start(&self) -> usize {
        self.span.0
    }

    pub fn end(&self) -> usize {
        self.span.1
    }

    /// Text spliced in for this span: the explicit replacement or `[LABEL]`.
    pub fn replacement_text(&self) -> String {
        self.replacement
            .clone()
            .unwrap_or_else(|| format!("[{}]", self.label))
    }
}

/// Why the classifier contributed nothing. Logged, never propagated out of the judge.
#[derive(Error, Debug)]
pub enum ClassificationUnavailable {
    #[error("classifier '{0}' timed out after {1:?}")]
    Timeout(String, Duration),

    #[error("classifier '{0}' failed: {1}")]
    Call(String, anyhow::Error),

    #[error("classifier reply contained no JSON array of objects")]
    NoJsonArray,
}

/// Builds the instruction sent to the classifier for `text`.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Find the spans of the following text that carry personal-information risk and \
         output ONLY a JSON array.\n\
         Format example:\n\
         [{{\"span\":[10,22],\"label\":\"NAME\",\"action\":\"mask\"}}]\n\
         span is a [start, end) character offset range into the text.\n\
         label is one of NAME, ADDRESS, ORG, EMAIL, PHONE, ETC.\n\
         Use action \"mask\" when in doubt and \"block\" only when leaking is clearly dangerous.\n\
         Output [] when nothing is sensitive.\n\
         Text:\n\
         {text}\n\
         Do not output anything except the JSON array."
    )
}

/// Delegates grey-zone decisions to a [`Classifier`] with a bounded wait.
#[derive(Clone)]
pub struct GreyZoneJudge {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
}

impl fmt::Debug for GreyZoneJudge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreyZoneJudge")
            .field("classifier", &self.classifier.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GreyZoneJudge {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self { classifier, timeout }
    }

    /// Judgements for `text`; empty on any failure.
    pub async fn judge(&self, text: &str) -> Vec<Judgement> {
        match self.try_judge(text).await {
            Ok(judgements) => judgements,
            Err(e) => {
                warn!("Grey-zone judge unavailable, continuing without it: {}", e);
                Vec::new()
            }
        }
    }

    /// Like [`GreyZoneJudge::judge`] but reports why nothing came back.
    pub async fn try_judge(&self, text: &str) -> Result<Vec<Judgement>, ClassificationUnavailable> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let name = self.classifier.name().to_string();
        let prompt = build_prompt(text);
        let raw = match tokio::time::timeout(self.timeout, self.classifier.classify(&prompt)).await {
            Err(_) => return Err(ClassificationUnavailable::Timeout(name, self.timeout)),
            Ok(Err(e)) => return Err(ClassificationUnavailable::Call(name, e)),
            Ok(Ok(raw)) => raw,
        };

        let judgements = parse_judgements(&raw).ok_or(ClassificationUnavailable::NoJsonArray)?;
        debug!("Classifier '{}' returned {} usable judgement(s).", name, judgements.len());
        Ok(judgements)
    }
}

/// Parses a raw classifier reply. `None` when no JSON array could be found.
///
/// Elements that are not objects, lack a two-integer ascending `span`, or are otherwise
/// malformed are dropped individually.
pub fn parse_judgements(raw: &str) -> Option<Vec<Judgement>> {
    let items = extract_object_array(raw.trim())?;
    Some(items.iter().filter_map(judgement_from_value).collect())
}

/// First JSON array in `raw` that is empty or starts with an object.
fn extract_object_array(raw: &str) -> Option<Vec<Value>> {
    for (i, _) in raw.match_indices('[') {
        let candidate = &raw[i..];
        let first = candidate[1..].trim_start().chars().next();
        if !matches!(first, Some('{') | Some(']')) {
            continue;
        }

        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            return Some(items);
        }
    }
    None
}

fn judgement_from_value(value: &Value) -> Option<Judgement> {
    let obj = value.as_object()?;

    let span = obj.get("span")?.as_array()?;
    let [start, end] = span.as_slice() else {
        return None;
    };
    let start = usize::try_from(start.as_u64()?).ok()?;
    let end = usize::try_from(end.as_u64()?).ok()?;
    if start >= end {
        return None;
    }

    let label = obj
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LABEL)
        .to_string();

    let action = match obj.get("action").and_then(Value::as_str) {
        Some(a) if a.trim().eq_ignore_ascii_case("block") => JudgementAction::Block,
        _ => JudgementAction::Mask,
    };

    let replacement = obj.get("replacement").and_then(Value::as_str).map(str::to_string);

    Some(Judgement {
        span: (start, end),
        label,
        action,
        replacement,
    })
}
