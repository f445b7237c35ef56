// redactgate-core/src/redactor.rs
//! Applies classifier judgements to the text they were computed against.
//!
//! All judgements are inspected before the text is touched: a single block verdict
//! rejects the whole text with no edits made. Mask verdicts are then spliced in from
//! the highest start offset to the lowest, so a replacement of any length never moves
//! a span that is still waiting to be applied.
//!
//! License: MIT OR APACHE 2.0

use log::warn;
use std::iter;

use crate::config::RuleAction;
use crate::finding::{log_finding_debug, Finding, FilterOutcome};
use crate::judge::{Judgement, JudgementAction};

/// Applies `judgements` to `text`.
///
/// Spans are character offsets. Spans reaching past the end of the text, and spans
/// overlapping one that was already applied, are skipped.
pub fn apply(text: &str, judgements: &[Judgement]) -> FilterOutcome {
    // Byte offset of every char boundary, including the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    if let Some(block) = judgements.iter().find(|j| j.action == JudgementAction::Block) {
        let value = char_slice(text, &boundaries, block).unwrap_or_default();
        let finding = Finding::new(&block.label, value, RuleAction::Block);
        log_finding_debug("model", &finding, None);
        return FilterOutcome::Blocked {
            name: block.label.clone(),
            message: format!("blocked by model judgement: {}", block.label),
            findings: vec![finding],
        };
    }

    let mut ordered: Vec<&Judgement> = judgements.iter().collect();
    ordered.sort_by(|a, b| b.start().cmp(&a.start()));

    let mut out = text.to_string();
    let mut findings = Vec::with_capacity(ordered.len());
    // Everything at or after this char offset has already been rewritten.
    let mut limit = char_len;

    for judgement in ordered {
        let Some(original) = char_slice(text, &boundaries, judgement) else {
            warn!(
                "Skipping judgement {:?} for '{}': span exceeds text length {}.",
                judgement.span, judgement.label, char_len
            );
            continue;
        };
        if judgement.end() > limit {
            warn!(
                "Skipping judgement {:?} for '{}': overlaps an applied span.",
                judgement.span, judgement.label
            );
            continue;
        }

        let replacement = judgement.replacement_text();
        let range = boundaries[judgement.start()]..boundaries[judgement.end()];
        out.replace_range(range, &replacement);

        let finding = Finding::new(&judgement.label, original, RuleAction::Mask);
        log_finding_debug("model", &finding, Some(&replacement));
        findings.push(finding);
        limit = judgement.start();
    }

    findings.reverse();
    FilterOutcome::Sanitized { text: out, findings }
}

/// The judged fragment, or `None` when the span runs past the end of the text.
fn char_slice<'a>(text: &'a str, boundaries: &[usize], judgement: &Judgement) -> Option<&'a str> {
    let (start, end) = judgement.span;
    (start <= end && end < boundaries.len()).then(|| &text[boundaries[start]..boundaries[end]])
}
