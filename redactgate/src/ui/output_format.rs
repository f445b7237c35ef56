// redactgate/src/ui/output_format.rs
//! Message and summary formatting for stderr output.
//!
//! Every function takes the writer and a `supports_color` flag so callers decide
//! whether ANSI codes are emitted (they are not when the stream is redirected).

use owo_colors::OwoColorize;
use std::io::{self, Write};

use redactgate_core::Finding;

use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Applies the theme color for `entry` to `text` when color is supported.
pub fn paint(text: &str, entry: ThemeEntry, theme: &ThemeMap, supports_color: bool) -> String {
    if !supports_color {
        return text.to_string();
    }
    match theme.get(&entry).and_then(|s| s.fg.as_ref()) {
        Some(color) => text.color(color.to_ansi_color()).to_string(),
        None => text.to_string(),
    }
}

fn print_tagged<W: Write>(
    writer: &mut W,
    tag: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{} {}", paint(tag, entry, theme, supports_color), msg)
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[INFO]", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[WARN]", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[ERROR]", msg, ThemeEntry::Error, theme, supports_color)
}

pub fn print_blocked_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_tagged(writer, "[BLOCKED]", msg, ThemeEntry::Blocked, theme, supports_color)
}

/// Occurrences per rule name, in order of first appearance.
pub fn count_by_name(findings: &[Finding]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for finding in findings {
        match counts.iter_mut().find(|(name, _)| *name == finding.name) {
            Some((_, n)) => *n += 1,
            None => counts.push((finding.name.as_str(), 1)),
        }
    }
    counts
}

/// Prints one line per rule that fired. Matched values are never printed.
pub fn print_findings_summary<W: Write>(
    writer: &mut W,
    findings: &[Finding],
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if findings.is_empty() {
        return writeln!(
            writer,
            "{}",
            paint("No sensitive data detected.", ThemeEntry::Success, theme, supports_color)
        );
    }

    writeln!(writer, "{}", paint("Findings Summary:", ThemeEntry::Header, theme, supports_color))?;
    for (name, count) in count_by_name(findings) {
        writeln!(
            writer,
            "  {} ({} occurrence{})",
            paint(name, ThemeEntry::SummaryRuleName, theme, supports_color),
            paint(&count.to_string(), ThemeEntry::SummaryOccurrences, theme, supports_color),
            if count == 1 { "" } else { "s" }
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::default_theme_map;
    use redactgate_core::RuleAction;

    fn render(findings: &[Finding]) -> String {
        let mut out = Vec::new();
        print_findings_summary(&mut out, findings, &default_theme_map(), false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn summary_counts_without_values() {
        let findings = vec![
            Finding::new("email", "a@b.io", RuleAction::Mask),
            Finding::new("phone", "555-123-4567", RuleAction::Mask),
            Finding::new("email", "c@d.io", RuleAction::Mask),
        ];
        let text = render(&findings);
        assert!(text.contains("email (2 occurrences)"));
        assert!(text.contains("phone (1 occurrence)"));
        assert!(!text.contains("a@b.io"));
    }

    #[test]
    fn empty_summary() {
        assert_eq!(render(&[]), "No sensitive data detected.\n");
    }

    #[test]
    fn color_is_omitted_when_unsupported() {
        let mut out = Vec::new();
        print_error_message(&mut out, "boom", &default_theme_map(), false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[ERROR] boom\n");

        let colored = paint("x", ThemeEntry::Error, &default_theme_map(), true);
        assert!(colored.contains("\u{1b}["));
    }
}
