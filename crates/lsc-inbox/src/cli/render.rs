//! Text and JSON rendering for CLI output.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::dashboard::{Counts, Filter};
use crate::submission::Submission;

/// Longest preview shown in list rows, in characters.
const PREVIEW_CHARS: usize = 60;

/// Marker for unread rows.
const UNREAD_MARK: char = '*';

/// JSON document printed by `list --format json`.
#[derive(Debug, Serialize)]
pub struct ListDocument<'a> {
    /// Active filter.
    pub filter: Filter,
    /// Active search text.
    pub search: &'a str,
    /// Counts over the full list.
    pub counts: Counts,
    /// Submissions that passed the filter.
    pub submissions: Vec<&'a Submission>,
}

/// `2025-01-01 10:15 UTC`.
#[must_use]
pub fn format_timestamp(submission: &Submission) -> String {
    submission.timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Counts as a one-line summary.
#[must_use]
pub fn counts_line(counts: &Counts) -> String {
    format!(
        "{} total, {} support, {} staff applications, {} unread",
        counts.total, counts.support, counts.staff, counts.unread
    )
}

/// Truncate to `max` characters, appending `...` when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn read_mark(submission: &Submission) -> char {
    if submission.read {
        ' '
    } else {
        UNREAD_MARK
    }
}

/// Two lines per submission: header and preview.
#[must_use]
pub fn plain_list(submissions: &[&Submission]) -> String {
    let mut out = String::new();
    for submission in submissions {
        let _ = writeln!(
            out,
            "{} {}  {}  {}  {}",
            read_mark(submission),
            submission.id,
            submission.kind().label(),
            submission.payload.sender(),
            format_timestamp(submission),
        );
        let _ = writeln!(
            out,
            "    {}",
            truncate(&submission.payload.preview(), PREVIEW_CHARS)
        );
    }
    out
}

/// One aligned row per submission under a header.
#[must_use]
pub fn table_list(submissions: &[&Submission]) -> String {
    let rows: Vec<[String; 5]> = submissions
        .iter()
        .map(|s| {
            [
                format!("{}{}", read_mark(s), s.id),
                s.kind().label().to_string(),
                truncate(s.payload.sender(), 24),
                format_timestamp(s),
                truncate(&s.payload.preview(), PREVIEW_CHARS),
            ]
        })
        .collect();

    let header = [" ID", "TYPE", "FROM", "RECEIVED", "PREVIEW"].map(String::from);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Full detail view of one submission.
#[must_use]
pub fn detail(submission: &Submission) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", submission.kind().label(), submission.id);
    let _ = writeln!(out, "Received: {}", format_timestamp(submission));
    let _ = writeln!(
        out,
        "Status:   {}",
        if submission.read { "read" } else { "unread" }
    );

    let fields = submission.payload.detail_fields();
    let width = fields
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    if !fields.is_empty() {
        out.push('\n');
    }
    for (label, value) in fields {
        let mut lines = value.lines();
        let first = lines.next().unwrap_or_default();
        let _ = writeln!(out, "{label:<width$}  {first}");
        for line in lines {
            let _ = writeln!(out, "{:<width$}  {line}", "");
        }
    }
    out
}

/// Quarantined raw entries as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn quarantine(entries: &[Value]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
