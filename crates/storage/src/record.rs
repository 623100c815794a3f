// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line formats for ledger records and session markers

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use trail_core::AuditEvent;

/// Prefix of the line opening a session
pub const BEGIN_MARKER: &str = "*** BEGIN audit session";
/// Prefix of the line closing a session
pub const END_MARKER: &str = "*** END audit session";

const FIELD_SEPARATOR: &str = " | ";

/// Render an instant the way every ledger line shows time
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
}

/// Render an epoch-millis event timestamp
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(format_instant)
        .unwrap_or_else(|| format!("{}ms", millis))
}

/// Format one data record (without trailing newline)
///
/// Fields: sequence, timestamp, kind, user, origin thread, handling thread,
/// and for chat messages the payload text.
pub fn format_record(sequence: u64, event: &AuditEvent) -> String {
    let mut line = format!(
        "{:>7}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
        sequence,
        format_timestamp(event.timestamp),
        event.kind,
        escape_field(&event.user),
        escape_field(&event.origin_thread),
        escape_field(&event.handling_thread),
        sep = FIELD_SEPARATOR,
    );

    if event.kind.carries_payload() {
        line.push_str(FIELD_SEPARATOR);
        line.push_str(&escape_field(event.payload.as_deref().unwrap_or_default()));
    }

    line
}

pub fn format_begin(at: DateTime<Utc>) -> String {
    format!("{}: {} ***", BEGIN_MARKER, format_instant(at))
}

pub fn format_end(at: DateTime<Utc>, records: u64, aborted: bool) -> String {
    let label = if aborted { " (aborted)" } else { "" };
    format!(
        "{}{}: {}, records: {} ***",
        END_MARKER,
        label,
        format_instant(at),
        records
    )
}

/// Escape a field so the record stays one line with unambiguous separators
///
/// Every backslash is doubled, so the rendering is reversible: `\\`, `\n`,
/// `\r` and `\|` each stand for exactly one original character.
pub fn escape_field(text: &str) -> Cow<'_, str> {
    if !text.contains(['\\', '\n', '\r', '|']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '|' => escaped.push_str("\\|"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
