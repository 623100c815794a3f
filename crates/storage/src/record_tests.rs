// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use trail_core::EventKind;
use yare::parameterized;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn login_record_has_six_fields() {
    let event = AuditEvent::login("alice", 0).with_threads("client-1", "worker-2");
    let line = format_record(1, &event);

    assert_eq!(
        line,
        "      1 | 1970-01-01 00:00:00.000 UTC | LOGIN | alice | client-1 | worker-2"
    );
}

#[test]
fn chat_record_appends_payload() {
    let event = AuditEvent::chat_message("alice", "hi there", 0).with_threads("c", "w");
    let line = format_record(12, &event);

    assert!(line.ends_with(" | CHAT_MESSAGE | alice | c | w | hi there"));
    assert!(line.starts_with("     12 | "));
}

#[parameterized(
    login = { EventKind::Login },
    logout = { EventKind::Logout },
)]
fn payload_never_written_for_presence_events(kind: EventKind) {
    let mut event = AuditEvent::new(kind, "bob", 0);
    event.payload = Some("leaked".to_string());

    let line = format_record(3, &event);

    assert!(!line.contains("leaked"));
    assert_eq!(line.split(" | ").count(), 6);
}

#[test]
fn chat_record_without_payload_keeps_empty_field() {
    let mut event = AuditEvent::chat_message("bob", "", 0);
    event.payload = None;

    let line = format_record(1, &event);

    assert!(line.ends_with(" | "));
    assert_eq!(line.split(" | ").count(), 7);
}

#[test]
fn payload_line_breaks_are_escaped() {
    let event = AuditEvent::chat_message("alice", "one\ntwo\r\n", 0);
    let line = format_record(1, &event);

    assert!(!line.contains('\n'));
    assert!(line.ends_with("one\\ntwo\\r\\n"));
}

#[test]
fn escaped_newline_and_literal_backslash_n_stay_distinct() {
    let newline = format_record(1, &AuditEvent::chat_message("alice", "a\nb", 0));
    let backslash_n = format_record(1, &AuditEvent::chat_message("alice", "a\\nb", 0));

    assert_ne!(newline, backslash_n);
    assert!(newline.ends_with(" | a\\nb"));
    assert!(backslash_n.ends_with(" | a\\\\nb"));
}

#[test]
fn separator_inside_fields_does_not_add_fields() {
    let event = AuditEvent::chat_message("a | b", "x | y | z", 0).with_threads("c|1", "w");

    let line = format_record(1, &event);

    assert_eq!(line.split(" | ").count(), 7);
    assert!(line.contains(" | a \\| b | c\\|1 | w | "));
    assert!(line.ends_with(" | x \\| y \\| z"));
}

#[parameterized(
    plain = { "hello", "hello" },
    backslash = { "C:\\temp", "C:\\\\temp" },
    carriage_return = { "a\rb", "a\\rb" },
    pipe = { "a|b", "a\\|b" },
)]
fn escape_field_cases(input: &str, expected: &str) {
    assert_eq!(escape_field(input), expected);
}

#[test]
fn timestamp_renders_millis() {
    assert_eq!(format_timestamp(1_500), "1970-01-01 00:00:01.500 UTC");
}

#[test]
fn out_of_range_timestamp_falls_back_to_raw_millis() {
    assert_eq!(format_timestamp(u64::MAX), format!("{}ms", u64::MAX));
}

#[test]
fn begin_marker_format() {
    assert_eq!(
        format_begin(noon()),
        "*** BEGIN audit session: 2026-03-01 12:00:00.000 UTC ***"
    );
}

#[test]
fn end_marker_reports_count() {
    assert_eq!(
        format_end(noon(), 3, false),
        "*** END audit session: 2026-03-01 12:00:00.000 UTC, records: 3 ***"
    );
}

#[test]
fn aborted_end_marker_is_labelled() {
    let line = format_end(noon(), 2, true);
    assert!(line.starts_with(END_MARKER));
    assert!(line.contains("(aborted)"));
    assert!(line.contains("records: 2"));
}
