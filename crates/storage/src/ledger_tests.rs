// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::record::{BEGIN_MARKER, END_MARKER};
use tempfile::TempDir;
use trail_core::FakeClock;

fn temp_ledger_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.log");
    (dir, path)
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn open_creates_file_and_parents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("audit.log");

    let ledger = AuditLedger::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(ledger.path(), path.as_path());
    assert_eq!(ledger.accepted(), 0);
}

#[test]
fn session_is_framed_by_markers() {
    let (_dir, path) = temp_ledger_path();

    let mut ledger = AuditLedger::open_with_clock(&path, FakeClock::new()).unwrap();
    ledger.begin().unwrap();
    ledger.append(&AuditEvent::login("alice", 0)).unwrap();
    ledger.append(&AuditEvent::chat_message("alice", "hi", 0)).unwrap();
    ledger.end().unwrap();
    ledger.close().unwrap();

    let lines = lines(&path);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with(BEGIN_MARKER));
    assert!(lines[1].contains("| LOGIN | alice"));
    assert!(lines[2].ends_with("| hi"));
    assert_eq!(
        lines[3],
        "*** END audit session: 1970-01-01 00:00:00.000 UTC, records: 2 ***"
    );
}

#[test]
fn append_numbers_records_from_one() {
    let (_dir, path) = temp_ledger_path();

    let mut ledger = AuditLedger::open(&path).unwrap();
    ledger.begin().unwrap();

    let seq1 = ledger.append(&AuditEvent::login("a", 0)).unwrap();
    let seq2 = ledger.append(&AuditEvent::logout("a", 0)).unwrap();

    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);
    assert_eq!(ledger.accepted(), 2);
}

#[test]
fn begin_resets_counter_and_appends() {
    let (_dir, path) = temp_ledger_path();

    {
        let mut ledger = AuditLedger::open(&path).unwrap();
        ledger.begin().unwrap();
        ledger.append(&AuditEvent::login("a", 0)).unwrap();
        ledger.end().unwrap();
        ledger.close().unwrap();
    }

    // Second session reopens the same file
    {
        let mut ledger = AuditLedger::open(&path).unwrap();
        ledger.begin().unwrap();
        assert_eq!(ledger.accepted(), 0);
        let seq = ledger.append(&AuditEvent::login("b", 0)).unwrap();
        assert_eq!(seq, 1);
        ledger.end().unwrap();
        ledger.close().unwrap();
    }

    let lines = lines(&path);
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines.iter().filter(|l| l.starts_with(BEGIN_MARKER)).count(),
        2
    );
    assert_eq!(lines.iter().filter(|l| l.starts_with(END_MARKER)).count(), 2);
    assert!(lines[1].contains("| a |"));
    assert!(lines[4].contains("| b |"));
}

#[test]
fn control_and_unknown_events_are_rejected_uncounted() {
    let (_dir, path) = temp_ledger_path();

    let mut ledger = AuditLedger::open(&path).unwrap();
    ledger.begin().unwrap();

    let end = ledger.append(&AuditEvent::session_end(0));
    let unknown = ledger.append(&AuditEvent::new(EventKind::Undefined, "x", 0));

    assert!(matches!(end, Err(LedgerError::NotARecord(EventKind::SessionEnd))));
    assert!(matches!(unknown, Err(LedgerError::NotARecord(EventKind::Undefined))));
    assert_eq!(ledger.accepted(), 0);
    assert_eq!(lines(&path).len(), 1);
}

#[test]
fn aborted_end_marker_reports_count() {
    let (_dir, path) = temp_ledger_path();

    let mut ledger = AuditLedger::open(&path).unwrap();
    ledger.begin().unwrap();
    ledger.append(&AuditEvent::login("a", 0)).unwrap();
    ledger.end_aborted().unwrap();

    let last = lines(&path).pop().unwrap();
    assert!(last.starts_with("*** END audit session (aborted)"));
    assert!(last.contains("records: 1"));
}

#[test]
fn existing_content_is_never_truncated() {
    let (_dir, path) = temp_ledger_path();
    std::fs::write(&path, "previous line\n").unwrap();

    let mut ledger = AuditLedger::open(&path).unwrap();
    ledger.begin().unwrap();
    ledger.close().unwrap();

    let lines = lines(&path);
    assert_eq!(lines[0], "previous line");
    assert!(lines[1].starts_with(BEGIN_MARKER));
}

#[cfg(target_os = "linux")]
#[test]
fn failed_write_still_counts_the_attempt() {
    // Writes to /dev/full always fail with ENOSPC
    let mut ledger = AuditLedger::open(Path::new("/dev/full")).unwrap();

    let first = ledger.append(&AuditEvent::login("a", 0));
    let second = ledger.append(&AuditEvent::logout("a", 0));

    assert!(matches!(first, Err(LedgerError::Io(_))));
    assert!(matches!(second, Err(LedgerError::Io(_))));
    assert_eq!(ledger.accepted(), 2);
}
