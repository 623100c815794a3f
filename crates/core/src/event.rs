// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit events sent by the upstream producer
//!
//! An [`AuditEvent`] is the PDU of the service. Data events (login, logout,
//! chat message) become ledger records; `SESSION_END` is a control signal
//! that closes the producer's session and is never recorded.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of an audit event
///
/// Serialized as its upper-case label. Labels this version does not know
/// decode as [`EventKind::Undefined`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Login,
    Logout,
    ChatMessage,
    SessionEnd,
    Undefined,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Login => "LOGIN",
            EventKind::Logout => "LOGOUT",
            EventKind::ChatMessage => "CHAT_MESSAGE",
            EventKind::SessionEnd => "SESSION_END",
            EventKind::Undefined => "UNDEFINED",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "LOGIN" => EventKind::Login,
            "LOGOUT" => EventKind::Logout,
            "CHAT_MESSAGE" => EventKind::ChatMessage,
            "SESSION_END" => EventKind::SessionEnd,
            _ => EventKind::Undefined,
        }
    }

    /// Whether events of this kind are written to the ledger
    pub fn is_record(&self) -> bool {
        matches!(
            self,
            EventKind::Login | EventKind::Logout | EventKind::ChatMessage
        )
    }

    /// Whether records of this kind carry payload text
    pub fn carries_payload(&self) -> bool {
        matches!(self, EventKind::ChatMessage)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(EventKind::from_label(&label))
    }
}

/// One structured audit event or control signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Milliseconds since the Unix epoch, stamped by the producer
    pub timestamp: u64,
    pub kind: EventKind,
    /// User the event is about
    #[serde(default)]
    pub user: String,
    /// Producer-side actor that originated the event
    #[serde(default)]
    pub origin_thread: String,
    /// Producer-side handler that forwarded the event
    #[serde(default)]
    pub handling_thread: String,
    /// Chat text, only populated for `CHAT_MESSAGE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl AuditEvent {
    pub fn new(kind: EventKind, user: impl Into<String>, timestamp: u64) -> Self {
        Self {
            timestamp,
            kind,
            user: user.into(),
            origin_thread: String::new(),
            handling_thread: String::new(),
            payload: None,
        }
    }

    pub fn login(user: impl Into<String>, timestamp: u64) -> Self {
        Self::new(EventKind::Login, user, timestamp)
    }

    pub fn logout(user: impl Into<String>, timestamp: u64) -> Self {
        Self::new(EventKind::Logout, user, timestamp)
    }

    pub fn chat_message(user: impl Into<String>, text: impl Into<String>, timestamp: u64) -> Self {
        Self {
            payload: Some(text.into()),
            ..Self::new(EventKind::ChatMessage, user, timestamp)
        }
    }

    /// Control signal asking the service to drain and close the session
    pub fn session_end(timestamp: u64) -> Self {
        Self::new(EventKind::SessionEnd, "", timestamp)
    }

    pub fn with_threads(
        mut self,
        origin_thread: impl Into<String>,
        handling_thread: impl Into<String>,
    ) -> Self {
        self.origin_thread = origin_thread.into();
        self.handling_thread = handling_thread.into();
        self
    }

    pub fn is_session_end(&self) -> bool {
        self.kind == EventKind::SessionEnd
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
