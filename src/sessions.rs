use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// One finished interval. Immutable once logged.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FocusSession {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Minutes.
    pub duration: u32,
    pub mode: Mode,
}

impl FocusSession {
    pub fn now(mode: Mode, duration: u32) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            duration,
            mode,
        }
    }

    pub fn local_time(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Append-only session history.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct SessionLog {
    sessions: Vec<FocusSession>,
}

impl SessionLog {
    pub fn from_sessions(sessions: Vec<FocusSession>) -> Self {
        Self { sessions }
    }

    /// Append a record. Zero-length intervals are not logged.
    pub fn append(&mut self, session: FocusSession) -> bool {
        if session.duration == 0 {
            return false;
        }
        self.sessions.push(session);
        true
    }

    pub fn sessions(&self) -> &[FocusSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &FocusSession> {
        self.sessions.iter().rev().take(n)
    }
}
