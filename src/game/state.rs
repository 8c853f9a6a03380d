use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp;
use uuid::Uuid;

use crate::models::Difficulty;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    Finished,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

/// Clock bookkeeping for a single test session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub session_id: Option<Uuid>,
    pub difficulty: Difficulty,
    pub duration_ms: u64,
    pub elapsed_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            difficulty: Difficulty::default(),
            duration_ms: 0,
            elapsed_ms: 0,
            started_at: None,
            finished_at: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn remaining_ms(&self) -> u64 {
        match self.status {
            SessionStatus::Idle | SessionStatus::Finished => 0,
            SessionStatus::Running => self.duration_ms.saturating_sub(self.elapsed_ms),
        }
    }

    pub fn begin_session(&mut self, difficulty: Difficulty, start_at: DateTime<Utc>) {
        *self = Self {
            status: SessionStatus::Running,
            session_id: Some(Uuid::new_v4()),
            difficulty,
            duration_ms: difficulty.config().game_duration.as_millis() as u64,
            elapsed_ms: 0,
            started_at: Some(start_at),
            finished_at: None,
        };
    }

    /// Syncs `elapsed_ms` with `now`; never moves backwards.
    pub fn sync_elapsed(&mut self, now: DateTime<Utc>) {
        if let (SessionStatus::Running, Some(started_at)) = (self.status, self.started_at) {
            let elapsed = (now - started_at).num_milliseconds().max(0) as u64;
            self.elapsed_ms = cmp::max(self.elapsed_ms, elapsed);
        }
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.sync_elapsed(at);
        self.elapsed_ms = self.elapsed_ms.min(self.duration_ms);
        self.status = SessionStatus::Finished;
        self.finished_at = Some(at);
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}
