//! Focus timer engine.
//!
//! The engine is a wall-clock state machine over subject ids. It holds no
//! thread and never reads the clock itself; every command takes `now` from
//! the caller.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Stopped
//! ```
//!
//! At most one subject is `Running`. The slot is an `Option`, so two running
//! timers are unrepresentable rather than merely checked for.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(id.clone(), now);
//! // later:
//! let stopped = engine.stop(&id, later); // Some(StoppedTimer { minutes, .. })
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subject::SubjectId;

const MS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
}

/// The single running timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub subject_id: SubjectId,
    pub started_at: DateTime<Utc>,
}

/// Result of a `Running -> Stopped` transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedTimer {
    pub subject_id: SubjectId,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    /// Whole minutes to credit.
    pub minutes: u64,
}

/// Core timer engine.
///
/// Not persisted: a restart forgets the running timer and its time is never
/// credited.
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    active: Option<ActiveTimer>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state_of(&self, id: &SubjectId) -> TimerState {
        if self.is_running(id) {
            TimerState::Running
        } else {
            TimerState::Stopped
        }
    }

    pub fn is_running(&self, id: &SubjectId) -> bool {
        self.active.as_ref().is_some_and(|t| &t.subject_id == id)
    }

    pub fn running(&self) -> Option<&ActiveTimer> {
        self.active.as_ref()
    }

    /// Minutes elapsed so far for `id`, without stopping anything.
    pub fn elapsed_minutes(&self, id: &SubjectId, now: DateTime<Utc>) -> Option<u64> {
        self.active
            .as_ref()
            .filter(|t| &t.subject_id == id)
            .map(|t| whole_minutes_between(t.started_at, now))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start timing `id`.
    ///
    /// A timer running for another subject is stopped first and returned so
    /// the caller can credit it. Starting the subject that is already running
    /// keeps the original start instant and returns `None`.
    pub fn start(&mut self, id: SubjectId, now: DateTime<Utc>) -> Option<StoppedTimer> {
        if self.is_running(&id) {
            return None;
        }
        let displaced = self.active.take().map(|t| finish(t, now));
        self.active = Some(ActiveTimer {
            subject_id: id,
            started_at: now,
        });
        displaced
    }

    /// Stop timing `id`. A no-op returning `None` when it is not running.
    pub fn stop(&mut self, id: &SubjectId, now: DateTime<Utc>) -> Option<StoppedTimer> {
        if !self.is_running(id) {
            return None;
        }
        self.active.take().map(|t| finish(t, now))
    }

    /// Stop whatever is running. Safe to call unconditionally.
    pub fn stop_all(&mut self, now: DateTime<Utc>) -> Vec<StoppedTimer> {
        self.active.take().map(|t| finish(t, now)).into_iter().collect()
    }

    /// Forget the running timer without producing a credit.
    pub fn discard_all(&mut self) -> Option<ActiveTimer> {
        self.active.take()
    }
}

fn finish(timer: ActiveTimer, now: DateTime<Utc>) -> StoppedTimer {
    StoppedTimer {
        minutes: whole_minutes_between(timer.started_at, now),
        subject_id: timer.subject_id,
        started_at: timer.started_at,
        stopped_at: now,
    }
}

/// `floor((end - start) / 60s)`; a clock that went backwards yields 0.
pub fn whole_minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let elapsed_ms = (end - start).num_milliseconds().max(0);
    (elapsed_ms / MS_PER_MINUTE) as u64
}
