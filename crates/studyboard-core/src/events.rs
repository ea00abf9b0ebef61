use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subject::SubjectId;

/// Every state change of the tracker produces an Event.
/// Callers drain them after each operation (the CLI prints them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SubjectCreated {
        id: SubjectId,
        name: String,
        at: DateTime<Utc>,
    },
    /// Name, progress or notes changed.
    SubjectUpdated {
        id: SubjectId,
        progress: u8,
        at: DateTime<Utc>,
    },
    SubjectDeleted {
        id: SubjectId,
        name: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        id: SubjectId,
        at: DateTime<Utc>,
    },
    TimerStopped {
        id: SubjectId,
        credited_minutes: u64,
        total_minutes: u64,
        at: DateTime<Utc>,
    },
    /// All subjects removed; a running timer was discarded uncredited.
    StoreCleared {
        removed: usize,
        discarded_timer: Option<SubjectId>,
        at: DateTime<Utc>,
    },
    /// Full replacement by an import.
    StoreReplaced {
        count: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SubjectCreated { at, .. }
            | Event::SubjectUpdated { at, .. }
            | Event::SubjectDeleted { at, .. }
            | Event::TimerStarted { at, .. }
            | Event::TimerStopped { at, .. }
            | Event::StoreCleared { at, .. }
            | Event::StoreReplaced { at, .. } => *at,
        }
    }
}
