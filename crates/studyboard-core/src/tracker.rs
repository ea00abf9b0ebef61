//! Tracker: the one owner of subject and timer state.
//!
//! Every mutation goes through a `&mut Tracker` method, which makes each
//! transition atomic and keeps the single-running-timer rule intact even if
//! callers fire `start` twice in a row. Mutations never perform I/O; they
//! mark a [`PendingWrite`] that the caller flushes through a
//! [`Gateway`](crate::storage::Gateway) on its own schedule.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError, TrackerError};
use crate::events::Event;
use crate::storage::schema::{self, ExportPayload, StorePayload};
use crate::storage::Gateway;
use crate::subject::{parse_progress, Subject, SubjectEdit, SubjectId, SubjectStore, MAX_PROGRESS};
use crate::time::Clock;
use crate::timer::{ActiveTimer, StoppedTimer, TimerEngine, TimerState};
use crate::view::{self, Board, BoardQuery, Dashboard};

/// How soon the caller should persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PendingWrite {
    /// Only notes changed; the caller may debounce.
    Deferred,
    /// Anything else changed; write now.
    Immediate,
}

#[derive(Debug, Default)]
pub struct Tracker {
    store: SubjectStore,
    timer: TimerEngine,
    clock: Clock,
    pending: Option<PendingWrite>,
    events: Vec<Event>,
}

impl Tracker {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    /// Start from an already-parsed collection.
    pub fn with_subjects(subjects: Vec<Subject>, clock: Clock) -> Result<Self, TrackerError> {
        Ok(Self {
            store: SubjectStore::from_subjects(subjects)?,
            clock,
            ..Self::default()
        })
    }

    /// Start from the storage slot contents. Never fails: a missing or
    /// unreadable payload yields an empty tracker.
    pub fn from_stored(raw: Option<&str>, clock: Clock) -> Self {
        let subjects = schema::load_subjects(raw);
        match Self::with_subjects(subjects, clock) {
            Ok(tracker) => {
                debug!(count = tracker.store.len(), "store loaded");
                tracker
            }
            Err(err) => {
                warn!(reason = %err, "stored data unusable, starting empty");
                Self::new(clock)
            }
        }
    }

    /// Load through a gateway. Read failures are logged and treated as an
    /// empty slot.
    pub fn open(gateway: &dyn Gateway, clock: Clock) -> Self {
        match gateway.load() {
            Ok(raw) => Self::from_stored(raw.as_deref(), clock),
            Err(err) => {
                warn!(reason = %err, "stored data unusable, starting empty");
                Self::new(clock)
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn subjects(&self) -> &[Subject] {
        self.store.subjects()
    }

    /// Owned copy for collaborators that must not borrow the tracker.
    pub fn snapshot(&self) -> Vec<Subject> {
        self.store.subjects().to_vec()
    }

    pub fn find(&self, id: &SubjectId) -> Option<&Subject> {
        self.store.find(id)
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn is_running(&self, id: &SubjectId) -> bool {
        self.timer.is_running(id)
    }

    pub fn timer_state(&self, id: &SubjectId) -> TimerState {
        self.timer.state_of(id)
    }

    pub fn running(&self) -> Option<&ActiveTimer> {
        self.timer.running()
    }

    /// Stored minutes plus whatever the running timer has accrued so far.
    /// For display only; `total_time` is not touched.
    pub fn live_minutes(&self, id: &SubjectId) -> Result<u64, TrackerError> {
        let subject = self.require(id)?;
        let running = self.timer.elapsed_minutes(id, self.clock.now()).unwrap_or(0);
        Ok(subject.total_time.saturating_add(running))
    }

    pub fn board(&self, query: &BoardQuery) -> Board<'_> {
        view::compute_board(self.store.subjects(), query)
    }

    pub fn dashboard(&self) -> Dashboard {
        view::aggregate(self.store.subjects())
    }

    // ── Subject commands ─────────────────────────────────────────────

    pub fn create(&mut self, name: &str) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        let (id, name) = {
            let subject = self.store.create(name, now)?;
            (subject.id.clone(), subject.name.clone())
        };
        debug!(subject = %id, "subject created");
        self.events.push(Event::SubjectCreated {
            id: id.clone(),
            name,
            at: now,
        });
        self.mark(PendingWrite::Immediate);
        self.require(&id)
    }

    /// Remove a subject. A running timer for it is stopped and credited
    /// first, so the returned subject carries the final `total_time`.
    pub fn delete(&mut self, id: &SubjectId) -> Result<Subject, TrackerError> {
        self.require(id)?;
        self.stop(id)?;
        let removed = self.store.remove(id)?;
        debug!(subject = %id, "subject deleted");
        self.events.push(Event::SubjectDeleted {
            id: removed.id.clone(),
            name: removed.name.clone(),
            at: self.clock.now(),
        });
        self.mark(PendingWrite::Immediate);
        Ok(removed)
    }

    pub fn rename(&mut self, id: &SubjectId, name: &str) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        self.store.rename(id, name, now)?;
        self.updated(id, PendingWrite::Immediate)
    }

    /// Clamped into `0..=100`; never fails on range.
    pub fn set_progress(&mut self, id: &SubjectId, value: i64) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        self.store.set_progress(id, value, now)?;
        self.updated(id, PendingWrite::Immediate)
    }

    /// Like `set_progress`, for raw user text. Non-numeric text is
    /// `InvalidRange` and changes nothing.
    pub fn set_progress_input(&mut self, id: &SubjectId, raw: &str) -> Result<&Subject, TrackerError> {
        self.require(id)?;
        let value = parse_progress(raw)?;
        self.set_progress(id, value)
    }

    pub fn increment_progress(&mut self, id: &SubjectId, delta: i64) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        self.store.increment_progress(id, delta, now)?;
        self.updated(id, PendingWrite::Immediate)
    }

    pub fn complete(&mut self, id: &SubjectId) -> Result<&Subject, TrackerError> {
        self.set_progress(id, MAX_PROGRESS as i64)
    }

    /// Replace notes verbatim. Marks a deferred write; debouncing is the
    /// caller's business.
    pub fn set_notes(&mut self, id: &SubjectId, notes: &str) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        self.store.set_notes(id, notes, now)?;
        self.updated(id, PendingWrite::Deferred)
    }

    /// Save from the edit dialog: all fields or none.
    pub fn edit(&mut self, id: &SubjectId, edit: SubjectEdit) -> Result<&Subject, TrackerError> {
        let now = self.clock.now();
        self.store.edit(id, edit, now)?;
        self.updated(id, PendingWrite::Immediate)
    }

    /// Remove everything. A running timer is discarded without credit.
    pub fn clear(&mut self) -> usize {
        let discarded = self.timer.discard_all().map(|t| t.subject_id);
        let removed = self.store.clear();
        info!(removed, "store cleared");
        self.events.push(Event::StoreCleared {
            removed,
            discarded_timer: discarded,
            at: self.clock.now(),
        });
        self.mark(PendingWrite::Immediate);
        removed
    }

    /// Atomic full replacement. On error nothing changes, the running
    /// timer included.
    pub fn replace_all(&mut self, subjects: Vec<Subject>) -> Result<usize, TrackerError> {
        let replacement = SubjectStore::from_subjects(subjects)?;
        self.timer.discard_all();
        self.store = replacement;
        let count = self.store.len();
        info!(count, "store replaced");
        self.events.push(Event::StoreReplaced {
            count,
            at: self.clock.now(),
        });
        self.mark(PendingWrite::Immediate);
        Ok(count)
    }

    /// Parse an export file and replace the collection with it.
    ///
    /// Confirming the overwrite of a non-empty store is up to the caller.
    pub fn import_json(&mut self, raw: &str) -> Result<usize, TrackerError> {
        let subjects = schema::parse_subjects(raw)?;
        self.replace_all(subjects)
    }

    /// Export payload for the current collection.
    pub fn export(&self) -> Result<ExportPayload, TrackerError> {
        if self.store.is_empty() {
            return Err(TrackerError::NothingToExport);
        }
        Ok(ExportPayload::new(self.snapshot(), self.clock.now()))
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start the timer for `id`, stopping and crediting any other one.
    pub fn start(&mut self, id: &SubjectId) -> Result<(), TrackerError> {
        self.require(id)?;
        if self.timer.is_running(id) {
            return Ok(());
        }
        let now = self.clock.now();
        if let Some(displaced) = self.timer.start(id.clone(), now) {
            self.credit(displaced)?;
        }
        debug!(subject = %id, "timer started");
        self.events.push(Event::TimerStarted {
            id: id.clone(),
            at: now,
        });
        Ok(())
    }

    /// Re-attach a timer started against an earlier load of the store,
    /// keeping its original start instant. Any other running timer is
    /// stopped and credited first. A start instant in the future counts
    /// from now.
    pub fn resume(&mut self, id: &SubjectId, started_at: DateTime<Utc>) -> Result<(), TrackerError> {
        self.require(id)?;
        if self.timer.is_running(id) {
            return Ok(());
        }
        let now = self.clock.now();
        for displaced in self.timer.stop_all(now) {
            self.credit(displaced)?;
        }
        let started_at = started_at.min(now);
        self.timer.start(id.clone(), started_at);
        debug!(subject = %id, %started_at, "timer resumed");
        self.events.push(Event::TimerStarted {
            id: id.clone(),
            at: started_at,
        });
        Ok(())
    }

    /// Stop the timer for `id` and credit whole minutes. Stopping a subject
    /// that is not running is a no-op returning `None`.
    pub fn stop(&mut self, id: &SubjectId) -> Result<Option<StoppedTimer>, TrackerError> {
        self.require(id)?;
        let now = self.clock.now();
        match self.timer.stop(id, now) {
            Some(stopped) => {
                self.credit(stopped.clone())?;
                Ok(Some(stopped))
            }
            None => Ok(None),
        }
    }

    /// Stop when running, start otherwise. Returns the new state.
    pub fn toggle(&mut self, id: &SubjectId) -> Result<TimerState, TrackerError> {
        if self.timer.is_running(id) {
            self.stop(id)?;
        } else {
            self.start(id)?;
        }
        Ok(self.timer.state_of(id))
    }

    /// Stop and credit whatever is running (session teardown).
    pub fn stop_all(&mut self) -> Vec<StoppedTimer> {
        let now = self.clock.now();
        let stopped = self.timer.stop_all(now);
        for timer in &stopped {
            if let Err(err) = self.credit(timer.clone()) {
                warn!(subject = %timer.subject_id, reason = %err, "timer credit skipped");
            }
        }
        stopped
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn pending_write(&self) -> Option<PendingWrite> {
        self.pending
    }

    /// Take the pending write, if any, as a payload ready for the gateway.
    pub fn flush(&mut self) -> Option<StorePayload> {
        self.pending.take()?;
        Some(StorePayload::new(self.snapshot(), self.clock.now()))
    }

    /// Flush the pending write through `gateway`. Returns whether anything
    /// was written. On failure the write stays pending.
    pub fn save_to(&mut self, gateway: &dyn Gateway) -> Result<bool> {
        let urgency = self.pending;
        let Some(payload) = self.flush() else {
            return Ok(false);
        };
        let json = payload.to_json().map_err(StorageError::from)?;
        if let Err(err) = gateway.save(&json) {
            self.pending = urgency;
            return Err(err.into());
        }
        debug!(count = payload.subjects.len(), "store saved");
        Ok(true)
    }

    /// Hand over the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, id: &SubjectId) -> Result<&Subject, TrackerError> {
        self.store
            .find(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    fn mark(&mut self, write: PendingWrite) {
        self.pending = self.pending.max(Some(write));
    }

    fn updated(&mut self, id: &SubjectId, write: PendingWrite) -> Result<&Subject, TrackerError> {
        let progress = self.require(id)?.progress;
        self.events.push(Event::SubjectUpdated {
            id: id.clone(),
            progress,
            at: self.clock.now(),
        });
        self.mark(write);
        self.require(id)
    }

    fn credit(&mut self, stopped: StoppedTimer) -> Result<(), TrackerError> {
        let total = self
            .store
            .credit_time(&stopped.subject_id, stopped.minutes, stopped.stopped_at)?
            .total_time;
        info!(
            subject = %stopped.subject_id,
            credited_min = stopped.minutes,
            total_min = total,
            "timer stopped"
        );
        self.events.push(Event::TimerStopped {
            id: stopped.subject_id,
            credited_minutes: stopped.minutes,
            total_minutes: total,
            at: stopped.stopped_at,
        });
        self.mark(PendingWrite::Immediate);
        Ok(())
    }
}
