//! Subject store.
//!
//! Owns the subject collection in insertion order and enforces the field
//! invariants on every write. Timestamps are passed in by the caller so the
//! store itself never reads the clock.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::{clamp_progress, normalize_name, Subject, SubjectId};
use crate::error::TrackerError;

/// Fields changed by the edit dialog. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectEdit {
    pub name: Option<String>,
    pub progress: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectStore {
    subjects: Vec<Subject>,
}

impl SubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated subjects.
    pub fn from_subjects(subjects: Vec<Subject>) -> Result<Self, TrackerError> {
        validate_collection(&subjects)?;
        Ok(Self {
            subjects: subjects.into_iter().map(sanitize).collect(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn find(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SubjectId) -> bool {
        self.find(id).is_some()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn create(&mut self, name: &str, now: DateTime<Utc>) -> Result<&Subject, TrackerError> {
        let mut subject = Subject::new(name, now)?;
        while self.contains(&subject.id) {
            subject.id = SubjectId::generate();
        }
        self.subjects.push(subject);
        Ok(&self.subjects[self.subjects.len() - 1])
    }

    pub fn remove(&mut self, id: &SubjectId) -> Result<Subject, TrackerError> {
        let index = self.index_of(id)?;
        Ok(self.subjects.remove(index))
    }

    pub fn rename(
        &mut self,
        id: &SubjectId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let name = normalize_name(name)?;
        let subject = self.get_mut(id)?;
        subject.name = name;
        subject.touch(now);
        Ok(&*subject)
    }

    /// Out-of-range values are clamped, never rejected.
    pub fn set_progress(
        &mut self,
        id: &SubjectId,
        value: i64,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let subject = self.get_mut(id)?;
        subject.progress = clamp_progress(value);
        subject.touch(now);
        Ok(&*subject)
    }

    pub fn increment_progress(
        &mut self,
        id: &SubjectId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let current = self.get(id)?.progress as i64;
        self.set_progress(id, current.saturating_add(delta), now)
    }

    pub fn set_notes(
        &mut self,
        id: &SubjectId,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let subject = self.get_mut(id)?;
        subject.notes = notes.to_string();
        subject.touch(now);
        Ok(&*subject)
    }

    /// Apply an edit atomically: validation runs before any field changes.
    pub fn edit(
        &mut self,
        id: &SubjectId,
        edit: SubjectEdit,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let name = edit.name.as_deref().map(normalize_name).transpose()?;
        let subject = self.get_mut(id)?;
        if let Some(name) = name {
            subject.name = name;
        }
        if let Some(progress) = edit.progress {
            subject.progress = clamp_progress(progress);
        }
        if let Some(notes) = edit.notes {
            subject.notes = notes;
        }
        subject.touch(now);
        Ok(&*subject)
    }

    /// Add focus minutes. Only the timer stop path calls this.
    pub(crate) fn credit_time(
        &mut self,
        id: &SubjectId,
        minutes: u64,
        now: DateTime<Utc>,
    ) -> Result<&Subject, TrackerError> {
        let subject = self.get_mut(id)?;
        subject.total_time = subject.total_time.saturating_add(minutes);
        subject.touch(now);
        Ok(&*subject)
    }

    /// Drop every subject, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.subjects.len();
        self.subjects.clear();
        removed
    }

    /// Swap in a whole new collection, or change nothing on failure.
    pub fn replace_all(&mut self, subjects: Vec<Subject>) -> Result<usize, TrackerError> {
        let replacement = Self::from_subjects(subjects)?;
        *self = replacement;
        Ok(self.subjects.len())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn index_of(&self, id: &SubjectId) -> Result<usize, TrackerError> {
        self.subjects
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    fn get(&self, id: &SubjectId) -> Result<&Subject, TrackerError> {
        self.find(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &SubjectId) -> Result<&mut Subject, TrackerError> {
        let index = self.index_of(id)?;
        Ok(&mut self.subjects[index])
    }
}

/// Shape checks for a collection coming from outside the store.
fn validate_collection(subjects: &[Subject]) -> Result<(), TrackerError> {
    let mut seen = HashSet::with_capacity(subjects.len());
    for (index, subject) in subjects.iter().enumerate() {
        if subject.id.as_str().trim().is_empty() {
            return Err(TrackerError::MalformedPayload(format!(
                "subject #{index} has an empty id"
            )));
        }
        if !seen.insert(&subject.id) {
            return Err(TrackerError::MalformedPayload(format!(
                "duplicate subject id '{}'",
                subject.id
            )));
        }
        if subject.name.trim().is_empty() {
            return Err(TrackerError::MalformedPayload(format!(
                "subject '{}' has an empty name",
                subject.id
            )));
        }
    }
    Ok(())
}

/// Restore field invariants that the schema alone cannot express.
fn sanitize(mut subject: Subject) -> Subject {
    subject.name = subject.name.trim().to_string();
    subject.progress = clamp_progress(subject.progress as i64);
    if subject.last_modified < subject.created_at {
        subject.last_modified = subject.created_at;
    }
    subject
}
