//! Subject model.
//!
//! A subject is one tracked learning topic: a name, a completion percentage,
//! minutes of focused time and free-form notes. Field names serialize in
//! camelCase because that is the shape of the persisted and exported JSON.

mod store;

pub use store::{SubjectEdit, SubjectStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::TrackerError;

/// Upper bound of `progress`.
pub const MAX_PROGRESS: u8 = 100;

/// Opaque subject identifier.
///
/// Generated ids are UUID v4 strings; imported ids are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A tracked learning topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    /// Trimmed, never empty.
    pub name: String,
    /// 0..=100
    pub progress: u8,
    /// Accumulated focus minutes.
    pub total_time: u64,
    /// Stored verbatim; escape at render time.
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Subject {
    /// Build a fresh subject. Fails with `EmptyName` on a blank name.
    pub fn new(name: &str, now: DateTime<Utc>) -> Result<Self, TrackerError> {
        Ok(Self {
            id: SubjectId::generate(),
            name: normalize_name(name)?,
            progress: 0,
            total_time: 0,
            notes: String::new(),
            created_at: now,
            last_modified: now,
        })
    }

    pub fn bucket(&self) -> Bucket {
        Bucket::of(self.progress)
    }

    /// Bump `last_modified`, never moving it before `created_at`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now.max(self.created_at);
    }
}

/// Trim a name and reject it when nothing is left.
pub fn normalize_name(raw: &str) -> Result<String, TrackerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Clamp any integer into `0..=100`.
pub fn clamp_progress(value: i64) -> u8 {
    value.clamp(0, MAX_PROGRESS as i64) as u8
}

/// Parse caller-supplied progress text.
///
/// Non-numeric text is `InvalidRange`; numeric text outside `0..=100` is
/// accepted here and clamped by the store. Integers too large for `i64`
/// saturate.
pub fn parse_progress(raw: &str) -> Result<i64, TrackerError> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Ok(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(TrackerError::InvalidRange(raw.to_string())),
        },
    }
}

/// Completion bucket used for filtering and status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    /// Filter-only: matches every subject.
    #[default]
    All,
    Completed,
    #[serde(alias = "in-progress", alias = "in_progress")]
    InProgress,
    #[serde(alias = "not-started", alias = "not_started")]
    NotStarted,
}

impl Bucket {
    /// Classify a progress value. Never returns `All`.
    pub fn of(progress: u8) -> Self {
        match progress {
            0 => Bucket::NotStarted,
            p if p >= MAX_PROGRESS => Bucket::Completed,
            _ => Bucket::InProgress,
        }
    }

    pub fn matches(&self, progress: u8) -> bool {
        *self == Bucket::All || *self == Bucket::of(progress)
    }

    /// Human label for status badges.
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::All => "All",
            Bucket::Completed => "Completed",
            Bucket::InProgress => "In Progress",
            Bucket::NotStarted => "Not Started",
        }
    }

    /// Kebab-case slug for styling hooks.
    pub fn slug(&self) -> &'static str {
        match self {
            Bucket::All => "all",
            Bucket::Completed => "completed",
            Bucket::InProgress => "in-progress",
            Bucket::NotStarted => "not-started",
        }
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Bucket::All),
            "completed" => Ok(Bucket::Completed),
            "inprogress" | "in-progress" | "in_progress" => Ok(Bucket::InProgress),
            "notstarted" | "not-started" | "not_started" => Ok(Bucket::NotStarted),
            other => Err(format!(
                "unknown filter '{other}'; expected all|completed|in-progress|not-started"
            )),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
