//! Persisted and exported JSON shapes.
//!
//! ```text
//! stored:   { "subjects": [...], "version": "1.0", "lastSaved": "<ISO-8601>" }
//! exported: { "subjects": [...], "exportedAt": "<ISO-8601>", "version": "1.0" }
//! ```
//!
//! Loading is lenient (anything unreadable becomes an empty collection);
//! importing is strict (anything unreadable is `MalformedPayload`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TrackerError;
use crate::subject::{clamp_progress, Subject, SubjectId};

pub const SCHEMA_VERSION: &str = "1.0";

/// Name of the durable key-value slot.
pub const STORAGE_KEY: &str = "smartLearningTracker";

/// Payload written to the storage slot after each mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePayload {
    pub subjects: Vec<Subject>,
    pub version: String,
    pub last_saved: DateTime<Utc>,
}

impl StorePayload {
    pub fn new(subjects: Vec<Subject>, now: DateTime<Utc>) -> Self {
        Self {
            subjects,
            version: SCHEMA_VERSION.to_string(),
            last_saved: now,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Backup file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub subjects: Vec<Subject>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl ExportPayload {
    pub fn new(subjects: Vec<Subject>, now: DateTime<Utc>) -> Self {
        Self {
            subjects,
            exported_at: now,
            version: SCHEMA_VERSION.to_string(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `learning-tracker-backup-<epoch ms>.json`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("learning-tracker-backup-{}.json", now.timestamp_millis())
}

/// Subject as found in foreign JSON. Progress may be out of range and
/// `lastModified` may be missing; both are repaired on the way in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectRecord {
    id: SubjectId,
    name: String,
    progress: i64,
    #[serde(default)]
    total_time: u64,
    #[serde(default)]
    notes: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_modified: Option<DateTime<Utc>>,
}

impl From<SubjectRecord> for Subject {
    fn from(record: SubjectRecord) -> Self {
        Subject {
            id: record.id,
            name: record.name,
            progress: clamp_progress(record.progress),
            total_time: record.total_time,
            notes: record.notes,
            created_at: record.created_at,
            last_modified: record.last_modified.unwrap_or(record.created_at),
        }
    }
}

/// Strict parse of an import file or stored payload.
///
/// Requires a JSON object whose `subjects` member is an array of subjects.
pub fn parse_subjects(raw: &str) -> Result<Vec<Subject>, TrackerError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| TrackerError::MalformedPayload(format!("invalid JSON: {e}")))?;
    let subjects = value
        .get("subjects")
        .ok_or_else(|| TrackerError::MalformedPayload("missing 'subjects' field".into()))?;
    if !subjects.is_array() {
        return Err(TrackerError::MalformedPayload(
            "'subjects' must be an array".into(),
        ));
    }
    let records: Vec<SubjectRecord> = serde_json::from_value(subjects.clone())
        .map_err(|e| TrackerError::MalformedPayload(format!("invalid subject: {e}")))?;
    Ok(records.into_iter().map(Subject::from).collect())
}

/// Lenient parse of the storage slot: never fails.
///
/// A missing slot, or a payload without `subjects`, is an empty collection.
/// Anything else that does not parse is logged and also treated as empty.
pub fn load_subjects(raw: Option<&str>) -> Vec<Subject> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let missing_subjects = serde_json::from_str::<serde_json::Value>(raw)
        .map(|v| v.is_object() && v.get("subjects").is_none())
        .unwrap_or(false);
    if missing_subjects {
        return Vec::new();
    }
    match parse_subjects(raw) {
        Ok(subjects) => subjects,
        Err(err) => {
            warn!(reason = %err, "stored payload unreadable, starting empty");
            Vec::new()
        }
    }
}
