//! Board and dashboard views.
//!
//! Pure functions over a snapshot of the subject collection. Nothing here
//! mutates a subject; the board pipeline is
//! `sort(filter_by_bucket(filter_by_search(all, term), bucket), key)`.

mod format;

pub use format::{escape_html, format_minutes, format_relative};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::subject::{Bucket, Subject, MAX_PROGRESS};

/// Board ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently modified first.
    #[default]
    Recent,
    /// Alphabetical.
    Name,
    /// Highest progress first.
    Progress,
    /// Most focus time first.
    Time,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(SortKey::Recent),
            "name" => Ok(SortKey::Name),
            "progress" => Ok(SortKey::Progress),
            "time" => Ok(SortKey::Time),
            other => Err(format!(
                "unknown sort '{other}'; expected recent|name|progress|time"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Recent => "recent",
            SortKey::Name => "name",
            SortKey::Progress => "progress",
            SortKey::Time => "time",
        };
        f.write_str(name)
    }
}

/// Dashboard figures for a set of subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub count: usize,
    pub completed_count: usize,
    /// Rounded mean, 0 when there are no subjects.
    pub average_progress: u8,
    pub total_minutes: u64,
}

/// What the board shows for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub bucket: Bucket,
    #[serde(default)]
    pub sort: SortKey,
}

/// Computed board: visible cards plus the dashboard over the whole store.
#[derive(Debug, Clone, Serialize)]
pub struct Board<'a> {
    pub subjects: Vec<&'a Subject>,
    pub dashboard: Dashboard,
}

impl Board<'_> {
    /// True when the empty-state should be shown instead of cards.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Case-insensitive substring match on the name. An empty term keeps all.
pub fn filter_by_search<'a, I>(subjects: I, term: &str) -> Vec<&'a Subject>
where
    I: IntoIterator<Item = &'a Subject>,
{
    let needle = term.to_lowercase();
    subjects
        .into_iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn filter_by_bucket<'a, I>(subjects: I, bucket: Bucket) -> Vec<&'a Subject>
where
    I: IntoIterator<Item = &'a Subject>,
{
    subjects
        .into_iter()
        .filter(|s| bucket.matches(s.progress))
        .collect()
}

/// Stable sort: equal keys keep their incoming order.
pub fn sort_by(mut subjects: Vec<&Subject>, key: SortKey) -> Vec<&Subject> {
    match key {
        SortKey::Recent => subjects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified)),
        SortKey::Name => subjects.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Progress => subjects.sort_by(|a, b| b.progress.cmp(&a.progress)),
        SortKey::Time => subjects.sort_by(|a, b| b.total_time.cmp(&a.total_time)),
    }
    subjects
}

/// Alphabetical order that ignores case first, so "art" sorts with "Art".
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sum every subject, never just the last one.
pub fn aggregate<'a, I>(subjects: I) -> Dashboard
where
    I: IntoIterator<Item = &'a Subject>,
{
    let mut count = 0usize;
    let mut completed_count = 0usize;
    let mut progress_sum = 0u64;
    let mut total_minutes = 0u64;
    for subject in subjects {
        count += 1;
        if subject.progress >= MAX_PROGRESS {
            completed_count += 1;
        }
        progress_sum += subject.progress as u64;
        total_minutes = total_minutes.saturating_add(subject.total_time);
    }

    Dashboard {
        count,
        completed_count,
        average_progress: rounded_mean(progress_sum, count),
        total_minutes,
    }
}

/// Mean rounded half-up.
fn rounded_mean(sum: u64, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    ((2 * sum + count) / (2 * count)).min(MAX_PROGRESS as u64) as u8
}

/// Run the full board pipeline.
pub fn compute_board<'a>(subjects: &'a [Subject], query: &BoardQuery) -> Board<'a> {
    let searched = filter_by_search(subjects, &query.search);
    let bucketed = filter_by_bucket(searched, query.bucket);
    Board {
        subjects: sort_by(bucketed, query.sort),
        dashboard: aggregate(subjects),
    }
}

/// Most recent modification across the collection, if any.
pub fn last_activity(subjects: &[Subject]) -> Option<DateTime<Utc>> {
    subjects.iter().map(|s| s.last_modified).max()
}
