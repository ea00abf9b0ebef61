//! Text and HTML rendering of cards and the dashboard.

use chrono::{DateTime, Utc};
use studyboard_core::view::{escape_html, format_minutes, format_relative};
use studyboard_core::{Dashboard, Subject, Tracker};

/// One-line card: id, name, progress, bucket, time, activity.
pub fn card(subject: &Subject, tracker: &Tracker, now: DateTime<Utc>) -> String {
    let running = if tracker.is_running(&subject.id) {
        " [running]"
    } else {
        ""
    };
    format!(
        "{id}  {name}  {progress}% ({bucket})  {time}{running}  modified {when}",
        id = subject.id,
        name = subject.name,
        progress = subject.progress,
        bucket = subject.bucket().label(),
        time = format_minutes(subject.total_time),
        when = format_relative(subject.last_modified, now),
    )
}

/// Card plus notes and creation time.
pub fn detail(subject: &Subject, tracker: &Tracker, now: DateTime<Utc>) -> String {
    let mut out = card(subject, tracker, now);
    out.push_str(&format!(
        "\n  created {}",
        subject.created_at.format("%Y-%m-%d %H:%M")
    ));
    if !subject.notes.is_empty() {
        for line in subject.notes.lines() {
            out.push_str("\n  | ");
            out.push_str(line);
        }
    }
    out
}

/// HTML fragment of cards. Names and notes are escaped here, never in the
/// store.
pub fn html_cards(subjects: &[&Subject], tracker: &Tracker, now: DateTime<Utc>) -> String {
    if subjects.is_empty() {
        return "<p class=\"empty-state\">No subjects match.</p>".to_string();
    }
    let mut out = String::new();
    for subject in subjects {
        let running = if tracker.is_running(&subject.id) {
            " running"
        } else {
            ""
        };
        out.push_str(&format!(
            "<article class=\"subject-card {slug}{running}\" data-id=\"{id}\">\n\
             \x20 <h3>{name}</h3>\n\
             \x20 <span class=\"status {slug}\">{label}</span>\n\
             \x20 <progress max=\"100\" value=\"{progress}\">{progress}%</progress>\n\
             \x20 <p class=\"time\">{time}</p>\n\
             \x20 <p class=\"notes\">{notes}</p>\n\
             \x20 <footer>Modified {when}</footer>\n\
             </article>\n",
            slug = subject.bucket().slug(),
            id = escape_html(subject.id.as_str()),
            name = escape_html(&subject.name),
            label = subject.bucket().label(),
            progress = subject.progress,
            time = format_minutes(subject.total_time),
            notes = escape_html(&subject.notes),
            when = format_relative(subject.last_modified, now),
        ));
    }
    out
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    format!(
        "Subjects: {}\nCompleted: {}\nAverage progress: {}%\nTotal study time: {}",
        dashboard.count,
        dashboard.completed_count,
        dashboard.average_progress,
        format_minutes(dashboard.total_minutes),
    )
}
