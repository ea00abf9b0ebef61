use std::io::BufRead;

use studyboard_core::view::format_minutes;
use studyboard_core::SubjectId;

use crate::session::{print_events, Session};

/// Time a focus session on the subject until a line (or EOF) arrives on
/// stdin, then credit the elapsed whole minutes.
///
/// Nothing is written while waiting. The store is reloaded after the wait so
/// edits made by other invocations in the meantime survive the credit.
pub fn run(id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let id = SubjectId::from(id);
    let (name, started_at) = {
        let session = Session::open()?;
        let name = session.subject(&id)?.name.clone();
        (name, session.tracker.clock().now())
    };

    tracing::debug!(subject = %id, %started_at, "focus session started");
    eprintln!("Focusing on {name}. Press Enter to stop.");

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let mut session = Session::open()?;
    if session.tracker.find(&id).is_none() {
        return Err(format!("subject '{name}' was deleted during the session; nothing credited").into());
    }
    session.tracker.resume(&id, started_at)?;
    let stopped = session.tracker.stop(&id)?;
    let total = session.subject(&id)?.total_time;
    let events = session.finish()?;

    if json {
        print_events(&events)?;
    } else {
        let minutes = stopped.map(|s| s.minutes).unwrap_or(0);
        println!(
            "Credited {minutes} min to {name} (total {}).",
            format_minutes(total)
        );
    }
    Ok(())
}
