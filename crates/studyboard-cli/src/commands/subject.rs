use clap::Subcommand;
use studyboard_core::subject::parse_progress;
use studyboard_core::{Bucket, SortKey, SubjectEdit, SubjectId};

use crate::render;
use crate::session::{print_events, Session};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a new subject
    Add {
        /// Subject name
        name: String,
    },
    /// List subjects on the board
    List {
        /// Case-insensitive name search
        #[arg(long, default_value = "")]
        search: String,
        /// all | completed | in-progress | not-started
        #[arg(long)]
        filter: Option<Bucket>,
        /// recent | name | progress | time
        #[arg(long)]
        sort: Option<SortKey>,
        /// Print the cards as an HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// Show one subject with its notes
    Show {
        /// Subject ID
        id: String,
    },
    /// Rename a subject
    Rename {
        /// Subject ID
        id: String,
        /// New name
        name: String,
    },
    /// Set progress from typed text (clamped to 0..=100)
    Progress {
        /// Subject ID
        id: String,
        /// New progress value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Adjust progress by a signed step
    Bump {
        /// Subject ID
        id: String,
        /// Step, e.g. 10 or -10
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Mark a subject as completed
    Complete {
        /// Subject ID
        id: String,
    },
    /// Replace a subject's notes
    Notes {
        /// Subject ID
        id: String,
        /// Notes text
        text: String,
    },
    /// Edit several fields at once
    Edit {
        /// Subject ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        progress: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a subject
    Delete {
        /// Subject ID
        id: String,
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete every subject
    Clear {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: SubjectAction, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;

    match action {
        SubjectAction::Add { name } => {
            let id = session.tracker.create(&name)?.id.clone();
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::List {
            search,
            filter,
            sort,
            html,
        } => {
            let mut query = session.config.default_query();
            query.search = search;
            if let Some(bucket) = filter {
                query.bucket = bucket;
            }
            if let Some(key) = sort {
                query.sort = key;
            }
            let board = session.tracker.board(&query);
            if html {
                let now = session.tracker.clock().now();
                print!("{}", render::html_cards(&board.subjects, &session.tracker, now));
            } else if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else if board.is_empty() {
                println!("No subjects match.");
            } else {
                let now = session.tracker.clock().now();
                for subject in &board.subjects {
                    println!("{}", render::card(subject, &session.tracker, now));
                }
            }
            return Ok(());
        }
        SubjectAction::Show { id } => {
            let id = SubjectId::from(id);
            let subject = session.subject(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(subject)?);
            } else {
                let now = session.tracker.clock().now();
                println!("{}", render::detail(subject, &session.tracker, now));
            }
            return Ok(());
        }
        SubjectAction::Rename { id, name } => {
            let id = SubjectId::from(id);
            session.tracker.rename(&id, &name)?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Progress { id, value } => {
            let id = SubjectId::from(id);
            session.tracker.set_progress_input(&id, &value)?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Bump { id, delta } => {
            let id = SubjectId::from(id);
            session.tracker.increment_progress(&id, delta)?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Complete { id } => {
            let id = SubjectId::from(id);
            session.tracker.complete(&id)?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Notes { id, text } => {
            let id = SubjectId::from(id);
            session.tracker.set_notes(&id, &text)?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Edit {
            id,
            name,
            progress,
            notes,
        } => {
            let id = SubjectId::from(id);
            session.subject(&id)?;
            let progress = progress.as_deref().map(parse_progress).transpose()?;
            session.tracker.edit(
                &id,
                SubjectEdit {
                    name,
                    progress,
                    notes,
                },
            )?;
            return finish_with_subject(session, &id, json);
        }
        SubjectAction::Delete { id, yes } => {
            let id = SubjectId::from(id);
            let name = session.subject(&id)?.name.clone();
            if !yes {
                return Err(format!("refusing to delete '{name}' without --yes").into());
            }
            let removed = session.tracker.delete(&id)?;
            if !json {
                println!("Deleted: {} ({})", removed.name, removed.id);
            }
        }
        SubjectAction::Clear { yes } => {
            if session.tracker.is_empty() {
                println!("Nothing to clear.");
                return Ok(());
            }
            if !yes {
                return Err(format!(
                    "refusing to delete all {} subjects without --yes",
                    session.tracker.subjects().len()
                )
                .into());
            }
            let removed = session.tracker.clear();
            if !json {
                println!("Deleted {removed} subjects.");
            }
        }
    }

    let events = session.finish()?;
    if json {
        print_events(&events)?;
    }
    Ok(())
}

fn finish_with_subject(
    mut session: Session,
    id: &SubjectId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    session.save()?;
    let subject = session.subject(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(subject)?);
    } else {
        let now = session.tracker.clock().now();
        println!("{}", render::card(subject, &session.tracker, now));
    }
    Ok(())
}
