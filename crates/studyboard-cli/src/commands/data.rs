use std::path::PathBuf;

use clap::Subcommand;
use studyboard_core::storage::schema::export_file_name;

use crate::session::{print_events, Session};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a backup of all subjects
    Export {
        /// Output file (default: learning-tracker-backup-<ms>.json in the
        /// current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace all subjects with the contents of a backup file
    Import {
        /// Backup file to read
        path: PathBuf,
        /// Confirm replacing existing subjects
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;

    match action {
        DataAction::Export { out } => {
            let payload = session.tracker.export()?;
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(payload.exported_at)));
            std::fs::write(&path, payload.to_json_pretty()?)?;
            tracing::info!(path = %path.display(), count = payload.subjects.len(), "exported backup");
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "path": path, "count": payload.subjects.len() })
                );
            } else {
                println!("Exported {} subjects to {}", payload.subjects.len(), path.display());
            }
        }
        DataAction::Import { path, yes } => {
            let raw = std::fs::read_to_string(&path)?;
            if !session.tracker.is_empty() && !yes {
                return Err(format!(
                    "importing replaces all {} existing subjects; pass --yes to confirm",
                    session.tracker.subjects().len()
                )
                .into());
            }
            let count = session.tracker.import_json(&raw)?;
            let events = session.finish()?;
            if json {
                print_events(&events)?;
            } else {
                println!("Imported {count} subjects from {}", path.display());
            }
        }
    }
    Ok(())
}
