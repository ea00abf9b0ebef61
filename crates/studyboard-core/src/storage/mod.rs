mod config;
pub mod gateway;
pub mod schema;

pub use config::{BoardConfig, Config, LogConfig, NotesConfig, StorageConfig};
pub use gateway::{FileGateway, Gateway, MemoryGateway};
pub use schema::{ExportPayload, StorePayload, SCHEMA_VERSION, STORAGE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `STUDYBOARD_DATA_DIR` wins when set. Otherwise `~/.config/studyboard`,
/// or `~/.config/studyboard-dev` when `STUDYBOARD_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STUDYBOARD_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYBOARD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyboard-dev")
            } else {
                base_dir.join("studyboard")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
