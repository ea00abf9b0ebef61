//! # Studyboard Core Library
//!
//! This library provides the core logic for Studyboard, a single-user tracker
//! of study subjects: each subject has a name, a completion percentage,
//! accumulated focus minutes and free-form notes. The CLI binary is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Subject Store**: owns the collection and enforces field invariants
//! - **Timer Engine**: wall-clock state machine with at most one running
//!   timer; the caller supplies `now`
//! - **Views**: pure search/bucket/sort/aggregate functions for the board
//!   and dashboard
//! - **Storage**: JSON schema for the storage slot and backup files, a
//!   gateway trait, and TOML configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: owner of all state; every mutation goes through it
//! - [`TimerEngine`]: focus timer state machine
//! - [`Gateway`]: persistence boundary
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod subject;
pub mod time;
pub mod timer;
pub mod tracker;
pub mod view;

pub use error::{ConfigError, CoreError, StorageError, TrackerError};
pub use events::Event;
pub use storage::{Config, ExportPayload, FileGateway, Gateway, MemoryGateway, StorePayload};
pub use subject::{Bucket, Subject, SubjectEdit, SubjectId, SubjectStore};
pub use time::Clock;
pub use timer::{StoppedTimer, TimerEngine, TimerState};
pub use tracker::{PendingWrite, Tracker};
pub use view::{BoardQuery, Dashboard, SortKey};
