pub mod config;
pub mod data;
pub mod focus;
pub mod stats;
pub mod subject;
