mod config;
pub mod database;
mod store;

pub use config::{Config, CuesConfig, StatsConfig, TimerConfig};
pub use database::Database;
pub use store::{DateRange, WorkoutStore};

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/ironlog[-dev]/` based on IRONLOG_ENV.
///
/// Set IRONLOG_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("IRONLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ironlog-dev")
    } else {
        base_dir.join("ironlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
