use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ScheduleProvider;
use crate::error::TariffError;
use crate::schedule::Schedule;

/// Parse and validate a stored schedule document
pub fn parse_schedule(json: &str) -> Result<Schedule, TariffError> {
    let schedule: Schedule = serde_json::from_str(json)?;
    schedule.validate()?;
    Ok(schedule)
}

/// Render a schedule as a stored schedule document
pub fn to_document(schedule: &Schedule) -> Result<String, TariffError> {
    Ok(serde_json::to_string_pretty(schedule)?)
}

/// Load a previously saved schedule from `path`
pub fn load_stored(path: &Path) -> Result<Schedule, TariffError> {
    debug!(path = %path.display(), "Loading stored schedule");

    let json = std::fs::read_to_string(path).map_err(|source| TariffError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_schedule(&json).map_err(|e| match e {
        TariffError::Format(msg) => {
            TariffError::Format(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Provider backed by a schedule document on disk
pub struct StoredSchedule {
    path: PathBuf,
}

impl StoredSchedule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScheduleProvider for StoredSchedule {
    fn name(&self) -> &str {
        "stored"
    }

    async fn fetch(&self, year: i32) -> Result<Schedule, TariffError> {
        let schedule = load_stored(&self.path)?;
        if schedule.year != year {
            warn!(
                requested = year,
                stored = schedule.year,
                path = %self.path.display(),
                "Stored schedule is for a different year"
            );
        }
        Ok(schedule)
    }
}
