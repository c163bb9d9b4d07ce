//! Schedule providers
//!
//! A provider yields a [`Schedule`] for a given year. The allocator never
//! depends on where the schedule came from:
//! - [`StoredSchedule`]: a previously saved JSON document
//! - [`PortalScraper`]: live extraction from the CFE tariff portal

pub mod portal;
pub mod stored;

use async_trait::async_trait;

use crate::error::TariffError;
use crate::schedule::Schedule;

pub use portal::PortalScraper;
pub use stored::{load_stored, StoredSchedule};

/// Source of tariff schedules
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Provider name used in logs (e.g. "stored", "portal")
    fn name(&self) -> &str;

    /// Produce the schedule for `year`
    async fn fetch(&self, year: i32) -> Result<Schedule, TariffError>;
}
