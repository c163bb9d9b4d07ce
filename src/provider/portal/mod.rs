//! Live extraction from the CFE residential tariff portal
//!
//! The portal shows one rate table at a time, selected through three
//! dropdowns: year, month in which the local summer starts, and billing month.
//! [`PortalScraper::fetch_live`] walks every summer start and month for one
//! year and assembles the tables into a [`Schedule`].

pub mod page;
pub mod rates;
pub mod session;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::ScheduleProvider;
use crate::config::ScraperConfig;
use crate::error::TariffError;
use crate::schedule::{MonthRate, Schedule, SummerGroup, MONTHS, SUMMER_STARTS};

pub use session::PortalSession;

pub const YEAR_LABEL: &str = "Consultar tarifas de:";
pub const SUMMER_LABEL: &str = "Elige el mes en que comienza el verano en tu localidad";
pub const MONTH_LABEL: &str = "Elige el mes que deseas consultar";

/// Scraper for the tariff portal
pub struct PortalScraper {
    url: String,
    timeout: Duration,
    user_agent: String,
    sessions: Arc<AtomicUsize>,
}

impl PortalScraper {
    pub fn new(url: impl Into<String>) -> Self {
        let defaults = ScraperConfig::default();
        Self {
            url: url.into(),
            timeout: Duration::from_secs(defaults.timeout_seconds),
            user_agent: defaults.user_agent,
            sessions: Arc::default(),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            user_agent: config.user_agent.clone(),
            sessions: Arc::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of portal sessions opened by this scraper and not yet dropped
    pub fn open_sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Extract the full schedule for `year`
    ///
    /// The portal session is dropped before returning, whether extraction
    /// succeeded or not.
    pub async fn fetch_live(&self, year: i32) -> Result<Schedule, TariffError> {
        let result = {
            let mut session = PortalSession::open(
                &self.url,
                self.timeout,
                &self.user_agent,
                Arc::clone(&self.sessions),
            )?;
            extract(&mut session, year).await
        };

        match &result {
            Ok(schedule) => info!(
                year,
                groups = schedule.summer_groups.len(),
                tiers = schedule.tier_count(),
                "Schedule extracted"
            ),
            Err(e) => warn!(year, kind = e.kind(), error = %e, "Schedule extraction failed"),
        }

        result
    }
}

#[async_trait]
impl ScheduleProvider for PortalScraper {
    fn name(&self) -> &str {
        "portal"
    }

    async fn fetch(&self, year: i32) -> Result<Schedule, TariffError> {
        self.fetch_live(year).await
    }
}

async fn extract(session: &mut PortalSession, year: i32) -> Result<Schedule, TariffError> {
    info!(year, "Loading tariff portal");
    session.load().await?;
    session.select(YEAR_LABEL, &year.to_string()).await?;

    let mut summer_groups = Vec::new();
    for start_month in SUMMER_STARTS {
        session.select(SUMMER_LABEL, &start_month.to_string()).await?;

        let mut months = Vec::new();
        for month in MONTHS {
            let page = session.select(MONTH_LABEL, &month.to_string()).await?;
            let tiers = rates::parse_rate_table(&page.body).map_err(|e| match e {
                TariffError::Extraction(msg) => TariffError::Extraction(format!(
                    "summer {} month {}: {}",
                    start_month, month, msg
                )),
                other => other,
            })?;

            debug!(start_month, month, tiers = tiers.len(), "Rate table read");
            months.push(MonthRate { month, tiers });
        }

        summer_groups.push(SummerGroup {
            start_month,
            months,
        });
    }

    Ok(Schedule {
        year,
        summer_groups,
    })
}
