use anyhow::{Context, Result};
use cfe_tariffs::config::ScraperConfig;
use cfe_tariffs::provider::{stored, PortalScraper, ScheduleProvider};
use chrono::Datelike;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

/// Execute the scrape command
///
/// Extracts the schedule for `year` (default: current year) and prints it as
/// a stored schedule document, or writes it to `output`.
pub async fn execute(
    config: &ScraperConfig,
    url: Option<String>,
    year: Option<i32>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut scraper_config = config.clone();
    if let Some(url) = url {
        scraper_config.url = url;
    }
    let year = year.unwrap_or_else(|| chrono::Local::now().year());

    let scraper = PortalScraper::from_config(&scraper_config);
    info!(provider = scraper.name(), url = scraper.url(), year, "Scraping tariff schedule");

    let schedule = scraper.fetch(year).await?;
    let document = stored::to_document(&schedule)?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", document))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} ({} summer groups)",
                "✓ Schedule written to".green(),
                path.display(),
                schedule.summer_groups.len()
            );
        }
        None => println!("{}", document),
    }

    Ok(())
}
