use anyhow::Result;
use cfe_tariffs::provider::load_stored;
use cfe_tariffs::schedule::Schedule;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the validate command
///
/// Loads a stored schedule document without computing anything
pub fn execute(data: &Path) -> Result<()> {
    println!("{}", "Validating schedule...".yellow());
    info!(path = %data.display(), "Validating stored schedule");

    let schedule = load_stored(data)?;

    println!("{}", "✓ Schedule is valid".green());
    println!();
    print!("{}", summarize(&schedule));

    info!("Schedule validation successful");
    Ok(())
}

fn summarize(schedule: &Schedule) -> String {
    let mut out = format!("{}\n", "Summary:".bold());
    out.push_str(&format!("  {}: {}\n", "Year".cyan(), schedule.year));
    out.push_str(&format!(
        "  {}: {}\n",
        "Summer Groups".cyan(),
        schedule.summer_groups.len()
    ));

    for group in &schedule.summer_groups {
        let tiers: usize = group.months.iter().map(|m| m.tiers.len()).sum();
        out.push_str(&format!(
            "    starts in month {}: {} months, {} tiers\n",
            group.start_month,
            group.months.len(),
            tiers
        ));
    }

    out.push_str(&format!("  {}: {}\n", "Total Tiers".cyan(), schedule.tier_count()));
    out
}
