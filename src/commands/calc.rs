use anyhow::Result;
use cfe_tariffs::allocator::{self, Allocation};
use cfe_tariffs::provider::load_stored;
use colored::Colorize;
use std::path::Path;
use tracing::{info, warn};

/// Execute the calc command
///
/// Loads the stored schedule, looks up the month's rate table and prints the
/// per-tier allocation of `consumption`.
pub fn execute(data: &Path, month: u8, summer: u8, consumption: u64, json: bool) -> Result<()> {
    let schedule = load_stored(data)?;
    info!(
        year = schedule.year,
        summer,
        month,
        consumption,
        "Calculating tiered cost"
    );

    let allocation = allocator::quote(&schedule, summer, month, consumption)?;

    if allocation.unbilled_kwh() > 0 {
        warn!(
            unbilled_kwh = allocation.unbilled_kwh(),
            "Consumption exceeds the combined capacity of all tiers, the excess is not billed"
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&allocation)?);
    } else {
        println!(
            "{} {} · summer from month {} · month {} · {} kWh",
            "Tariff".bold(),
            schedule.year,
            summer,
            month,
            consumption
        );
        println!();
        print!("{}", render_table(&allocation));
    }

    Ok(())
}

fn render_table(allocation: &Allocation) -> String {
    let mut out = format!(
        "  {:<24} {:>10} {:>10} {:>10} {:>12}\n",
        "Tier".cyan(),
        "Capacity".cyan(),
        "Price".cyan(),
        "kWh".cyan(),
        "Cost".cyan()
    );

    for tier in allocation.tiers() {
        out.push_str(&format!(
            "  {:<24} {:>10} {:>10} {:>10} {:>12}\n",
            tier.name,
            tier.capacity.to_string(),
            tier.unit_price.to_string(),
            tier.allocated_kwh,
            tier.cost.to_string()
        ));
    }

    out.push_str(&format!(
        "  {:<24} {:>10} {:>10} {:>10} {:>12}\n",
        "Total".bold(),
        "",
        "",
        allocation.billed_kwh(),
        allocation.total_cost().to_string().green().bold()
    ));
    out
}
