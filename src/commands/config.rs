use anyhow::Result;
use cfe_tariffs::config::Config;
use colored::Colorize;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration (file values over defaults)
pub fn show(cfg: &Config) -> Result<()> {
    info!("Displaying configuration");

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    Ok(())
}
