use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cfe_tariffs::{config, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments; usage errors exit with status 2 before anything runs
    let args = cli::Cli::parse();

    let cfg = config::load_config(&args.config)?;
    init_tracing(&cfg.logging.level);

    // Dispatch to appropriate command handler
    match args.command {
        cli::Commands::Calc {
            data,
            month,
            summer,
            json,
            consumption,
        } => {
            let summer = summer.unwrap_or(cfg.calculator.default_summer);
            commands::calc::execute(&data, month, summer, consumption, json)?;
        }
        cli::Commands::Scrape { url, year, output } => {
            commands::scrape::execute(&cfg.scraper, url, year, output).await?;
        }
        cli::Commands::Validate { data } => {
            commands::validate::execute(&data)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
        },
        cli::Commands::Version => {
            println!("CFE Tariffs v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
