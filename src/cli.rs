use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cfe-tariffs", version, about = "CFE residential tariff calculator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "cfe-tariffs.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute the tiered cost of a month's consumption
    Calc {
        /// Stored schedule document
        #[arg(short, long)]
        data: PathBuf,

        /// Billing month (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: u8,

        /// Month in which summer starts locally (2-5, default 4)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=5))]
        summer: Option<u8>,

        /// Print the allocation as JSON
        #[arg(long)]
        json: bool,

        /// Monthly consumption in kWh
        consumption: u64,
    },

    /// Extract a year's schedule from the tariff portal
    Scrape {
        /// Portal page URL (defaults to the configured Tarifa 1C page)
        #[arg(short, long)]
        url: Option<String>,

        /// Tariff year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a stored schedule document
    Validate {
        /// Stored schedule document
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_calc() {
        let args = vec!["cfe-tariffs", "calc", "--data", "2024.json", "--month", "7", "350"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Calc {
                data,
                month,
                summer,
                json,
                consumption,
            } => {
                assert_eq!(data, PathBuf::from("2024.json"));
                assert_eq!(month, 7);
                assert!(summer.is_none());
                assert!(!json);
                assert_eq!(consumption, 350);
            }
            _ => panic!("Expected Calc command"),
        }
    }

    #[test]
    fn test_cli_parsing_calc_short_flags() {
        let args = vec!["cfe-tariffs", "calc", "-d", "s.json", "-m", "12", "-s", "2", "0"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Calc { summer, consumption, .. } => {
                assert_eq!(summer, Some(2));
                assert_eq!(consumption, 0);
            }
            _ => panic!("Expected Calc command"),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_month() {
        for month in ["0", "13", "july"] {
            let args = vec!["cfe-tariffs", "calc", "-d", "s.json", "-m", month, "100"];
            assert!(Cli::try_parse_from(args).is_err(), "month {} accepted", month);
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_summer() {
        for summer in ["1", "6", "x"] {
            let args = vec!["cfe-tariffs", "calc", "-d", "s.json", "-m", "1", "-s", summer, "100"];
            assert!(Cli::try_parse_from(args).is_err(), "summer {} accepted", summer);
        }
    }

    #[test]
    fn test_cli_rejects_negative_consumption() {
        let args = vec!["cfe-tariffs", "calc", "-d", "s.json", "-m", "1", "--", "-5"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_scrape() {
        let args = vec!["cfe-tariffs", "scrape", "--year", "2023", "-o", "2023.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Scrape { url, year, output } => {
                assert!(url.is_none());
                assert_eq!(year, Some(2023));
                assert_eq!(output, Some(PathBuf::from("2023.json")));
            }
            _ => panic!("Expected Scrape command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["cfe-tariffs", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }
}
