use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TariffError;
use crate::schedule::{DEFAULT_SUMMER_START, SUMMER_STARTS};

/// Tarifa 1C page of the CFE residential tariff portal
pub const DEFAULT_PORTAL_URL: &str =
    "https://app.cfe.mx/Aplicaciones/CCFE/Tarifas/TarifasCRECasa/Tarifas/Tarifa1C.aspx";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub calculator: CalculatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PORTAL_URL.to_string(),
            timeout_seconds: 30,
            user_agent: format!("cfe-tariffs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub default_summer: u8,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_summer: DEFAULT_SUMMER_START,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from an optional TOML file
///
/// A missing file is not an error; every setting has a default.
pub fn load_config(path: &Path) -> Result<Config, TariffError> {
    let source = config::File::from(path)
        .format(config::FileFormat::Toml)
        .required(false);

    let cfg: Config = config::Config::builder()
        .add_source(source)
        .build()?
        .try_deserialize()?;

    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<(), TariffError> {
    if cfg.scraper.url.trim().is_empty() {
        return Err(TariffError::Config("scraper.url cannot be empty".to_string()));
    }

    if cfg.scraper.timeout_seconds == 0 {
        return Err(TariffError::Config(
            "scraper.timeout_seconds must be greater than 0".to_string(),
        ));
    }

    if !SUMMER_STARTS.contains(&cfg.calculator.default_summer) {
        return Err(TariffError::Config(format!(
            "calculator.default_summer must be between {} and {}, got {}",
            SUMMER_STARTS.start(),
            SUMMER_STARTS.end(),
            cfg.calculator.default_summer
        )));
    }

    Ok(())
}
