//! Command implementations for the CLI
//!
//! - calc: Tiered cost of a month's consumption
//! - scrape: Extract a schedule from the tariff portal
//! - validate: Check a stored schedule document
//! - config: Configuration display

pub mod calc;
pub mod config;
pub mod scrape;
pub mod validate;
