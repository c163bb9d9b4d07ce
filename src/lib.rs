pub mod allocator;
pub mod config;
pub mod error;
pub mod provider;
pub mod schedule;

pub use allocator::{allocate, quote, Allocation, TierCharge};
pub use error::TariffError;
pub use schedule::{find_month_rate, Capacity, MonthRate, Schedule, SummerGroup, Tier};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `default_level`. Output goes to stderr so
/// that documents printed on stdout stay machine-readable.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
