//! Tariff schedule data model
//!
//! A [`Schedule`] holds one year of residential tariffs, grouped by the month
//! in which summer starts for a region and then by billing month. Each month
//! carries an ordered list of [`Tier`]s; the order is the billing order and is
//! never re-sorted.
//!
//! The serde representation is the stored schedule document:
//!
//! ```json
//! {"year": 2024, "summers": [{"start": 4, "months": [{"month": 1, "rates": [
//!     {"kWh": 75, "name": "Básico", "price": "0.854"},
//!     {"kWh": "infinite", "name": "Excedente", "price": "3.008"}
//! ]}]}]}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::warn;

use crate::error::TariffError;

/// Months in which a regional summer may start
pub const SUMMER_STARTS: RangeInclusive<u8> = 2..=5;

/// Billing months
pub const MONTHS: RangeInclusive<u8> = 1..=12;

/// Summer start used when none is given
pub const DEFAULT_SUMMER_START: u8 = 4;

/// Per-tier kWh capacity
///
/// The last tier of a month is usually unbounded; that is represented by the
/// [`Capacity::UNBOUNDED`] sentinel rather than a floating-point infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capacity(u64);

impl Capacity {
    pub const UNBOUNDED: Capacity = Capacity(u64::MAX);

    pub const fn kwh(kwh: u64) -> Self {
        Self(kwh)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub const fn is_unbounded(self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "∞")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

const UNBOUNDED_LABEL: &str = "infinite";

impl Serialize for Capacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_unbounded() {
            serializer.serialize_str(UNBOUNDED_LABEL)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Capacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Kwh(u64),
            Float(f64),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Kwh(kwh) => Ok(Capacity::kwh(kwh)),
            // Some writers emit whole numbers as `75.0`
            Raw::Float(kwh) if kwh >= 0.0 && kwh.fract() == 0.0 && kwh < u64::MAX as f64 => {
                Ok(Capacity::kwh(kwh as u64))
            }
            Raw::Float(kwh) => Err(serde::de::Error::custom(format!(
                "invalid kWh capacity {}: expected a non-negative integer or \"infinite\"",
                kwh
            ))),
            Raw::Label(label) => match label.trim().to_ascii_lowercase().as_str() {
                "infinite" | "infinity" | "inf" => Ok(Capacity::UNBOUNDED),
                other => Err(serde::de::Error::custom(format!(
                    "invalid kWh capacity '{}': expected a non-negative integer or \"infinite\"",
                    other
                ))),
            },
        }
    }
}

/// A single price tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(rename = "kWh")]
    pub capacity: Capacity,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

impl Tier {
    pub fn new(capacity: Capacity, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            capacity,
            name: name.into(),
            unit_price,
        }
    }
}

/// Rate table for one billing month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRate {
    pub month: u8,
    #[serde(rename = "rates")]
    pub tiers: Vec<Tier>,
}

/// All month tables for regions whose summer starts in `start_month`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummerGroup {
    #[serde(rename = "start")]
    pub start_month: u8,
    pub months: Vec<MonthRate>,
}

impl SummerGroup {
    /// First month table for `month`
    pub fn month_rate(&self, month: u8) -> Option<&MonthRate> {
        self.months.iter().find(|m| m.month == month)
    }
}

/// One year's full tariff structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: i32,
    #[serde(rename = "summers")]
    pub summer_groups: Vec<SummerGroup>,
}

impl Schedule {
    /// First summer group starting in `start_month`
    pub fn summer_group(&self, start_month: u8) -> Option<&SummerGroup> {
        self.summer_groups
            .iter()
            .find(|g| g.start_month == start_month)
    }

    /// Look up the rate table for a billing month
    pub fn month_rate(&self, summer_start: u8, month: u8) -> Result<&MonthRate, TariffError> {
        let group = self.summer_group(summer_start).ok_or_else(|| {
            TariffError::NotFound(format!(
                "no summer group starting in month {} in the {} schedule",
                summer_start, self.year
            ))
        })?;

        group.month_rate(month).ok_or_else(|| {
            TariffError::NotFound(format!(
                "no rates for month {} in summer group {} of the {} schedule",
                month, summer_start, self.year
            ))
        })
    }

    /// Total number of tiers across every group and month
    pub fn tier_count(&self) -> usize {
        self.summer_groups
            .iter()
            .flat_map(|g| g.months.iter())
            .map(|m| m.tiers.len())
            .sum()
    }

    /// Check structural rules a stored or scraped schedule must satisfy
    ///
    /// Duplicate summer groups or months are tolerated (lookup takes the first
    /// one) but logged.
    pub fn validate(&self) -> Result<(), TariffError> {
        let mut seen_starts = HashSet::new();
        for group in &self.summer_groups {
            if !SUMMER_STARTS.contains(&group.start_month) {
                return Err(TariffError::Format(format!(
                    "summer start {} is outside {}-{}",
                    group.start_month,
                    SUMMER_STARTS.start(),
                    SUMMER_STARTS.end()
                )));
            }
            if !seen_starts.insert(group.start_month) {
                warn!(start = group.start_month, "Duplicate summer group, only the first is used");
            }

            let mut seen_months = HashSet::new();
            for month in &group.months {
                if !MONTHS.contains(&month.month) {
                    return Err(TariffError::Format(format!(
                        "month {} in summer group {} is outside 1-12",
                        month.month, group.start_month
                    )));
                }
                if month.tiers.is_empty() {
                    return Err(TariffError::Format(format!(
                        "month {} in summer group {} has no rates",
                        month.month, group.start_month
                    )));
                }
                if !seen_months.insert(month.month) {
                    warn!(
                        start = group.start_month,
                        month = month.month,
                        "Duplicate month, only the first is used"
                    );
                }
            }
        }

        Ok(())
    }
}

/// Look up the rate table for `month` in the group whose summer starts in
/// `summer_start`
pub fn find_month_rate(
    schedule: &Schedule,
    summer_start: u8,
    month: u8,
) -> Result<&MonthRate, TariffError> {
    schedule.month_rate(summer_start, month)
}
