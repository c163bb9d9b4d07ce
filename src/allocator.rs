//! Tiered consumption allocation
//!
//! Consumption is poured into the tiers of a [`MonthRate`] in their listed
//! order. Each tier bills at most its own capacity, and the walk stops as soon
//! as the capacities seen so far cover the consumption.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::TariffError;
use crate::schedule::{Capacity, MonthRate, Schedule, MONTHS, SUMMER_STARTS};

/// Charge for a single tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCharge {
    #[serde(rename = "kWh")]
    pub capacity: Capacity,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(rename = "total_kWh")]
    pub allocated_kwh: u64,
    #[serde(rename = "total_price", with = "rust_decimal::serde::str")]
    pub cost: Decimal,
}

/// Result of allocating one month's consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    consumption: u64,
    tiers: Vec<TierCharge>,
    #[serde(with = "rust_decimal::serde::str")]
    total_cost: Decimal,
}

impl Allocation {
    pub fn tiers(&self) -> &[TierCharge] {
        &self.tiers
    }

    pub fn consumption(&self) -> u64 {
        self.consumption
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn billed_kwh(&self) -> u64 {
        self.tiers.iter().map(|t| t.allocated_kwh).sum()
    }

    /// Consumption beyond the combined capacity of every tier
    ///
    /// This part is not billed at all.
    pub fn unbilled_kwh(&self) -> u64 {
        self.consumption.saturating_sub(self.billed_kwh())
    }
}

/// Distribute `consumption` kWh over the tiers of `month_rate`
///
/// `remaining` is reduced by each tier's full capacity, not by the amount
/// billed in it, so the walk ends after the first tier whose cumulative
/// capacity reaches the consumption. With zero consumption the first tier is
/// still emitted with nothing allocated.
///
/// Fails with [`TariffError::Validation`] when a tier cost or the total does
/// not fit in a `Decimal`.
pub fn allocate(month_rate: &MonthRate, consumption: u64) -> Result<Allocation, TariffError> {
    let mut tiers = Vec::with_capacity(month_rate.tiers.len());
    let mut remaining = i128::from(consumption);
    let mut total_cost = Decimal::ZERO;

    for tier in &month_rate.tiers {
        let available = u64::try_from(remaining.max(0)).unwrap_or(u64::MAX);
        let used = tier.capacity.as_u64().min(available);
        let cost = Decimal::from(used)
            .checked_mul(tier.unit_price)
            .ok_or_else(|| {
                TariffError::Validation(format!(
                    "cost of {} kWh at {} in tier '{}' is out of range",
                    used, tier.unit_price, tier.name
                ))
            })?;
        total_cost = total_cost.checked_add(cost).ok_or_else(|| {
            TariffError::Validation(format!(
                "total cost of {} kWh is out of range",
                consumption
            ))
        })?;

        tiers.push(TierCharge {
            capacity: tier.capacity,
            name: tier.name.clone(),
            unit_price: tier.unit_price,
            allocated_kwh: used,
            cost,
        });

        remaining -= i128::from(tier.capacity.as_u64());
        if remaining <= 0 {
            break;
        }
    }

    Ok(Allocation {
        consumption,
        tiers,
        total_cost,
    })
}

/// Look up the month's rate table and allocate `consumption` against it
pub fn quote(
    schedule: &Schedule,
    summer_start: u8,
    month: u8,
    consumption: u64,
) -> Result<Allocation, TariffError> {
    if !SUMMER_STARTS.contains(&summer_start) {
        return Err(TariffError::Validation(format!(
            "summer start must be between {} and {}, got {}",
            SUMMER_STARTS.start(),
            SUMMER_STARTS.end(),
            summer_start
        )));
    }
    if !MONTHS.contains(&month) {
        return Err(TariffError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }

    let month_rate = schedule.month_rate(summer_start, month)?;
    allocate(month_rate, consumption)
}
