//! Rate table extraction
//!
//! The table body holding the tiers is the one containing a bold
//! "Consumo básico" cell. Every row has three cells: tier name, price per kWh
//! and a capacity text such as "Primeros 75 kWh". Rows without a number are
//! the open-ended last tier.

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use std::str::FromStr;
use std::sync::LazyLock;

use super::page::{normalized_text, selector};
use crate::error::TariffError;
use crate::schedule::{Capacity, Tier};

const BASIC_TIER_MARKER: &str = "Consumo básico";

static CAPACITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Extract the tiers of the rate table shown on `html`
pub fn parse_rate_table(html: &str) -> Result<Vec<Tier>, TariffError> {
    let document = Html::parse_document(html);
    let bold = selector("b")?;

    let marker = document
        .select(&bold)
        .find(|b| b.text().collect::<String>().contains(BASIC_TIER_MARKER))
        .ok_or_else(|| {
            TariffError::Extraction(format!("no '{}' rate table on the page", BASIC_TIER_MARKER))
        })?;

    let tbody = marker
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tbody")
        .ok_or_else(|| TariffError::Extraction("rate table has no body".to_string()))?;

    let tiers = child_elements(tbody, "tr")
        .enumerate()
        .map(|(idx, row)| parse_row(idx + 1, row))
        .collect::<Result<Vec<_>, _>>()?;

    if tiers.is_empty() {
        return Err(TariffError::Extraction("rate table has no rows".to_string()));
    }

    Ok(tiers)
}

fn parse_row(row_number: usize, row: ElementRef<'_>) -> Result<Tier, TariffError> {
    let cells: Vec<String> = child_elements(row, "td").map(normalized_text).collect();

    let [name, price, kwh] = cells.as_slice() else {
        return Err(TariffError::Extraction(format!(
            "rate row {} has {} cells, expected 3",
            row_number,
            cells.len()
        )));
    };

    let unit_price = parse_price(price).ok_or_else(|| {
        TariffError::Extraction(format!("rate row {} has invalid price '{}'", row_number, price))
    })?;

    Ok(Tier::new(parse_capacity(kwh), name.clone(), unit_price))
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = text.trim().trim_start_matches('$').trim();
    Decimal::from_str(cleaned).ok()
}

/// First run of digits in `text`, or unbounded when there is none
fn parse_capacity(text: &str) -> Capacity {
    CAPACITY_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(Capacity::kwh)
        .unwrap_or(Capacity::UNBOUNDED)
}
