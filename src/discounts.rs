//! Discounts
//!
//! The cart only ever stores an absolute discount amount. Turning a code into
//! that amount is the job of a [`DiscountTable`], consulted by the caller
//! before it applies the discount.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or consulting a discount table.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// The code is not in the table.
    #[error("Unknown discount code: {0}")]
    UnknownCode(String),

    /// The percentage could not be parsed, or lies outside 0-100%.
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// IO error reading the table file
    #[error("Failed to read discount table: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Wrapper for discount codes in YAML
#[derive(Debug, Deserialize)]
struct DiscountTableFixture {
    /// Map of code -> percentage (e.g. "10%" or "0.10")
    codes: FxHashMap<String, String>,
}

/// Mapping from discount code to percentage off the subtotal.
#[derive(Debug, Clone, Default)]
pub struct DiscountTable {
    codes: FxHashMap<String, Percentage>,
}

impl DiscountTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The codes shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();

        table.insert("WELCOME10", Percentage::from(Decimal::new(10, 2)));
        table.insert("SUMMER15", Percentage::from(Decimal::new(15, 2)));
        table.insert("FAMILY20", Percentage::from(Decimal::new(20, 2)));

        table
    }

    /// Load a table from a YAML file of the form:
    ///
    /// ```yaml
    /// codes:
    ///   WELCOME10: 10%
    ///   SPRING: "0.05"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// percentage is invalid.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DiscountError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a table from YAML text. See [`DiscountTable::from_yaml_file`].
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or a percentage is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, DiscountError> {
        let fixture: DiscountTableFixture = serde_norway::from_str(contents)?;
        let mut table = Self::new();

        for (code, percentage) in fixture.codes {
            table.insert(&code, parse_percentage(&percentage)?);
        }

        Ok(table)
    }

    /// Add or replace a code. Codes are matched case-insensitively.
    pub fn insert(&mut self, code: &str, percentage: Percentage) {
        self.codes.insert(normalize_code(code), percentage);
    }

    /// Look up the percentage for a code.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::UnknownCode`] if the code is not in the table.
    pub fn percentage(&self, code: &str) -> Result<Percentage, DiscountError> {
        self.codes
            .get(&normalize_code(code))
            .copied()
            .ok_or_else(|| DiscountError::UnknownCode(code.to_string()))
    }

    /// Absolute amount a code takes off the given subtotal, rounded to two
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::UnknownCode`] if the code is not in the table.
    pub fn amount_for(&self, code: &str, subtotal: Decimal) -> Result<Decimal, DiscountError> {
        let percentage = self.percentage(code)?;

        Ok(subtotal
            .saturating_mul(percentage * Decimal::ONE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Codes in the table with their percentages, sorted by code.
    pub fn entries(&self) -> Vec<(&str, Percentage)> {
        let mut entries: Vec<(&str, Percentage)> = self
            .codes
            .iter()
            .map(|(code, percentage)| (code.as_str(), *percentage))
            .collect();

        entries.sort_unstable_by_key(|(code, _)| *code);

        entries
    }

    /// Number of codes in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or lies outside 0-100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, DiscountError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| DiscountError::InvalidPercentage(s.to_string()))?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| DiscountError::InvalidPercentage(s.to_string()))?
    } else {
        trimmed
            .parse::<Decimal>()
            .map_err(|_err| DiscountError::InvalidPercentage(s.to_string()))?
    };

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(DiscountError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
