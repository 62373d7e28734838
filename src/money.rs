//! Money formatting
//!
//! Amounts are kept as plain decimals next to a currency code. This module
//! bridges them to `rusty-money` for display.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Look up an ISO currency by code. Only the currencies the storefront sells
/// in are recognised.
pub fn iso_currency(code: &str) -> Option<&'static Currency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "TRY" => Some(iso::TRY),
        "USD" => Some(iso::USD),
        "EUR" => Some(iso::EUR),
        "GBP" => Some(iso::GBP),
        _ => None,
    }
}

/// Convert a decimal amount into `Money`, rounding to the currency's minor unit.
///
/// Returns `None` if the amount does not fit in minor units.
pub fn to_money(amount: Decimal, currency: &'static Currency) -> Option<Money<'static, Currency>> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    let minor = amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()?;

    Some(Money::from_minor(minor, currency))
}

/// Format an amount for display, e.g. `£150.00`, falling back to
/// `150.00 XYZ` for currencies without a known format.
pub fn format_amount(amount: Decimal, code: &str) -> String {
    iso_currency(code)
        .and_then(|currency| to_money(amount, currency))
        .map_or_else(
            || {
                format!(
                    "{:.2} {}",
                    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                    code.trim().to_ascii_uppercase()
                )
            },
            |money| money.to_string(),
        )
}
