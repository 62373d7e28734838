//! Pricing
//!
//! Derived cart totals. Everything here is recomputed from scratch on every
//! transition; nothing is patched incrementally.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::LineItem;

/// Sales tax applied to every cart, as a fraction (18%).
pub fn tax_rate() -> Percentage {
    Percentage::from(Decimal::new(18, 2))
}

/// Totals derived from a cart's lines and its discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities over all lines
    pub total_item_count: u64,

    /// Sum of `unit_price * quantity` over all lines
    pub subtotal: Decimal,

    /// Tax on the subtotal
    pub tax_amount: Decimal,

    /// `subtotal + tax_amount - discount`, never below zero
    pub grand_total: Decimal,
}

impl CartTotals {
    /// Calculate totals for the given lines and absolute discount amount.
    pub fn calculate(items: &[LineItem], discount: Decimal) -> Self {
        let subtotal = subtotal(items);
        let tax_amount = tax_on(subtotal);

        Self {
            total_item_count: item_count(items),
            subtotal,
            tax_amount,
            grand_total: grand_total(subtotal, tax_amount, discount),
        }
    }
}

/// Sum of quantities over the given lines.
pub fn item_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Sum of line totals.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()))
}

/// Tax owed on a subtotal.
pub fn tax_on(subtotal: Decimal) -> Decimal {
    subtotal.saturating_mul(tax_rate() * Decimal::ONE)
}

/// Grand total after discount, floored at zero.
pub fn grand_total(subtotal: Decimal, tax_amount: Decimal, discount: Decimal) -> Decimal {
    subtotal
        .saturating_add(tax_amount)
        .saturating_sub(discount.max(Decimal::ZERO))
        .max(Decimal::ZERO)
}
