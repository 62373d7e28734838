//! Cart summary

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::CartState, money::format_amount, pricing::tax_rate};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error while writing the summary.
    #[error("IO error")]
    IO,
}

/// Printable view of a cart.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'a> {
    state: &'a CartState,
}

impl<'a> CartSummary<'a> {
    /// Summarise a cart.
    pub fn new(state: &'a CartState) -> Self {
        Self { state }
    }

    /// Writes the line table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.state.is_empty() {
            return writeln!(out, "Your cart is empty.").map_err(|_err| SummaryError::IO);
        }

        let currency = self.state.currency();
        let mut builder = Builder::default();

        builder.push_record(["Item", "Kind", "Qty", "Unit Price", "Total"]);

        for item in self.state.items() {
            builder.push_record([
                item.title.clone(),
                item.item_kind.to_string(),
                item.quantity.to_string(),
                format_amount(item.unit_price, &item.currency),
                format_amount(item.line_total(), &item.currency),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Alignment::left());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

        let tax_label = format!(" Tax ({}):", percent_label(tax_rate()));

        let mut lines = vec![
            (" Subtotal:".to_string(), format_amount(self.state.subtotal(), currency)),
            (tax_label, format_amount(self.state.tax_amount(), currency)),
        ];

        if let Some(code) = self.state.discount_code() {
            let amount = self.state.discount_amount().unwrap_or_default();

            lines.push((
                format!(" Discount ({code}):"),
                format!("-{}", format_amount(amount, currency)),
            ));
        }

        lines.push((" Total:".to_string(), format_amount(self.state.total_price(), currency)));

        let label_width = lines.iter().map(|(label, _)| label.chars().count()).max();
        let value_width = lines.iter().map(|(_, value)| value.chars().count()).max();

        for (label, value) in &lines {
            write_summary_line(
                &mut out,
                label,
                value,
                label_width.unwrap_or_default(),
                value_width.unwrap_or_default(),
            )?;
        }

        writeln!(out).map_err(|_err| SummaryError::IO)
    }
}

fn percent_label(rate: Percentage) -> String {
    let points = (rate * Decimal::ONE_HUNDRED).normalize();

    format!("{points}%")
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), SummaryError> {
    let label_pad = label_col_width.saturating_sub(label.chars().count());
    let value_pad = value_col_width.saturating_sub(value.chars().count());

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| SummaryError::IO)
}
