// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Invoice subtotal, tax and grand total.

use crate::InvoiceError;
use crate::line_item::{LineItem, SelectedLineItem};
use crate::money::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Sales tax applied to taxable line items.
pub const SALES_TAX_RATE: Decimal = dec!(0.07);

/// Result of folding the catalog over the selected items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subtotals {
    pub subtotal: Money,
    pub taxable_subtotal: Money,
    /// Selected items in catalog order, each with `price * quantity`.
    pub selected: Vec<SelectedLineItem>,
}

/// Sums the selected line items.
///
/// Unselected items are skipped entirely.
///
/// # Errors
///
/// Returns [`InvoiceError::AmountOverflow`] if a total does not fit in cents.
pub fn calculate_subtotals(line_items: &[LineItem]) -> Result<Subtotals, InvoiceError> {
    line_items
        .iter()
        .filter(|line_item| line_item.selected)
        .try_fold(Subtotals::default(), |mut acc, line_item| {
            let item_total = line_item.price.checked_mul(line_item.quantity)?;
            acc.subtotal = acc.subtotal.checked_add(item_total)?;
            if line_item.is_taxable {
                acc.taxable_subtotal = acc.taxable_subtotal.checked_add(item_total)?;
            }
            acc.selected.push(SelectedLineItem {
                line_item: line_item.clone(),
                item_total,
            });
            Ok(acc)
        })
}

/// Monetary summary of the invoice being built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub taxable_subtotal: Money,
    pub tax: Money,
    pub grand_total: Money,
    pub selected: Vec<SelectedLineItem>,
}

impl InvoiceTotals {
    /// Computes subtotal, tax (rounded half-up to cents) and grand total.
    pub fn compute(line_items: &[LineItem], tax_rate: Decimal) -> Result<Self, InvoiceError> {
        let Subtotals {
            subtotal,
            taxable_subtotal,
            selected,
        } = calculate_subtotals(line_items)?;
        let tax = taxable_subtotal.apply_rate(tax_rate)?;
        let grand_total = subtotal.checked_add(tax)?;

        Ok(Self {
            subtotal,
            taxable_subtotal,
            tax,
            grand_total,
            selected,
        })
    }
}

/// Formats a rate as a percentage with two decimals, e.g. `0.07` -> `"7.00%"`.
pub fn rate_label(rate: Decimal) -> String {
    format!("{:.2}%", rate * dec!(100))
}
