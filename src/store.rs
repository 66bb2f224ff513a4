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

//! State container and derived invoice values.
//!
//! # Example
//!
//! ```
//! use invoice_creator::{Action, CatalogItem, LineItemEdit, LineItemId, Money, Store};
//! use rust_decimal_macros::dec;
//!
//! let mut store = Store::new(dec!(0.07));
//! store
//!     .dispatch(Action::PopulateCatalog {
//!         items: vec![CatalogItem {
//!             id: LineItemId::from("1"),
//!             item: "Widget".to_string(),
//!             details: String::new(),
//!             price: Money::from_cents(1000),
//!             is_taxable: true,
//!             in_stock: 10,
//!         }],
//!     })
//!     .unwrap();
//! store.dispatch(Action::OpenSelectionModal).unwrap();
//! store
//!     .dispatch(Action::edit(
//!         LineItemEdit::new("1").with_selected_draft(true).with_quantity(3.0),
//!     ))
//!     .unwrap();
//! store.dispatch(Action::CommitSelectionDraft).unwrap();
//!
//! assert_eq!(store.totals().grand_total.to_display_string(), "32.10");
//! ```

use crate::InvoiceError;
use crate::line_item::SelectedLineItem;
use crate::state::{Action, InvoiceState, PostingStatus};
use crate::totals::{InvoiceTotals, rate_label};
use rust_decimal::Decimal;

/// Owns the single [`InvoiceState`] and keeps its totals current.
#[derive(Debug, Clone)]
pub struct Store {
    state: InvoiceState,
    totals: InvoiceTotals,
    tax_rate: Decimal,
}

impl Store {
    pub fn new(tax_rate: Decimal) -> Self {
        Self {
            state: InvoiceState::new(),
            totals: InvoiceTotals::default(),
            tax_rate,
        }
    }

    /// Applies an action.
    ///
    /// Actions whose precondition does not hold leave the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::AmountOverflow`] if the resulting catalog cannot
    /// be totalled; the action is then rejected and the state is unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<(), InvoiceError> {
        let name = action.name();
        if !self.state.permits(&action) {
            tracing::debug!(
                action = name,
                posting = ?self.state.posting_status,
                "action not permitted from current state"
            );
            return Ok(());
        }

        let recompute = action.touches_catalog();
        let next = self.state.clone().transition(action);
        if recompute {
            self.totals = InvoiceTotals::compute(&next.catalog, self.tax_rate).inspect_err(|e| {
                tracing::warn!(action = name, error = %e, "action rejected");
            })?;
        }
        self.state = next;

        tracing::trace!(
            action = name,
            posting = ?self.state.posting_status,
            toast = ?self.state.toast_status,
            "action applied"
        );
        Ok(())
    }

    pub fn state(&self) -> &InvoiceState {
        &self.state
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn selected_items(&self) -> &[SelectedLineItem] {
        &self.totals.selected
    }

    pub fn posting_status(&self) -> PostingStatus {
        self.state.posting_status
    }

    /// Tax rate as shown next to the tax line, e.g. `"7.00%"`.
    pub fn tax_rate_label(&self) -> String {
        rate_label(self.tax_rate)
    }

    /// Whether the submit trigger should be enabled.
    pub fn submit_enabled(&self) -> bool {
        self.state.posting_status == PostingStatus::Ready && !self.totals.selected.is_empty()
    }

    pub fn toast_message(&self) -> Option<&'static str> {
        self.state.toast_status.message()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(crate::totals::SALES_TAX_RATE)
    }
}
