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

//! Backend contract and invoice wire format.
//!
//! The engine needs exactly two things from a backend: the catalog, and a way
//! to create an invoice. [`InvoiceApi`] captures both; [`HttpInvoiceApi`] and
//! [`OfflineApi`] implement it.
//!
//! [`HttpInvoiceApi`]: crate::HttpInvoiceApi
//! [`OfflineApi`]: crate::OfflineApi

use crate::ApiError;
use crate::base::LineItemId;
use crate::config::{DEFAULT_CUSTOMER_ID, DEFAULT_INVOICE_URL};
use crate::line_item::{CatalogItem, SelectedLineItem};
use crate::money::Money;
use crate::totals::InvoiceTotals;
use serde::{Deserialize, Deserializer, Serialize};
use std::future::Future;

/// Remote collaborator consumed by the submission orchestrator.
///
/// Implementations are shared with spawned tasks, hence `Send + Sync + 'static`.
pub trait InvoiceApi: Send + Sync + 'static {
    /// Loads the billable items, in display order.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<CatalogItem>, ApiError>> + Send;

    /// Creates an invoice for the selected items.
    fn post_invoice(
        &self,
        submission: InvoiceSubmission,
    ) -> impl Future<Output = Result<InvoiceAck, ApiError>> + Send;
}

/// What gets posted: the selected items and the amounts shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSubmission {
    pub line_items: Vec<SelectedLineItem>,
    pub tax: Money,
    pub subtotal: Money,
    pub total: Money,
}

impl InvoiceSubmission {
    pub fn from_totals(totals: &InvoiceTotals) -> Self {
        Self {
            line_items: totals.selected.clone(),
            tax: totals.tax,
            subtotal: totals.subtotal,
            total: totals.grand_total,
        }
    }

    /// Builds the JSON body sent to the invoice endpoint.
    ///
    /// Only `id`, `item`, `details`, `quantity` and `price` of each line item
    /// are sent.
    pub fn to_payload(&self, defaults: &InvoiceDefaults) -> InvoicePayload {
        InvoicePayload {
            meta: InvoiceMeta {
                tax: self.tax,
                subtotal: self.subtotal,
                line_items: self
                    .line_items
                    .iter()
                    .map(|selected| PayloadLineItem {
                        id: selected.line_item.id.clone(),
                        item: selected.line_item.item.clone(),
                        details: selected.line_item.details.clone(),
                        quantity: selected.line_item.quantity,
                        price: selected.line_item.price,
                    })
                    .collect(),
            },
            total: self.total,
            customer_id: defaults.customer_id.clone(),
            send_now: false,
            url: defaults.invoice_url.clone(),
        }
    }
}

/// Fixed values every posted invoice carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDefaults {
    pub customer_id: String,
    /// Link template for the hosted invoice page.
    pub invoice_url: Option<String>,
}

impl Default for InvoiceDefaults {
    fn default() -> Self {
        Self {
            customer_id: DEFAULT_CUSTOMER_ID.to_string(),
            invoice_url: Some(DEFAULT_INVOICE_URL.to_string()),
        }
    }
}

/// Invoice creation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePayload {
    pub meta: InvoiceMeta,
    pub total: Money,
    pub customer_id: String,
    pub send_now: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMeta {
    pub tax: Money,
    pub subtotal: Money,
    #[serde(rename = "lineItems")]
    pub line_items: Vec<PayloadLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLineItem {
    pub id: LineItemId,
    pub item: String,
    pub details: String,
    pub quantity: u32,
    pub price: Money,
}

/// Backend acknowledgement of a created invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAck {
    #[serde(default, deserialize_with = "text_or_number")]
    pub id: Option<String>,
}

/// Invoice ids come back as text or as integers, like catalog ids.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LineItemId>::deserialize(deserializer)?.map(|id| id.0))
}
