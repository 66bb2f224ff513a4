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

//! Catalog records, in-state line items, and partial edits.

use crate::InvoiceError;
use crate::base::LineItemId;
use crate::money::Money;
use crate::validation::accept_quantity;
use serde::{Deserialize, Deserializer, Serialize};

/// A billable item as delivered by the catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: LineItemId,
    pub item: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: String,
    pub price: Money,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_taxable: bool,
    /// Informational only; any number the backend sends is read as a whole count.
    #[serde(default, deserialize_with = "lenient_stock")]
    pub in_stock: u32,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStock {
    Number(f64),
    Text(String),
}

fn lenient_stock<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let level = match Option::<RawStock>::deserialize(deserializer)? {
        Some(RawStock::Number(level)) => level,
        Some(RawStock::Text(text)) => text.trim().parse().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(stock_count(level))
}

/// Whole stock count: fractions truncate, negatives and NaN become zero.
pub(crate) fn stock_count(level: f64) -> u32 {
    // Float-to-int `as` saturates at both ends and maps NaN to 0.
    level as u32
}

/// A catalog entry together with its invoice selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub item: String,
    pub details: String,
    /// Unit price; fixed once loaded.
    pub price: Money,
    pub quantity: u32,
    pub is_taxable: bool,
    pub in_stock: u32,
    /// Committed inclusion in the invoice.
    pub selected: bool,
    /// Pending inclusion while the selection modal is open.
    #[serde(rename = "selectedDraft")]
    pub selected_draft: bool,
}

impl From<CatalogItem> for LineItem {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            item: item.item,
            details: item.details,
            price: item.price,
            quantity: 0,
            is_taxable: item.is_taxable,
            in_stock: item.in_stock,
            selected: false,
            selected_draft: false,
        }
    }
}

impl LineItem {
    /// Merges the fields present in `edit`.
    ///
    /// Every other field is applied even when the quantity is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::InvalidQuantity`] when the edit carried a quantity
    /// the validator refused; the previous quantity is kept.
    pub fn merge(&mut self, edit: &LineItemEdit) -> Result<(), InvoiceError> {
        if let Some(item) = &edit.item {
            self.item.clone_from(item);
        }
        if let Some(details) = &edit.details {
            self.details.clone_from(details);
        }
        if let Some(is_taxable) = edit.is_taxable {
            self.is_taxable = is_taxable;
        }
        if let Some(in_stock) = edit.in_stock {
            self.in_stock = in_stock;
        }
        if let Some(selected) = edit.selected {
            self.selected = selected;
        }
        if let Some(selected_draft) = edit.selected_draft {
            self.selected_draft = selected_draft;
        }
        if let Some(quantity) = edit.quantity {
            self.quantity = accept_quantity(quantity)?;
        }
        Ok(())
    }

    /// Clears selection and quantity after a successful submission.
    pub(crate) fn reset(&mut self) {
        self.selected = false;
        self.selected_draft = false;
        self.quantity = 0;
    }
}

/// A partial update addressed to one line item by id.
///
/// Absent fields leave the item unchanged. Quantity is the raw user input and
/// may be anything a number field can produce, including NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemEdit {
    pub id: LineItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_taxable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(
        default,
        rename = "selectedDraft",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_draft: Option<bool>,
}

impl LineItemEdit {
    pub fn new(id: impl Into<LineItemId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_selected_draft(mut self, selected_draft: bool) -> Self {
        self.selected_draft = Some(selected_draft);
        self
    }

    /// Flips the draft checkbox of `line_item` in the selection modal.
    pub fn toggle_draft(line_item: &LineItem) -> Self {
        Self::new(line_item.id.clone()).with_selected_draft(!line_item.selected_draft)
    }
}

/// A selected line item with its extended total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedLineItem {
    #[serde(flatten)]
    pub line_item: LineItem,
    pub item_total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> LineItem {
        LineItem::from(CatalogItem {
            id: LineItemId::from("w1"),
            item: "Widget".to_string(),
            details: "Blue".to_string(),
            price: Money::from_cents(1000),
            is_taxable: true,
            in_stock: 5,
        })
    }

    #[test]
    fn catalog_item_starts_unselected() {
        let item = widget();
        assert_eq!(item.quantity, 0);
        assert!(!item.selected);
        assert!(!item.selected_draft);
    }

    #[test]
    fn merge_applies_present_fields_only() {
        let mut item = widget();
        let edit = LineItemEdit {
            details: Some("Red".to_string()),
            ..LineItemEdit::new("w1").with_quantity(4.0)
        };
        item.merge(&edit).unwrap();
        assert_eq!(item.details, "Red");
        assert_eq!(item.quantity, 4);
        assert_eq!(item.item, "Widget");
        assert_eq!(item.price, Money::from_cents(1000));
    }

    #[test]
    fn rejected_quantity_keeps_previous_value_but_applies_rest() {
        let mut item = widget();
        item.quantity = 2;
        let edit = LineItemEdit::new("w1")
            .with_quantity(-1.0)
            .with_selected_draft(true);
        let result = item.merge(&edit);
        assert!(matches!(result, Err(InvoiceError::InvalidQuantity(_))));
        assert_eq!(item.quantity, 2);
        assert!(item.selected_draft);
    }

    #[test]
    fn toggle_draft_flips_checkbox() {
        let mut item = widget();
        item.merge(&LineItemEdit::toggle_draft(&item)).unwrap();
        assert!(item.selected_draft);
        item.merge(&LineItemEdit::toggle_draft(&item)).unwrap();
        assert!(!item.selected_draft);
    }

    #[test]
    fn catalog_item_accepts_null_details_and_numeric_price() {
        let json = r#"{"id": 7, "item": "Bolt", "details": null, "price": 0.25, "is_taxable": false}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, LineItemId::from("7"));
        assert_eq!(item.details, "");
        assert_eq!(item.price, Money::from_cents(25));
        assert_eq!(item.in_stock, 0);
    }

    #[test]
    fn catalog_item_accepts_fractional_negative_and_null_stock() {
        let read = |in_stock: &str| -> CatalogItem {
            let json = format!(
                r#"{{"id": "s", "item": "Screw", "price": "0.10", "in_stock": {in_stock}}}"#
            );
            serde_json::from_str(&json).unwrap()
        };
        assert_eq!(read("2.5").in_stock, 2);
        assert_eq!(read("-1").in_stock, 0);
        assert_eq!(read("null").in_stock, 0);
        assert_eq!(read("\"12\"").in_stock, 12);
        assert_eq!(read("1e12").in_stock, u32::MAX);
    }

    #[test]
    fn catalog_item_accepts_null_taxability() {
        let json = r#"{"id": "s", "item": "Screw", "price": "0.10", "is_taxable": null}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_taxable);
    }

    #[test]
    fn edit_payload_uses_wire_field_names() {
        let json = r#"{"id": "w1", "quantity": 3, "selectedDraft": true}"#;
        let edit: LineItemEdit = serde_json::from_str(json).unwrap();
        assert_eq!(edit.quantity, Some(3.0));
        assert_eq!(edit.selected_draft, Some(true));
        assert_eq!(edit.item, None);
    }
}
