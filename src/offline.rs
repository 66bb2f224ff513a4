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

//! Offline backend.
//!
//! Serves a catalog loaded from CSV and records invoices instead of sending
//! them. Used for local runs of the CLI and as a test double.
//!
//! # CSV Format
//!
//! ```csv
//! id,item,details,price,is_taxable,in_stock
//! 1,Widget,Blue widget,10.00,true,25
//! 2,Installation,,45.50,false,
//! ```

use crate::{ApiError, InvoiceError};
use crate::api::{InvoiceAck, InvoiceApi, InvoiceDefaults, InvoicePayload, InvoiceSubmission};
use crate::base::LineItemId;
use crate::line_item::{CatalogItem, stock_count};
use crate::money::Money;
use csv::{ReaderBuilder, Trim};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Raw CSV record matching the catalog format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: String,
    item: String,
    #[serde(default)]
    details: String,
    price: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    is_taxable: Option<bool>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    in_stock: Option<f64>,
}

impl CsvRecord {
    fn into_catalog_item(self) -> Result<CatalogItem, InvoiceError> {
        Ok(CatalogItem {
            id: LineItemId(self.id),
            item: self.item,
            details: self.details,
            price: Money::from_str_amount(&self.price)?,
            is_taxable: self.is_taxable.unwrap_or(false),
            in_stock: self.in_stock.map(stock_count).unwrap_or(0),
        })
    }
}

pub struct OfflineApi {
    catalog: Vec<CatalogItem>,
    defaults: InvoiceDefaults,
    fail_posts: AtomicBool,
    submissions: Mutex<Vec<InvoicePayload>>,
}

impl OfflineApi {
    pub fn new(catalog: Vec<CatalogItem>, defaults: InvoiceDefaults) -> Self {
        Self {
            catalog,
            defaults,
            fail_posts: AtomicBool::new(false),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Loads the catalog from CSV.
    ///
    /// Malformed rows and rows with an invalid price are skipped.
    ///
    /// # Errors
    ///
    /// Returns a CSV error if the header cannot be read.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        defaults: InvoiceDefaults,
    ) -> Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);
        rdr.headers()?;

        let mut catalog = Vec::new();
        for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
            match result.map_err(|e| e.to_string()).and_then(|record| {
                record.into_catalog_item().map_err(|e| e.to_string())
            }) {
                Ok(item) => catalog.push(item),
                Err(e) => tracing::warn!(row = row + 1, error = %e, "skipping catalog row"),
            }
        }

        tracing::debug!(items = catalog.len(), "offline catalog loaded");
        Ok(Self::new(catalog, defaults))
    }

    pub fn from_csv_path(path: &Path, defaults: InvoiceDefaults) -> Result<Self, csv::Error> {
        let file = File::open(path)?;
        Self::from_csv_reader(file, defaults)
    }

    /// Makes every subsequent post fail with [`ApiError::Rejected`].
    pub fn with_failing_posts(self, fail: bool) -> Self {
        self.set_fail_posts(fail);
        self
    }

    pub fn set_fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    /// Payloads recorded so far, oldest first.
    pub fn submissions(&self) -> Vec<InvoicePayload> {
        self.submissions.lock().clone()
    }
}

impl InvoiceApi for OfflineApi {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError> {
        Ok(self.catalog.clone())
    }

    async fn post_invoice(&self, submission: InvoiceSubmission) -> Result<InvoiceAck, ApiError> {
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected(
                "offline backend refuses invoices".to_string(),
            ));
        }

        let payload = submission.to_payload(&self.defaults);
        let mut submissions = self.submissions.lock();
        submissions.push(payload);
        let id = format!("offline-{}", submissions.len());
        tracing::info!(invoice = %id, total = %submission.total, "invoice recorded");
        Ok(InvoiceAck { id: Some(id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn defaults() -> InvoiceDefaults {
        InvoiceDefaults {
            customer_id: "cust".to_string(),
            invoice_url: None,
        }
    }

    #[test]
    fn parse_catalog_csv() {
        let csv = "id,item,details,price,is_taxable,in_stock\n\
                   1,Widget,Blue widget,10.00,true,25\n\
                   2,Installation,,45.5,false,\n";
        let api = OfflineApi::from_csv_reader(Cursor::new(csv), defaults()).unwrap();

        assert_eq!(api.catalog().len(), 2);
        assert_eq!(api.catalog()[0].price.cents(), 1000);
        assert!(api.catalog()[0].is_taxable);
        assert_eq!(api.catalog()[0].in_stock, 25);
        assert_eq!(api.catalog()[1].details, "");
        assert_eq!(api.catalog()[1].price.cents(), 4550);
        assert_eq!(api.catalog()[1].in_stock, 0);
    }

    #[test]
    fn ids_are_kept_verbatim() {
        let csv = "id,item,details,price,is_taxable,in_stock\n007,Agent,,1.00,false,1\n";
        let api = OfflineApi::from_csv_reader(Cursor::new(csv), defaults()).unwrap();
        assert_eq!(api.catalog()[0].id, LineItemId::from("007"));
    }

    #[test]
    fn skip_rows_with_bad_prices() {
        let csv = "id,item,details,price,is_taxable,in_stock\n\
                   1,Widget,,10.00,true,1\n\
                   2,Gadget,,1.999,true,1\n\
                   3,Gizmo,,free,true,1\n\
                   4,Doohickey,,3.00,false,1\n";
        let api = OfflineApi::from_csv_reader(Cursor::new(csv), defaults()).unwrap();
        let ids: Vec<&str> = api.catalog().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn parse_with_whitespace() {
        let csv = "id,item,details,price,is_taxable,in_stock\n 1 , Widget , , 2.50 , true , 3 \n";
        let api = OfflineApi::from_csv_reader(Cursor::new(csv), defaults()).unwrap();
        assert_eq!(api.catalog()[0].item, "Widget");
        assert_eq!(api.catalog()[0].price.cents(), 250);
    }

    #[test]
    fn fractional_and_negative_stock_are_clamped() {
        let csv = "id,item,details,price,is_taxable,in_stock\n\
                   1,Rope,,1.00,false,2.5\n\
                   2,Wire,,1.00,false,-4\n";
        let api = OfflineApi::from_csv_reader(Cursor::new(csv), defaults()).unwrap();
        assert_eq!(api.catalog()[0].in_stock, 2);
        assert_eq!(api.catalog()[1].in_stock, 0);
    }
}
