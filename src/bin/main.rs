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

use clap::Parser;
use csv::WriterBuilder;
use invoice_creator::config::{DEFAULT_BASE_URL, DEFAULT_CUSTOMER_ID, DEFAULT_INVOICE_URL};
use invoice_creator::{
    Action, Backend, Config, HttpInvoiceApi, InvoiceApi, InvoiceDefaults, InvoiceError, Money,
    OfflineApi, Session, Store, telemetry,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process;

/// Invoice Creator - Build an invoice from a line item catalog
///
/// Loads the catalog, replays a script of actions (one JSON object per line),
/// and writes the selected line items and totals as CSV to stdout.
#[derive(Parser, Debug)]
#[command(name = "invoice-creator")]
#[command(about = "Builds and submits invoices from a line item catalog", long_about = None)]
struct Args {
    /// CSV catalog to serve locally instead of calling the API
    ///
    /// Expected format: id,item,details,price,is_taxable,in_stock
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Base URL of the invoicing API
    #[arg(long, env = "INVOICE_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Value sent in the Authorization header
    #[arg(long, env = "INVOICE_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Customer the invoice is issued to
    #[arg(long, env = "INVOICE_CUSTOMER_ID", default_value = DEFAULT_CUSTOMER_ID)]
    customer_id: String,

    /// Hosted invoice link sent with each invoice
    #[arg(long, env = "INVOICE_URL", default_value = DEFAULT_INVOICE_URL)]
    invoice_url: String,

    /// Sales tax rate applied to taxable line items
    #[arg(long, env = "INVOICE_TAX_RATE", default_value = "0.07")]
    tax_rate: Decimal,

    /// Actions to replay, one JSON object per line
    ///
    /// Example: {"type": "EDIT_LINE_ITEM", "line_item": {"id": "1", "quantity": 3}}
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Make the offline backend refuse every invoice
    #[arg(long)]
    fail_posts: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn to_config(&self) -> Config {
        let backend = match &self.catalog {
            Some(path) => Backend::Offline {
                catalog: path.clone(),
                fail_posts: self.fail_posts,
            },
            None => Backend::Http {
                base_url: self.api_url.clone(),
                token: self.api_token.clone().unwrap_or_default(),
            },
        };
        Config {
            backend,
            tax_rate: self.tax_rate,
            defaults: InvoiceDefaults {
                customer_id: self.customer_id.clone(),
                invoice_url: Some(self.invoice_url.clone()).filter(|url| !url.is_empty()),
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    telemetry::init(args.json_logs);

    let config = args.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let script = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(script) => script,
            Err(e) => {
                eprintln!("Error opening script '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => String::new(),
    };

    let result = match &config.backend {
        Backend::Http { .. } => match HttpInvoiceApi::from_config(&config) {
            Ok(api) => run(api, config.tax_rate, &script).await,
            Err(e) => Err(e),
        },
        Backend::Offline {
            catalog,
            fail_posts,
        } => match OfflineApi::from_csv_path(catalog, config.defaults.clone()) {
            Ok(api) => run(api.with_failing_posts(*fail_posts), config.tax_rate, &script).await,
            Err(e) => {
                eprintln!("Error reading catalog '{}': {}", catalog.display(), e);
                process::exit(1);
            }
        },
    };

    let store = match result {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_report(&store, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Loads the catalog, then replays `script`.
async fn run<A: InvoiceApi>(api: A, tax_rate: Decimal, script: &str) -> Result<Store, InvoiceError> {
    let mut session = Session::new(api, tax_rate);
    session.start();
    session.settle().await?;
    replay(&mut session, script).await?;
    Ok(session.store().clone())
}

/// Applies each scripted action and waits for any call it started.
///
/// Blank lines and lines starting with `#` are skipped. An action whose totals
/// would overflow is skipped.
///
/// # Errors
///
/// Returns [`InvoiceError::ContractViolation`] on the first line that is not a
/// known action; the replay stops there.
async fn replay<A: InvoiceApi>(session: &mut Session<A>, script: &str) -> Result<(), InvoiceError> {
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let action = Action::from_json(line).inspect_err(|e| {
            tracing::error!(line = index + 1, error = %e, "unknown action in script");
        })?;
        if let Err(e) = session.dispatch(action) {
            tracing::warn!(line = index + 1, error = %e, "skipping action");
            continue;
        }
        session.settle().await?;
    }
    Ok(())
}

/// Selected line item as written to the report.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    id: &'a str,
    item: &'a str,
    quantity: u32,
    price: Money,
    taxable: bool,
    total: Money,
}

/// Writes the selected line items followed by the invoice summary.
///
/// # CSV Format
///
/// ```csv
/// id,item,quantity,price,taxable,total
/// 1,Widget,3,10.00,true,30.00
/// subtotal,30.00
/// tax (7.00%),2.10
/// total,32.10
/// posting,ready
/// ```
fn write_report<W: Write>(store: &Store, writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);

    for selected in store.selected_items() {
        let line_item = &selected.line_item;
        wtr.serialize(ReportRow {
            id: line_item.id.as_str(),
            item: &line_item.item,
            quantity: line_item.quantity,
            price: line_item.price,
            taxable: line_item.is_taxable,
            total: selected.item_total,
        })?;
    }

    let totals = store.totals();
    let tax_label = format!("tax ({})", store.tax_rate_label());
    let posting = format!("{:?}", store.posting_status()).to_lowercase();
    wtr.write_record(["subtotal", totals.subtotal.to_string().as_str()])?;
    wtr.write_record([tax_label.as_str(), totals.tax.to_string().as_str()])?;
    wtr.write_record(["total", totals.grand_total.to_string().as_str()])?;
    wtr.write_record(["posting", posting.as_str()])?;
    if let Some(message) = store.toast_message() {
        wtr.write_record(["notice", message])?;
    }

    wtr.flush()?;
    Ok(())
}
