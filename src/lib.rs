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

//! # Invoice Creator
//!
//! This library provides the engine behind an invoice creation screen: a
//! catalog of billable line items, a selection modal with draft semantics,
//! quantity editing, exact-cents totals with sales tax, and a guarded
//! submission lifecycle that posts each invoice exactly once.
//!
//! ## Core Components
//!
//! - [`Money`]: Integer-cents amounts with explicit round-half-up tax
//! - [`InvoiceState`]: Root aggregate, changed only by [`Action`]s
//! - [`Store`]: Owns the state and keeps [`InvoiceTotals`] current
//! - [`Session`]: Drives catalog loading and invoice submission against an [`InvoiceApi`]
//! - [`HttpInvoiceApi`] / [`OfflineApi`]: Backends
//! - [`InvoiceError`]: Error types
//!
//! ## Example
//!
//! ```
//! use invoice_creator::{Action, InvoiceState, PostingStatus};
//!
//! let state = InvoiceState::new()
//!     .transition(Action::SubmitInvoice)
//!     .transition(Action::PostInFlight);
//! assert_eq!(state.posting_status, PostingStatus::Inflight);
//!
//! // A second submit while the call is outstanding changes nothing
//! let again = state.clone().transition(Action::SubmitInvoice);
//! assert_eq!(again, state);
//! ```
//!
//! ## Concurrency
//!
//! All state changes happen sequentially on the task driving a [`Session`].
//! Only the network calls run concurrently, and they report back through the
//! session's queue.

pub mod api;
mod base;
pub mod config;
pub mod error;
mod http;
pub mod line_item;
pub mod money;
mod offline;
pub mod row_editor;
pub mod session;
pub mod state;
mod store;
pub mod telemetry;
pub mod totals;
pub mod validation;

pub use api::{InvoiceAck, InvoiceApi, InvoiceDefaults, InvoicePayload, InvoiceSubmission};
pub use base::LineItemId;
pub use config::{Backend, Config};
pub use error::{ApiError, InvoiceError};
pub use http::HttpInvoiceApi;
pub use line_item::{CatalogItem, LineItem, LineItemEdit, SelectedLineItem};
pub use money::Money;
pub use offline::OfflineApi;
pub use row_editor::{RowEditor, RowEvent, RowStatus};
pub use session::{Session, SessionHandle};
pub use state::{Action, InvoiceState, PostingStatus, SelectionModalStatus, ToastStatus};
pub use store::Store;
pub use totals::{InvoiceTotals, SALES_TAX_RATE, Subtotals, calculate_subtotals};
pub use validation::{accept_quantity, is_valid_quantity};
