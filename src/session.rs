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

//! Submission orchestrator.
//!
//! A [`Session`] owns the [`Store`] and the backend, and processes every action
//! sequentially on the task that drives it. Network calls run on spawned tasks
//! that never touch the state: the session joins them and applies the action
//! each one produced, in order.
//!
//! # Posting cycle
//!
//! 1. `SubmitInvoice` moves the state to `Posting`.
//! 2. Before anything else runs, the session applies `PostInFlight`, takes a
//!    snapshot of the selected items and totals, and spawns one `post_invoice`.
//! 3. The joined result becomes `PostSucceeded` or `PostFailed`. A task that
//!    panicked counts as a failed post.
//!
//! A `SubmitInvoice` arriving while the state is `Inflight` is a no-op, so at
//! most one `post_invoice` is ever outstanding.
//!
//! All methods that spawn work must be called from within a Tokio runtime.

use crate::{ApiError, InvoiceError};
use crate::api::{InvoiceApi, InvoiceSubmission};
use crate::line_item::CatalogItem;
use crate::state::{Action, PostingStatus};
use crate::store::Store;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinSet};

/// Cloneable entry point for queueing actions from event handlers.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: UnboundedSender<Action>,
}

impl SessionHandle {
    /// Queues `action`. Returns `false` if the session is gone.
    pub fn dispatch(&self, action: Action) -> bool {
        self.sender.send(action).is_ok()
    }
}

/// What woke the session up.
enum Event {
    Queued(Action),
    Fetched(Result<Result<Vec<CatalogItem>, ApiError>, JoinError>),
    Posted(Result<Result<(), ApiError>, JoinError>),
}

pub struct Session<A: InvoiceApi> {
    store: Store,
    api: Arc<A>,
    sender: UnboundedSender<Action>,
    receiver: UnboundedReceiver<Action>,
    fetches: JoinSet<Result<Vec<CatalogItem>, ApiError>>,
    posts: JoinSet<Result<(), ApiError>>,
    catalog_requested: bool,
}

impl<A: InvoiceApi> Session<A> {
    pub fn new(api: A, tax_rate: Decimal) -> Self {
        Self::with_shared_api(Arc::new(api), tax_rate)
    }

    /// Creates a session around a backend the caller keeps a handle to.
    pub fn with_shared_api(api: Arc<A>, tax_rate: Decimal) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            store: Store::new(tax_rate),
            api,
            sender,
            receiver,
            fetches: JoinSet::new(),
            posts: JoinSet::new(),
            catalog_requested: false,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            sender: self.sender.clone(),
        }
    }

    /// Requests the catalog. Only the first call has an effect.
    ///
    /// On failure the catalog stays empty and the error is logged; there is no
    /// retry.
    pub fn start(&mut self) {
        if self.catalog_requested {
            return;
        }
        self.catalog_requested = true;

        let api = Arc::clone(&self.api);
        self.fetches.spawn(async move { api.fetch_catalog().await });
    }

    /// Applies `action` immediately, starting a post if it entered `Posting`.
    ///
    /// # Errors
    ///
    /// Propagates [`Store::dispatch`] errors; the state is then unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<(), InvoiceError> {
        self.store.dispatch(action)?;
        if self.store.posting_status() == PostingStatus::Posting {
            self.begin_post()?;
        }
        Ok(())
    }

    fn begin_post(&mut self) -> Result<(), InvoiceError> {
        // Close the re-entrancy window before the call exists.
        self.store.dispatch(Action::PostInFlight)?;
        let submission = InvoiceSubmission::from_totals(self.store.totals());
        tracing::info!(
            line_items = submission.line_items.len(),
            subtotal = %submission.subtotal,
            tax = %submission.tax,
            total = %submission.total,
            "submitting invoice"
        );

        let api = Arc::clone(&self.api);
        self.posts.spawn(async move {
            let ack = api.post_invoice(submission).await?;
            tracing::info!(invoice = ?ack.id, "invoice created");
            Ok(())
        });
        Ok(())
    }

    fn finish_fetch(
        &mut self,
        joined: Result<Result<Vec<CatalogItem>, ApiError>, JoinError>,
    ) -> Result<(), InvoiceError> {
        match joined.unwrap_or_else(|e| Err(aborted(e))) {
            Ok(items) => {
                tracing::info!(items = items.len(), "catalog loaded");
                self.dispatch(Action::PopulateCatalog { items })
            }
            Err(e) => {
                let kind = e.kind();
                let err = InvoiceError::Fetch(e);
                tracing::error!(kind, error = %err, "catalog unavailable");
                Ok(())
            }
        }
    }

    fn finish_post(
        &mut self,
        joined: Result<Result<(), ApiError>, JoinError>,
    ) -> Result<(), InvoiceError> {
        match joined.unwrap_or_else(|e| Err(aborted(e))) {
            Ok(()) => self.dispatch(Action::PostSucceeded),
            Err(e) => {
                let kind = e.kind();
                let err = InvoiceError::Submit(e);
                tracing::error!(kind, error = %err, "invoice not created");
                self.dispatch(Action::PostFailed)
            }
        }
    }

    /// Processes one queued action or finished call, waiting for a call if
    /// nothing is queued.
    ///
    /// Returns `false` once the queue is empty and nothing is outstanding.
    pub async fn next(&mut self) -> Result<bool, InvoiceError> {
        if let Ok(action) = self.receiver.try_recv() {
            self.dispatch(action)?;
            return Ok(true);
        }
        if self.outstanding() == 0 {
            return Ok(false);
        }

        let event = tokio::select! {
            biased;
            Some(action) = self.receiver.recv() => Event::Queued(action),
            Some(joined) = self.fetches.join_next() => Event::Fetched(joined),
            Some(joined) = self.posts.join_next() => Event::Posted(joined),
            else => return Ok(false),
        };

        match event {
            Event::Queued(action) => self.dispatch(action)?,
            Event::Fetched(joined) => self.finish_fetch(joined)?,
            Event::Posted(joined) => self.finish_post(joined)?,
        }
        Ok(true)
    }

    /// Runs until every queued action is applied and no call is outstanding.
    pub async fn settle(&mut self) -> Result<(), InvoiceError> {
        while self.next().await? {}
        Ok(())
    }

    /// Number of spawned calls still running.
    pub fn outstanding(&self) -> usize {
        self.fetches.len() + self.posts.len()
    }
}

/// A backend task that never returned is reported like any other call failure.
fn aborted(e: JoinError) -> ApiError {
    if e.is_panic() {
        ApiError::Aborted("backend task panicked".to_string())
    } else {
        ApiError::Aborted(e.to_string())
    }
}
