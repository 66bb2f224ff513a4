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

//! Invoice state machine.
//!
//! [`InvoiceState`] is the single root aggregate. It changes only through
//! [`InvoiceState::transition`], which consumes the current state and returns
//! the complete next one.
//!
//! Posting lifecycle:
//!
//! ```text
//!  Ready ──SubmitInvoice──► Posting ──PostInFlight──► Inflight ──PostSucceeded──► Ready (toast: success)
//!                                                        │
//!                                                        └──────PostFailed──────► Ready (toast: fail)
//! ```
//!
//! `Posting` and `Inflight` are separate so that "the user asked to submit" and
//! "the network call has started" are distinguishable. A second
//! `SubmitInvoice` while a call is outstanding finds the state in `Inflight`
//! and changes nothing.

use crate::InvoiceError;
use crate::base::LineItemId;
use crate::line_item::{CatalogItem, LineItem, LineItemEdit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionModalStatus {
    #[default]
    Closed,
    Opened,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    #[default]
    Ready,
    Posting,
    Inflight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastStatus {
    #[default]
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "opened.success")]
    OpenedSuccess,
    #[serde(rename = "opened.fail")]
    OpenedFail,
}

impl ToastStatus {
    /// Text shown to the user, if the toast is open.
    pub fn message(self) -> Option<&'static str> {
        match self {
            ToastStatus::Closed => None,
            ToastStatus::OpenedSuccess => Some("Your invoice was created successfully."),
            ToastStatus::OpenedFail => Some("Error: Your invoice could not be created."),
        }
    }
}

/// Everything the presentation layer can ask the state machine to do.
///
/// Serialized with a `type` tag, e.g. `{"type": "SUBMIT_INVOICE"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    PopulateCatalog { items: Vec<CatalogItem> },
    OpenSelectionModal,
    DiscardSelectionDraft,
    CommitSelectionDraft,
    EditLineItem { line_item: LineItemEdit },
    SubmitInvoice,
    PostInFlight,
    PostSucceeded,
    PostFailed,
    CloseToast,
}

impl Action {
    /// Decodes an action arriving from outside the crate.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::ContractViolation`] for an unknown `type` or a
    /// payload of the wrong shape. This indicates a caller bug and is not
    /// meant to be recovered from.
    pub fn from_json(json: &str) -> Result<Action, InvoiceError> {
        serde_json::from_str(json).map_err(|e| InvoiceError::ContractViolation(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::PopulateCatalog { .. } => "POPULATE_CATALOG",
            Action::OpenSelectionModal => "OPEN_SELECTION_MODAL",
            Action::DiscardSelectionDraft => "DISCARD_SELECTION_DRAFT",
            Action::CommitSelectionDraft => "COMMIT_SELECTION_DRAFT",
            Action::EditLineItem { .. } => "EDIT_LINE_ITEM",
            Action::SubmitInvoice => "SUBMIT_INVOICE",
            Action::PostInFlight => "POST_IN_FLIGHT",
            Action::PostSucceeded => "POST_SUCCEEDED",
            Action::PostFailed => "POST_FAILED",
            Action::CloseToast => "CLOSE_TOAST",
        }
    }

    /// Whether the action can change the catalog and therefore the totals.
    pub fn touches_catalog(&self) -> bool {
        matches!(
            self,
            Action::PopulateCatalog { .. }
                | Action::OpenSelectionModal
                | Action::DiscardSelectionDraft
                | Action::CommitSelectionDraft
                | Action::EditLineItem { .. }
                | Action::PostSucceeded
        )
    }

    pub fn edit(line_item: LineItemEdit) -> Action {
        Action::EditLineItem { line_item }
    }
}

/// Root aggregate of the invoice front-end.
///
/// # Invariants
///
/// - Every line item quantity is a whole number, so it is finite and `>= 0`.
/// - `selected_draft == selected` for every item while the modal is closed,
///   unless an edit targeted the draft directly.
/// - Posting only advances `Ready -> Posting -> Inflight -> Ready`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceState {
    pub catalog: Vec<LineItem>,
    pub selection_modal_status: SelectionModalStatus,
    pub posting_status: PostingStatus,
    pub toast_status: ToastStatus,
}

impl InvoiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.catalog.iter().find(|item| &item.id == id)
    }

    /// Whether `action` has any effect from the current state.
    ///
    /// Actions whose precondition does not hold are no-ops in
    /// [`transition`](Self::transition).
    pub fn permits(&self, action: &Action) -> bool {
        match action {
            Action::EditLineItem { line_item } => self.line_item(&line_item.id).is_some(),
            Action::SubmitInvoice => self.posting_status == PostingStatus::Ready,
            Action::PostInFlight => self.posting_status == PostingStatus::Posting,
            Action::PostSucceeded | Action::PostFailed => {
                self.posting_status == PostingStatus::Inflight
            }
            Action::PopulateCatalog { .. }
            | Action::OpenSelectionModal
            | Action::DiscardSelectionDraft
            | Action::CommitSelectionDraft
            | Action::CloseToast => true,
        }
    }

    /// Applies `action` and returns the next state.
    pub fn transition(mut self, action: Action) -> InvoiceState {
        if !self.permits(&action) {
            return self;
        }

        match action {
            Action::PopulateCatalog { items } => {
                self.catalog = items.into_iter().map(LineItem::from).collect();
            }
            Action::OpenSelectionModal => {
                if self.selection_modal_status == SelectionModalStatus::Closed {
                    self.sync_drafts();
                }
                self.selection_modal_status = SelectionModalStatus::Opened;
            }
            Action::DiscardSelectionDraft => {
                self.selection_modal_status = SelectionModalStatus::Closed;
                self.sync_drafts();
            }
            Action::CommitSelectionDraft => {
                self.selection_modal_status = SelectionModalStatus::Closed;
                for item in &mut self.catalog {
                    item.selected = item.selected_draft;
                }
            }
            Action::EditLineItem { line_item: edit } => {
                if let Some(item) = self.catalog.iter_mut().find(|item| item.id == edit.id) {
                    if let Err(e) = item.merge(&edit) {
                        tracing::debug!(line_item = %edit.id, error = %e, "quantity edit ignored");
                    }
                }
            }
            Action::SubmitInvoice => {
                self.posting_status = PostingStatus::Posting;
            }
            Action::PostInFlight => {
                self.posting_status = PostingStatus::Inflight;
            }
            Action::PostSucceeded => {
                self.posting_status = PostingStatus::Ready;
                self.toast_status = ToastStatus::OpenedSuccess;
                for item in &mut self.catalog {
                    item.reset();
                }
            }
            Action::PostFailed => {
                self.posting_status = PostingStatus::Ready;
                self.toast_status = ToastStatus::OpenedFail;
            }
            Action::CloseToast => {
                self.toast_status = ToastStatus::Closed;
            }
        }

        self
    }

    fn sync_drafts(&mut self) {
        for item in &mut self.catalog {
            item.selected_draft = item.selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem {
                id: LineItemId::from("a"),
                item: "Consulting".to_string(),
                details: "Hourly".to_string(),
                price: Money::from_cents(10_000),
                is_taxable: false,
                in_stock: 40,
            },
            CatalogItem {
                id: LineItemId::from("b"),
                item: "Cable".to_string(),
                details: String::new(),
                price: Money::from_cents(599),
                is_taxable: true,
                in_stock: 100,
            },
        ]
    }

    fn populated() -> InvoiceState {
        InvoiceState::new().transition(Action::PopulateCatalog { items: catalog() })
    }

    fn run(state: InvoiceState, actions: Vec<Action>) -> InvoiceState {
        actions.into_iter().fold(state, InvoiceState::transition)
    }

    #[test]
    fn starts_empty_and_idle() {
        let state = InvoiceState::new();
        assert!(state.catalog.is_empty());
        assert_eq!(state.selection_modal_status, SelectionModalStatus::Closed);
        assert_eq!(state.posting_status, PostingStatus::Ready);
        assert_eq!(state.toast_status, ToastStatus::Closed);
    }

    #[test]
    fn populate_replaces_instead_of_merging() {
        let state = run(
            populated(),
            vec![Action::edit(LineItemEdit::new("a").with_quantity(3.0))],
        );
        let state = state.transition(Action::PopulateCatalog {
            items: catalog()[1..].to_vec(),
        });
        assert_eq!(state.catalog.len(), 1);
        assert_eq!(state.catalog[0].id, LineItemId::from("b"));
        assert_eq!(state.catalog[0].quantity, 0);
    }

    #[test]
    fn discard_reverts_draft() {
        let state = run(
            populated(),
            vec![
                Action::OpenSelectionModal,
                Action::edit(LineItemEdit::new("a").with_selected_draft(true)),
                Action::DiscardSelectionDraft,
            ],
        );
        assert_eq!(state.selection_modal_status, SelectionModalStatus::Closed);
        assert!(!state.catalog[0].selected);
        assert!(!state.catalog[0].selected_draft);
    }

    #[test]
    fn commit_persists_draft() {
        let state = run(
            populated(),
            vec![
                Action::OpenSelectionModal,
                Action::edit(LineItemEdit::new("b").with_selected_draft(true)),
                Action::CommitSelectionDraft,
            ],
        );
        assert!(state.catalog[1].selected);
        assert!(!state.catalog[0].selected);
    }

    #[test]
    fn fresh_open_resyncs_stray_draft() {
        let state = run(
            populated(),
            vec![
                Action::edit(LineItemEdit::new("a").with_selected_draft(true)),
                Action::OpenSelectionModal,
            ],
        );
        assert!(!state.catalog[0].selected_draft);
    }

    #[test]
    fn reopening_an_open_modal_keeps_draft() {
        let state = run(
            populated(),
            vec![
                Action::OpenSelectionModal,
                Action::edit(LineItemEdit::new("a").with_selected_draft(true)),
                Action::OpenSelectionModal,
            ],
        );
        assert!(state.catalog[0].selected_draft);
    }

    #[test]
    fn edit_unknown_id_is_noop() {
        let before = populated();
        let after = before
            .clone()
            .transition(Action::edit(LineItemEdit::new("zzz").with_quantity(9.0)));
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_quantity_is_ignored() {
        let state = run(
            populated(),
            vec![
                Action::edit(LineItemEdit::new("a").with_quantity(2.0)),
                Action::edit(LineItemEdit::new("a").with_quantity(f64::NAN)),
                Action::edit(LineItemEdit::new("a").with_quantity(-4.0)),
            ],
        );
        assert_eq!(state.catalog[0].quantity, 2);
    }

    #[test]
    fn posting_lifecycle_success() {
        let state = run(
            populated(),
            vec![
                Action::OpenSelectionModal,
                Action::edit(LineItemEdit::new("a").with_selected_draft(true).with_quantity(2.0)),
                Action::CommitSelectionDraft,
                Action::SubmitInvoice,
            ],
        );
        assert_eq!(state.posting_status, PostingStatus::Posting);
        let state = state.transition(Action::PostInFlight);
        assert_eq!(state.posting_status, PostingStatus::Inflight);
        let state = state.transition(Action::PostSucceeded);
        assert_eq!(state.posting_status, PostingStatus::Ready);
        assert_eq!(state.toast_status, ToastStatus::OpenedSuccess);
        assert!(state
            .catalog
            .iter()
            .all(|item| !item.selected && !item.selected_draft && item.quantity == 0));
    }

    #[test]
    fn posting_lifecycle_failure_keeps_selection() {
        let state = run(
            populated(),
            vec![
                Action::edit(LineItemEdit {
                    selected: Some(true),
                    ..LineItemEdit::new("b").with_quantity(1.0)
                }),
                Action::SubmitInvoice,
                Action::PostInFlight,
                Action::PostFailed,
            ],
        );
        assert_eq!(state.posting_status, PostingStatus::Ready);
        assert_eq!(state.toast_status, ToastStatus::OpenedFail);
        assert!(state.catalog[1].selected);
        assert_eq!(state.catalog[1].quantity, 1);
    }

    #[test]
    fn submit_while_inflight_is_noop() {
        let state = run(populated(), vec![Action::SubmitInvoice, Action::PostInFlight]);
        let again = state.clone().transition(Action::SubmitInvoice);
        assert_eq!(again, state);
    }

    #[test]
    fn results_outside_inflight_are_ignored() {
        let state = populated();
        assert_eq!(state.clone().transition(Action::PostSucceeded), state);
        assert_eq!(state.clone().transition(Action::PostFailed), state);
        assert_eq!(state.clone().transition(Action::PostInFlight), state);
    }

    #[test]
    fn close_toast() {
        let state = run(
            populated(),
            vec![
                Action::SubmitInvoice,
                Action::PostInFlight,
                Action::PostFailed,
                Action::CloseToast,
            ],
        );
        assert_eq!(state.toast_status, ToastStatus::Closed);
        assert_eq!(state.toast_status.message(), None);
    }

    #[test]
    fn unknown_action_is_contract_violation() {
        let result = Action::from_json(r#"{"type": "RESET_EVERYTHING"}"#);
        assert!(matches!(result, Err(InvoiceError::ContractViolation(_))));
    }

    #[test]
    fn actions_decode_from_tagged_json() {
        assert_eq!(
            Action::from_json(r#"{"type": "SUBMIT_INVOICE"}"#).unwrap(),
            Action::SubmitInvoice
        );
        let edit = Action::from_json(
            r#"{"type": "EDIT_LINE_ITEM", "line_item": {"id": "a", "quantity": 2}}"#,
        )
        .unwrap();
        assert_eq!(edit, Action::edit(LineItemEdit::new("a").with_quantity(2.0)));
    }

    #[test]
    fn toast_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ToastStatus::OpenedSuccess).unwrap(),
            "\"opened.success\""
        );
        assert_eq!(
            serde_json::to_string(&ToastStatus::OpenedFail).unwrap(),
            "\"opened.fail\""
        );
    }
}
