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

//! Inline quantity editor of a line item row.
//!
//! ```text
//!  Reading ──Edit/Change──► Editing{input} ──Blur/Commit──► Reading (+ quantity edit)
//!                               │
//!                               └──────────Cancel─────────► Reading
//! ```
//!
//! The editor only produces [`LineItemEdit`] payloads; validation happens when
//! the resulting `EditLineItem` action reaches the state machine.

use crate::base::LineItemId;
use crate::line_item::LineItemEdit;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowStatus {
    #[default]
    Reading,
    Editing {
        input: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    /// Start editing from the current quantity.
    Edit(u32),
    /// The input text changed.
    Change(String),
    /// Focus left the input.
    Blur,
    /// Enter pressed.
    Commit,
    /// Escape pressed.
    Cancel,
}

#[derive(Debug, Clone)]
pub struct RowEditor {
    id: LineItemId,
    status: RowStatus,
}

impl RowEditor {
    pub fn new(id: impl Into<LineItemId>) -> Self {
        Self {
            id: id.into(),
            status: RowStatus::Reading,
        }
    }

    pub fn status(&self) -> &RowStatus {
        &self.status
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.status, RowStatus::Editing { .. })
    }

    /// Feeds one UI event; returns the edit to dispatch, if any.
    pub fn handle(&mut self, event: RowEvent) -> Option<LineItemEdit> {
        match event {
            RowEvent::Edit(quantity) => {
                self.status = RowStatus::Editing {
                    input: quantity.to_string(),
                };
                None
            }
            RowEvent::Change(input) => {
                self.status = RowStatus::Editing { input };
                None
            }
            RowEvent::Blur | RowEvent::Commit => match std::mem::take(&mut self.status) {
                RowStatus::Editing { input } => {
                    Some(LineItemEdit::new(self.id.clone()).with_quantity(parse_input(&input)))
                }
                RowStatus::Reading => None,
            },
            RowEvent::Cancel => {
                self.status = RowStatus::Reading;
                None
            }
        }
    }
}

/// Reads the number field; anything unparseable becomes NaN and is rejected later.
fn parse_input(input: &str) -> f64 {
    input.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_then_commit_emits_quantity() {
        let mut editor = RowEditor::new("a");
        assert_eq!(editor.handle(RowEvent::Edit(2)), None);
        assert_eq!(
            editor.status(),
            &RowStatus::Editing {
                input: "2".to_string()
            }
        );
        assert_eq!(editor.handle(RowEvent::Change("5".to_string())), None);

        let edit = editor.handle(RowEvent::Commit).unwrap();
        assert_eq!(edit.id, LineItemId::from("a"));
        assert_eq!(edit.quantity, Some(5.0));
        assert_eq!(editor.status(), &RowStatus::Reading);
    }

    #[test]
    fn blur_saves_like_commit() {
        let mut editor = RowEditor::new("a");
        editor.handle(RowEvent::Change("7".to_string()));
        let edit = editor.handle(RowEvent::Blur).unwrap();
        assert_eq!(edit.quantity, Some(7.0));
    }

    #[test]
    fn cancel_discards_input() {
        let mut editor = RowEditor::new("a");
        editor.handle(RowEvent::Edit(1));
        editor.handle(RowEvent::Change("9".to_string()));
        assert_eq!(editor.handle(RowEvent::Cancel), None);
        assert!(!editor.is_editing());
    }

    #[test]
    fn blur_while_reading_emits_nothing() {
        let mut editor = RowEditor::new("a");
        assert_eq!(editor.handle(RowEvent::Blur), None);
    }

    #[test]
    fn garbage_input_becomes_nan() {
        let mut editor = RowEditor::new("a");
        editor.handle(RowEvent::Change("lots".to_string()));
        let edit = editor.handle(RowEvent::Commit).unwrap();
        assert!(edit.quantity.is_some_and(f64::is_nan));
    }
}
