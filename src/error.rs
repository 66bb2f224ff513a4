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

//! Error types for invoice creation.

use thiserror::Error;

/// Invoice engine errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    /// Amount is not a non-negative decimal with at most two fractional digits
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Cents arithmetic left the representable range
    #[error("amount overflow")]
    AmountOverflow,

    /// Quantity edit rejected by the validator
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Catalog could not be loaded
    #[error("catalog fetch failed: {0}")]
    Fetch(ApiError),

    /// Invoice could not be posted
    #[error("invoice submission failed: {0}")]
    Submit(ApiError),

    /// An action outside the action table was dispatched
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// Configuration rejected at startup
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures reported by an invoice backend.
///
/// All variants collapse into a single failure toast; they stay distinct so
/// the logs can tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered outside the 2xx range
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request was sent but no response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// The request could not be built
    #[error("request setup error: {0}")]
    Request(String),

    /// The response body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// The backend was configured to refuse the call
    #[error("rejected: {0}")]
    Rejected(String),

    /// The call's task ended without producing a result
    #[error("backend call aborted: {0}")]
    Aborted(String),
}

impl ApiError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Request(_) => "request",
            Self::Decode(_) => "decode",
            Self::Rejected(_) => "rejected",
            Self::Aborted(_) => "aborted",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
