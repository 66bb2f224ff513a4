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

//! Runtime configuration.
//!
//! The binary fills a [`Config`] from command-line flags and environment
//! variables; the library only consumes the validated result.

use crate::InvoiceError;
use crate::api::InvoiceDefaults;
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://apidemo.fattlabs.com/";
pub const DEFAULT_CUSTOMER_ID: &str = "03fd1f84-be3f-48ac-b460-2ad4bcc0689f";
pub const DEFAULT_INVOICE_URL: &str = "https://omni.fattmerchant.com/#/bill/";

/// Where the catalog comes from and where invoices go.
#[derive(Clone, PartialEq, Eq)]
pub enum Backend {
    Http { base_url: String, token: String },
    Offline { catalog: PathBuf, fail_posts: bool },
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Http { base_url, .. } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("token", &"<redacted>")
                .finish(),
            Backend::Offline {
                catalog,
                fail_posts,
            } => f
                .debug_struct("Offline")
                .field("catalog", catalog)
                .field("fail_posts", fail_posts)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub tax_rate: Decimal,
    pub defaults: InvoiceDefaults,
}

impl Config {
    /// Checks values that flag parsing cannot.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::InvalidConfig`] for a tax rate outside `[0, 1]`,
    /// an HTTP backend without a token or base URL, or an empty customer id.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(InvoiceError::InvalidConfig(format!(
                "tax rate {} is outside [0, 1]",
                self.tax_rate
            )));
        }
        if self.defaults.customer_id.trim().is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "customer id must not be empty".to_string(),
            ));
        }
        if let Backend::Http { base_url, token } = &self.backend {
            if base_url.trim().is_empty() {
                return Err(InvoiceError::InvalidConfig(
                    "API base URL must not be empty".to_string(),
                ));
            }
            if token.trim().is_empty() {
                return Err(InvoiceError::InvalidConfig(
                    "API token is required for the HTTP backend".to_string(),
                ));
            }
        }
        Ok(())
    }
}
