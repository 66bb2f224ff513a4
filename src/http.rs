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

//! HTTP backend.
//!
//! Talks to the invoicing REST API:
//!
//! - `GET  {base}/item?sort=price&order=ASC` returns `{"data": [CatalogItem...]}`
//! - `POST {base}/invoice` accepts an [`InvoicePayload`]
//!
//! Both requests send the configured token verbatim in `Authorization`.
//! There is no timeout and no retry; a failure is reported once.

use crate::{ApiError, InvoiceError};
use crate::api::{InvoiceAck, InvoiceApi, InvoiceDefaults, InvoicePayload, InvoiceSubmission};
use crate::config::{Backend, Config};
use crate::line_item::CatalogItem;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::Deserialize;

/// Paginated catalog response; only the first page is used.
#[derive(Debug, Deserialize)]
struct CatalogPage {
    data: Vec<CatalogItem>,
}

pub struct HttpInvoiceApi {
    client: Client,
    base_url: String,
    token: String,
    defaults: InvoiceDefaults,
}

impl HttpInvoiceApi {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        defaults: InvoiceDefaults,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            defaults,
        }
    }

    /// Builds the client for an HTTP [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::InvalidConfig`] if the config selects another backend.
    pub fn from_config(config: &Config) -> Result<Self, InvoiceError> {
        match &config.backend {
            Backend::Http { base_url, token } => Ok(Self::new(
                base_url.clone(),
                token.clone(),
                config.defaults.clone(),
            )),
            Backend::Offline { .. } => Err(InvoiceError::InvalidConfig(
                "configuration does not select the HTTP backend".to_string(),
            )),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Turns a non-2xx response into [`ApiError::Status`], keeping the body for the logs.
    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl InvoiceApi for HttpInvoiceApi {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.url("item");
        tracing::debug!(%url, "fetching catalog");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.token)
            .header(ACCEPT, "application/json")
            .query(&[("sort", "price"), ("order", "ASC")])
            .send()
            .await?;
        let page: CatalogPage = Self::ensure_success(response).await?.json().await?;

        tracing::debug!(items = page.data.len(), "catalog received");
        Ok(page.data)
    }

    async fn post_invoice(&self, submission: InvoiceSubmission) -> Result<InvoiceAck, ApiError> {
        let url = self.url("invoice");
        let payload: InvoicePayload = submission.to_payload(&self.defaults);
        tracing::debug!(
            %url,
            line_items = payload.meta.line_items.len(),
            total = %payload.total,
            "posting invoice"
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &self.token)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;
        // Any 2xx counts as created; the body is only mined for an id.
        let body = Self::ensure_success(response).await?.bytes().await?;
        Ok(read_ack(&body))
    }
}

/// Reads the invoice id from a success body, if it has one.
fn read_ack(body: &[u8]) -> InvoiceAck {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "invoice created without a readable id");
        InvoiceAck::default()
    })
}
