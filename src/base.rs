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

//! Core identifier types.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier of a catalog line item.
///
/// The backend issues opaque identifiers; the engine only compares them.
/// Numeric identifiers are accepted on input and kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LineItemId(pub String);

impl LineItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        LineItemId(id.to_string())
    }
}

impl From<String> for LineItemId {
    fn from(id: String) -> Self {
        LineItemId(id)
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for LineItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LineItemIdVisitor)
    }
}

struct LineItemIdVisitor;

impl Visitor<'_> for LineItemIdVisitor {
    type Value = LineItemId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LineItemId, E> {
        Ok(LineItemId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LineItemId, E> {
        Ok(LineItemId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LineItemId, E> {
        Ok(LineItemId(v.to_string()))
    }
}
