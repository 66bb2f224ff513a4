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

//! Quantity edit validation.

use crate::InvoiceError;

/// Returns `true` for a finite, non-negative quantity.
pub fn is_valid_quantity(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Converts a raw quantity edit into a whole number of units.
///
/// Passes [`is_valid_quantity`] and additionally requires a whole number that
/// fits in `u32`, since money is only ever multiplied by whole quantities.
///
/// # Errors
///
/// Returns [`InvoiceError::InvalidQuantity`] when the value is rejected; callers
/// keep the previous quantity.
pub fn accept_quantity(value: f64) -> Result<u32, InvoiceError> {
    if !is_valid_quantity(value) || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(InvoiceError::InvalidQuantity(value.to_string()));
    }
    Ok(value as u32)
}
