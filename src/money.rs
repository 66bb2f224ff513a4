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

//! Exact monetary amounts in integer cents.
//!
//! Catalog prices arrive as decimal literals (`"7.11"`) or JSON numbers. They
//! are parsed through [`Decimal`] and stored as a whole number of cents, so
//! every sum and product is integer arithmetic. The only non-integer step is
//! applying the sales tax rate, which rounds back to cents explicitly with
//! round-half-up.
//!
//! # Example
//!
//! ```
//! use invoice_creator::Money;
//!
//! let price = Money::from_str_amount("7.11").unwrap();
//! let total = price.checked_mul(3).unwrap();
//! assert_eq!(total.to_display_string(), "21.33");
//! ```

use crate::InvoiceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A monetary amount held as a count of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Number of fractional digits carried by an amount.
    pub const MINOR_DIGITS: u32 = 2;

    const CENTS_PER_UNIT: i64 = 100;

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Converts a decimal major-unit amount into cents.
    ///
    /// # Errors
    ///
    /// - [`InvoiceError::InvalidAmount`] - negative, or more than two significant
    ///   fractional digits.
    /// - [`InvoiceError::AmountOverflow`] - too large to hold in cents.
    pub fn from_decimal(amount: Decimal) -> Result<Self, InvoiceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(InvoiceError::InvalidAmount(amount.to_string()));
        }
        // Trailing zeros ("10.500") are not precision.
        let normalized = amount.normalize();
        if normalized.scale() > Self::MINOR_DIGITS {
            return Err(InvoiceError::InvalidAmount(amount.to_string()));
        }
        normalized
            .checked_mul(Decimal::from(Self::CENTS_PER_UNIT))
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or(InvoiceError::AmountOverflow)
    }

    /// Parses decimal text such as `"7.11"`.
    pub fn from_str_amount(text: &str) -> Result<Self, InvoiceError> {
        let amount = Decimal::from_str(text.trim())
            .map_err(|_| InvoiceError::InvalidAmount(text.to_string()))?;
        Self::from_decimal(amount)
    }

    /// Accepts a number as it arrived on the wire.
    ///
    /// The shortest round-trip rendering of the float is parsed as decimal
    /// text, so `7.11` becomes exactly 711 cents.
    pub fn from_f64(value: f64) -> Result<Self, InvoiceError> {
        if !value.is_finite() {
            return Err(InvoiceError::InvalidAmount(value.to_string()));
        }
        Self::from_str_amount(&value.to_string())
    }

    pub fn checked_add(self, other: Money) -> Result<Money, InvoiceError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(InvoiceError::AmountOverflow)
    }

    /// Multiplies by a whole quantity.
    pub fn checked_mul(self, quantity: u32) -> Result<Money, InvoiceError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or(InvoiceError::AmountOverflow)
    }

    /// Applies a rate (e.g. sales tax) and rounds to the nearest cent.
    ///
    /// Ties round half-up: 10.5 cents becomes 11 cents.
    pub fn apply_rate(self, rate: Decimal) -> Result<Money, InvoiceError> {
        Decimal::from(self.0)
            .checked_mul(rate)
            .map(|exact| exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|rounded| rounded.to_i64())
            .map(Money)
            .ok_or(InvoiceError::AmountOverflow)
    }

    /// Lossless conversion back to a major-unit decimal.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, Self::MINOR_DIGITS)
    }

    /// Renders `<major>.<minor>` with exactly two fractional digits.
    pub fn to_display_string(self) -> String {
        self.to_string()
    }
}

impl FromStr for Money {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_amount(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = InvoiceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Money::from_decimal(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_unit = Self::CENTS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:02}", abs / per_unit, abs % per_unit)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::from_str_amount(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).map_err(E::custom)
    }
}
