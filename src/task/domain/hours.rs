//! Fixed-point hour amounts with two fractional digits.

use super::ParseHoursError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Largest storable amount in hundredths (999.99 hours).
const MAX_HUNDREDTHS: u32 = 99_999;
const CENTS_PER_HOUR: u32 = 100;

/// A non-negative number of hours stored in hundredths, at most `999.99`.
///
/// Amounts travel over the wire as decimal strings such as `"2.50"`, and
/// both strings and JSON numbers are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(u32);

impl Hours {
    /// Zero hours.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from hundredths of an hour.
    ///
    /// Returns `None` above `999.99`.
    #[must_use]
    pub const fn from_hundredths(value: u32) -> Option<Self> {
        if value > MAX_HUNDREDTHS {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the amount in hundredths of an hour.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Parses a decimal such as `"3"`, `"0.5"` or `"12.75"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseHoursError`] for signs, exponents, more than two
    /// fractional digits, or values above `999.99`.
    pub fn parse(raw: &str) -> Result<Self, ParseHoursError> {
        let text = raw.trim();
        let invalid = || ParseHoursError(raw.to_owned());
        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || fraction.len() > 2
            || !digits_only(whole)
            || !digits_only(fraction)
        {
            return Err(invalid());
        }
        let hours = if whole.is_empty() {
            0
        } else {
            whole.parse::<u32>().map_err(|_| invalid())?
        };
        let cents = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<2}").parse::<u32>().map_err(|_| invalid())?
        };
        hours
            .checked_mul(CENTS_PER_HOUR)
            .and_then(|value| value.checked_add(cents))
            .and_then(Self::from_hundredths)
            .ok_or_else(invalid)
    }

    /// Adds two amounts, returning `None` above `999.99`.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Self::from_hundredths(sum),
            None => None,
        }
    }

    /// Sums amounts, returning `None` when the total exceeds `999.99`.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }
}

/// Formats a hundredths count as a two-decimal string.
///
/// Used for totals that may exceed the range of a single [`Hours`] value.
#[must_use]
pub fn format_hundredths(value: u64) -> String {
    let cents = u64::from(CENTS_PER_HOUR);
    format!("{}.{:02}", value.div_euclid(cents), value.rem_euclid(cents))
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hundredths(u64::from(self.0)))
    }
}

impl TryFrom<&str> for Hours {
    type Error = ParseHoursError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HoursVisitor)
    }
}

struct HoursVisitor;

impl Visitor<'_> for HoursVisitor {
    type Value = Hours;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number of hours between 0 and 999.99")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Hours, E> {
        Hours::parse(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Hours, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Hours, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Hours, E> {
        self.visit_str(&value.to_string())
    }
}
