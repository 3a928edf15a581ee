//! `#RRGGBB` display colours for topics and tags.

use super::FieldError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated hexadecimal colour in `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Parses a colour, normalising the digits to upper case.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] unless the value is `#` followed by exactly six
    /// hexadecimal digits.
    pub fn new(field: &'static str, value: &str) -> Result<Self, FieldError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or_default();
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FieldError::new(
                field,
                "Enter a valid hex colour such as #3B82F6.",
            ));
        }
        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// Builds a colour from a compile-time constant known to be valid.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns the colour as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
