//! String-backed choice enums.

use super::FieldError;
use thiserror::Error;

/// A value is not one of the accepted choices for a field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("\"{value}\" is not a valid choice for {field}")]
pub struct ParseChoiceError {
    /// Wire name of the field.
    pub field: &'static str,
    /// Rejected raw value.
    pub value: String,
}

impl ParseChoiceError {
    /// Creates a parse error for `value`.
    #[must_use]
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}

impl From<ParseChoiceError> for FieldError {
    fn from(err: ParseChoiceError) -> Self {
        Self::new(err.field, format!("\"{}\" is not a valid choice.", err.value))
    }
}

/// Declares a `Copy` enum stored and transmitted as a fixed set of strings.
///
/// Generates `as_str`, `ALL`, `Display` and a case-insensitive
/// `TryFrom<&str>` that reports [`ParseChoiceError`] against `field`.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the canonical storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::shared::ParseChoiceError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err($crate::shared::ParseChoiceError::new($field, value)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use choice_enum;
