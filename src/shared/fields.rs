//! Free-text field validation shared by the domain constructors.

use thiserror::Error;

/// A single field failed validation.
///
/// The field name is the wire name used in request payloads so the HTTP
/// layer can report the failure against the offending key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Wire name of the rejected field.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trims `value` and rejects it when blank or longer than `max_chars`.
///
/// # Errors
///
/// Returns [`FieldError`] for blank or oversized input.
pub fn required_text(
    field: &'static str,
    value: impl Into<String>,
    max_chars: usize,
) -> Result<String, FieldError> {
    let text = optional_text(field, value, max_chars)?;
    if text.is_empty() {
        return Err(FieldError::new(field, "This field may not be blank."));
    }
    Ok(text)
}

/// Trims `value`, allowing blank input but enforcing `max_chars`.
///
/// # Errors
///
/// Returns [`FieldError`] when the trimmed text is too long.
pub fn optional_text(
    field: &'static str,
    value: impl Into<String>,
    max_chars: usize,
) -> Result<String, FieldError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.chars().count() > max_chars {
        return Err(FieldError::new(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Maximum length of a stored URL.
const MAX_URL_CHARS: usize = 200;

/// Validates an absolute `http` or `https` URL.
///
/// # Errors
///
/// Returns [`FieldError`] when the scheme is missing, the host is empty, the
/// value contains whitespace, or it exceeds 200 characters.
pub fn web_url(field: &'static str, value: impl Into<String>) -> Result<String, FieldError> {
    let url = required_text(field, value, MAX_URL_CHARS)?;
    let remainder = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    let host = remainder
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .unwrap_or_default();
    if host.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(FieldError::new(field, "Enter a valid URL."));
    }
    Ok(url)
}
