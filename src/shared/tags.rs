//! Comma-separated tag sets used by ideas, tasks and task templates.

use super::FieldError;
use serde::{Deserialize, Serialize};

/// Stored length limit of the joined tag string.
const MAX_TAGS_CHARS: usize = 500;

/// Ordered, case-insensitively unique set of tags.
///
/// Tags travel over the wire as a single comma-separated string and are
/// exposed alongside as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parses a comma-separated tag string.
    ///
    /// Blank segments are dropped and later duplicates (ignoring case) are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the normalised string exceeds 500
    /// characters.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, FieldError> {
        let tags = Self::from_iter_lossy(raw.split(','));
        if tags.to_csv().chars().count() > MAX_TAGS_CHARS {
            return Err(FieldError::new(
                field,
                format!("Ensure this field has no more than {MAX_TAGS_CHARS} characters."),
            ));
        }
        Ok(tags)
    }

    /// Rebuilds tags from persisted storage without length checks.
    #[must_use]
    pub fn from_persisted(raw: &str) -> Self {
        Self::from_iter_lossy(raw.split(','))
    }

    fn from_iter_lossy<'a>(items: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tags = Self::default();
        for item in items {
            tags.push(item);
        }
        tags
    }

    fn push(&mut self, item: &str) {
        let trimmed = item.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return;
        }
        self.0.push(trimmed.to_owned());
    }

    /// Returns `true` when a tag matches `needle` ignoring case.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|tag| tag.eq_ignore_ascii_case(needle.trim()))
    }

    /// Returns `true` when no tags are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the tags in insertion order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.0
    }

    /// Joins the tags into the canonical `a, b, c` wire form.
    #[must_use]
    pub fn to_csv(&self) -> String {
        self.0.join(", ")
    }

    /// Returns a copy extended with every tag of `other` not yet present.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for tag in &other.0 {
            merged.push(tag);
        }
        merged
    }

    /// Returns a copy without any tag present in `other`.
    #[must_use]
    pub fn without(&self, other: &Self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|tag| !other.contains(tag))
                .cloned()
                .collect(),
        )
    }
}
