//! Value types shared by every bounded context.
//!
//! Identifiers, validated free-text fields, comma-separated tag sets, choice
//! enums and display colours appear in projects, ideas and tasks alike, so
//! they live here rather than in any single domain.

mod choice;
mod color;
mod fields;
mod ids;
mod tags;

pub(crate) use choice::choice_enum;
pub use choice::ParseChoiceError;
pub use color::HexColor;
pub use fields::{FieldError, optional_text, required_text, web_url};
pub(crate) use ids::uuid_id;
pub use tags::Tags;

#[cfg(test)]
mod tests;
