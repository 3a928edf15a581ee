//! Tests for the generated choice enums.

use crate::shared::{FieldError, ParseChoiceError};
use rstest::rstest;

crate::shared::choice_enum! {
    /// Sample enum used only by these tests.
    Flavour, field = "flavour" {
        /// Vanilla.
        Vanilla => "vanilla",
        /// Salted caramel.
        SaltedCaramel => "salted_caramel",
    }
}

#[rstest]
fn parses_case_insensitively_and_round_trips() {
    assert_eq!(Flavour::try_from(" Salted_Caramel "), Ok(Flavour::SaltedCaramel));
    assert_eq!(Flavour::SaltedCaramel.as_str(), "salted_caramel");
    assert_eq!(Flavour::ALL.len(), 2);
}

#[rstest]
fn unknown_values_become_field_errors() {
    let err = Flavour::try_from("mint").expect_err("mint is not offered");
    assert_eq!(err, ParseChoiceError::new("flavour", "mint"));

    let field: FieldError = err.into();
    assert_eq!(field.field, "flavour");
    assert_eq!(field.message, "\"mint\" is not a valid choice.");
}

#[rstest]
fn serde_uses_wire_names() {
    let json = serde_json::to_string(&Flavour::SaltedCaramel).expect("serialises");
    assert_eq!(json, "\"salted_caramel\"");
}
