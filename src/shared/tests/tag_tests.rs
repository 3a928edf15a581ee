//! Tests for comma-separated tag handling.

use crate::shared::Tags;
use rstest::rstest;

#[rstest]
fn parse_drops_blanks_and_case_insensitive_duplicates() {
    let tags = Tags::parse("tags", " rust, api,, Rust ,backend ").expect("valid tags");
    assert_eq!(tags.items(), ["rust", "api", "backend"]);
    assert_eq!(tags.to_csv(), "rust, api, backend");
}

#[rstest]
fn parse_rejects_oversized_tag_strings() {
    let raw = "x".repeat(501);
    assert!(Tags::parse("tags", &raw).is_err());
}

#[rstest]
fn merged_and_without_keep_order() {
    let base = Tags::from_persisted("alpha, beta");
    let extra = Tags::from_persisted("BETA, gamma");

    assert_eq!(base.merged(&extra).items(), ["alpha", "beta", "gamma"]);
    assert_eq!(base.without(&extra).items(), ["alpha"]);
}
