//! Tests for free-text, URL and colour validation.

use crate::shared::{HexColor, optional_text, required_text, web_url};
use rstest::rstest;

#[rstest]
fn required_text_trims_surrounding_whitespace() {
    let value = required_text("title", "  Launch plan  ", 200).expect("valid title");
    assert_eq!(value, "Launch plan");
}

#[rstest]
#[case("")]
#[case("   ")]
fn required_text_rejects_blank_input(#[case] raw: &str) {
    let err = required_text("title", raw, 200).expect_err("blank title must fail");
    assert_eq!(err.field, "title");
}

#[rstest]
fn optional_text_enforces_character_limit() {
    let long = "é".repeat(11);
    let err = optional_text("phone", long, 10).expect_err("over-long value must fail");
    assert!(err.message.contains("10 characters"));
    assert_eq!(optional_text("phone", "", 10).expect("blank is allowed"), "");
}

#[rstest]
#[case("https://example.com")]
#[case("http://example.com/path?q=1")]
fn web_url_accepts_absolute_http_urls(#[case] raw: &str) {
    assert_eq!(web_url("url", raw).expect("valid url"), raw);
}

#[rstest]
#[case("example.com")]
#[case("ftp://example.com")]
#[case("https://")]
#[case("https://exa mple.com")]
fn web_url_rejects_malformed_values(#[case] raw: &str) {
    assert!(web_url("url", raw).is_err());
}

#[rstest]
fn hex_color_normalises_case() {
    let color = HexColor::new("color", "#3b82f6").expect("valid colour");
    assert_eq!(color.as_str(), "#3B82F6");
}

#[rstest]
#[case("3B82F6")]
#[case("#3B82F")]
#[case("#GGGGGG")]
fn hex_color_rejects_invalid_values(#[case] raw: &str) {
    assert!(HexColor::new("color", raw).is_err());
}
