//! Round-trip and corruption tests for user row conversion.

use super::super::repository::{escape_like, row_to_user, to_row};
use crate::account::domain::{EmailAddress, NewUser, ProfileChanges, User};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn user() -> User {
    let clock = DefaultClock;
    let mut user = User::register(
        NewUser {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            password_hash: "$argon2id$v=19$stub".to_owned(),
        },
        &clock,
    )
    .expect("valid user");
    user.apply_profile(
        ProfileChanges {
            company: Some("Analytical Engines".to_owned()),
            ..ProfileChanges::default()
        },
        &clock,
    )
    .expect("valid profile");
    user
}

#[rstest]
fn row_conversion_preserves_profile_and_login_state(user: User) {
    let restored = row_to_user(to_row(&user)).expect("row converts back");
    assert_eq!(restored, user);
    assert_eq!(restored.profile().company, "Analytical Engines");
}

#[rstest]
fn corrupted_email_is_reported_as_persistence_error(user: User) {
    let mut row = to_row(&user);
    row.email = "not-an-email".to_owned();
    assert!(row_to_user(row).is_err());
}

#[rstest]
fn like_wildcards_are_escaped() {
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
}
