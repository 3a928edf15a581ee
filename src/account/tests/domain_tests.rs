//! Domain tests for email normalisation and profile updates.

use crate::account::domain::{
    AccountDomainError, EmailAddress, NewUser, ProfileChanges, User, check_new_password,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn new_user(first_name: &str) -> NewUser {
    NewUser {
        email: EmailAddress::new("grace@example.com").expect("valid email"),
        first_name: first_name.to_owned(),
        last_name: "Hopper".to_owned(),
        password_hash: "hash".to_owned(),
    }
}

#[rstest]
fn email_is_trimmed_and_lowercased() {
    let email = EmailAddress::new("  Grace@Example.COM ").expect("valid email");
    assert_eq!(email.as_str(), "grace@example.com");
}

#[rstest]
#[case("grace")]
#[case("grace@")]
#[case("@example.com")]
#[case("grace@example")]
#[case("grace hopper@example.com")]
#[case("a@b@example.com")]
fn malformed_emails_are_rejected(#[case] raw: &str) {
    assert!(matches!(
        EmailAddress::new(raw),
        Err(AccountDomainError::InvalidEmail(_))
    ));
}

#[rstest]
fn password_policy_checks_length_before_confirmation() {
    assert_eq!(
        check_new_password("short", "other"),
        Err(AccountDomainError::PasswordTooShort(8))
    );
    assert_eq!(
        check_new_password("long enough", "long enougH"),
        Err(AccountDomainError::PasswordMismatch)
    );
    assert_eq!(check_new_password("long enough", "long enough"), Ok(()));
}

#[rstest]
fn register_requires_names(clock: DefaultClock) {
    let result = User::register(new_user("   "), &clock);
    assert!(matches!(result, Err(AccountDomainError::Field(err)) if err.field == "first_name"));
}

#[rstest]
fn register_starts_active_without_login(clock: DefaultClock) {
    let user = User::register(new_user("Grace"), &clock).expect("valid user");
    assert!(user.is_active());
    assert!(user.last_login().is_none());
    assert_eq!(user.display_name(), "Grace Hopper");
}

#[rstest]
fn invalid_profile_change_leaves_user_untouched(clock: DefaultClock) {
    let mut user = User::register(new_user("Grace"), &clock).expect("valid user");
    let before = user.clone();
    let result = user.apply_profile(
        ProfileChanges {
            bio: Some("Compiler pioneer".to_owned()),
            phone: Some("0".repeat(21)),
            ..ProfileChanges::default()
        },
        &clock,
    );

    assert!(result.is_err());
    assert_eq!(user, before);
}

#[rstest]
fn debug_output_omits_password_hash(clock: DefaultClock) {
    let user = User::register(new_user("Grace"), &clock).expect("valid user");
    assert!(!format!("{user:?}").contains("hash"));
}
