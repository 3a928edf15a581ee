//! Tests for the Argon2 hasher and JWT token adapter.

use crate::account::{
    adapters::{jwt::JwtTokenService, password::Argon2PasswordHasher},
    domain::UserId,
    ports::PasswordHasher,
};
use chrono::{Duration, Utc};
use rstest::rstest;

#[rstest]
fn argon2_hash_verifies_only_the_original_password() {
    let hasher = Argon2PasswordHasher::new();
    let hash = hasher.hash("correct horse").expect("hashing succeeds");

    assert!(hash.starts_with("$argon2"));
    assert!(hasher.verify("correct horse", &hash).expect("readable hash"));
    assert!(!hasher.verify("battery staple", &hash).expect("readable hash"));
}

#[rstest]
fn argon2_rejects_unreadable_hashes() {
    assert!(Argon2PasswordHasher::new().verify("pw", "not-a-hash").is_err());
}

#[rstest]
fn issued_token_verifies_to_its_subject() {
    let tokens = JwtTokenService::new(b"test-secret", "planboard", Duration::minutes(5));
    let user = UserId::new();
    let issued = tokens.issue(user, Utc::now()).expect("token issued");

    assert_eq!(tokens.verify(&issued.token).expect("valid token"), user);
}

#[rstest]
fn expired_tokens_are_rejected() {
    let tokens = JwtTokenService::new(b"test-secret", "planboard", Duration::minutes(5));
    let issued = tokens
        .issue(UserId::new(), Utc::now() - Duration::hours(2))
        .expect("token issued");

    assert!(tokens.verify(&issued.token).is_err());
}

#[rstest]
fn tokens_signed_with_another_secret_are_rejected() {
    let issuer = JwtTokenService::new(b"secret-one", "planboard", Duration::minutes(5));
    let verifier = JwtTokenService::new(b"secret-two", "planboard", Duration::minutes(5));
    let issued = issuer.issue(UserId::new(), Utc::now()).expect("token issued");

    assert!(verifier.verify(&issued.token).is_err());
}

#[rstest]
fn tokens_from_another_issuer_are_rejected() {
    let issuer = JwtTokenService::new(b"secret", "someone-else", Duration::minutes(5));
    let verifier = JwtTokenService::new(b"secret", "planboard", Duration::minutes(5));
    let issued = issuer.issue(UserId::new(), Utc::now()).expect("token issued");

    assert!(verifier.verify(&issued.token).is_err());
}
