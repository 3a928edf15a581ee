//! Service orchestration tests for registration, sign-in and search.

use std::sync::Arc;

use super::support::PlainHasher;
use crate::account::{
    adapters::memory::InMemoryUserRepository,
    domain::{AccountDomainError, ProfileChanges},
    services::{AccountService, AccountServiceError, RegisterRequest},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = AccountService<InMemoryUserRepository, PlainHasher, DefaultClock>;

#[fixture]
fn service() -> TestService {
    AccountService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(PlainHasher),
        Arc::new(DefaultClock),
    )
}

async fn register(service: &TestService, email: &str, first: &str, last: &str) {
    service
        .register(RegisterRequest::new(email, first, last, "s3cret-pass"))
        .await
        .expect("registration succeeds");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_then_authenticate_records_login(service: TestService) {
    register(&service, "Ada@Example.com", "Ada", "Lovelace").await;

    let user = service
        .authenticate("ada@example.com", "s3cret-pass")
        .await
        .expect("sign-in succeeds");

    assert_eq!(user.email().as_str(), "ada@example.com");
    assert!(user.last_login().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_taken_email(service: TestService) {
    register(&service, "ada@example.com", "Ada", "Lovelace").await;

    let result = service
        .register(RegisterRequest::new(
            "ADA@example.com",
            "Ada",
            "Byron",
            "another-pass",
        ))
        .await;

    assert!(matches!(result, Err(AccountServiceError::EmailTaken(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_mismatched_confirmation(service: TestService) {
    let result = service
        .register(
            RegisterRequest::new("ada@example.com", "Ada", "Lovelace", "s3cret-pass")
                .with_confirmation("s3cret-pasS"),
        )
        .await;

    assert!(matches!(
        result,
        Err(AccountServiceError::Domain(
            AccountDomainError::PasswordMismatch
        ))
    ));
}

#[rstest]
#[case("ada@example.com", "wrong-password")]
#[case("nobody@example.com", "s3cret-pass")]
#[case("not an email", "s3cret-pass")]
#[tokio::test(flavor = "multi_thread")]
async fn authenticate_hides_which_credential_failed(
    service: TestService,
    #[case] email: &str,
    #[case] password: &str,
) {
    register(&service, "ada@example.com", "Ada", "Lovelace").await;

    let result = service.authenticate(email, password).await;

    assert!(matches!(result, Err(AccountServiceError::InvalidCredentials)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_needs_two_characters_and_excludes_caller(service: TestService) {
    register(&service, "ada@example.com", "Ada", "Lovelace").await;
    register(&service, "adam@example.com", "Adam", "Smith").await;
    let caller = service
        .find_by_email("ada@example.com")
        .await
        .expect("lookup succeeds")
        .expect("caller exists");

    let short = service.search(caller.id(), "a").await.expect("search runs");
    let found = service.search(caller.id(), "AD").await.expect("search runs");

    assert!(short.is_empty());
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().map(|user| user.email.as_str()), Some("adam@example.com"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_profile_persists_changes(service: TestService) {
    register(&service, "ada@example.com", "Ada", "Lovelace").await;
    let user = service
        .find_by_email("ada@example.com")
        .await
        .expect("lookup succeeds")
        .expect("user exists");

    service
        .update_profile(
            user.id(),
            ProfileChanges {
                location: Some("London".to_owned()),
                ..ProfileChanges::default()
            },
        )
        .await
        .expect("update succeeds");

    let reloaded = service.get(user.id()).await.expect("user exists");
    assert_eq!(reloaded.profile().location, "London");
}
