//! End-to-end login lockout behavior over the in-memory backend and a
//! settable clock.

use std::sync::Arc;

use chrono::{Duration, Utc};

use lifeline::Lifeline;
use lifeline_core::{
    Error, JwtConfig,
    clock::FixedClock,
    error::AuthError,
    repositories::MemoryRepositoryProvider,
    services::{LockoutConfig, UserUpdate},
    user::UserStatus,
};

const PASSWORD: &str = "correct-horse-battery";

fn lifeline() -> (Lifeline<MemoryRepositoryProvider>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let lifeline = Lifeline::with_options(
        Arc::new(MemoryRepositoryProvider::new()),
        JwtConfig::new(b"integration-test-secret-not-for-production".to_vec()),
        LockoutConfig::default(),
        clock.clone(),
    )
    .unwrap();
    (lifeline, clock)
}

fn assert_invalid_credentials(err: Error) {
    assert!(
        matches!(err, Error::Auth(AuthError::InvalidCredentials)),
        "expected InvalidCredentials, got {err:?}"
    );
}

fn assert_locked(err: Error) {
    assert!(
        matches!(err, Error::Auth(AuthError::AccountLocked { .. })),
        "expected AccountLocked, got {err:?}"
    );
}

#[tokio::test]
async fn five_failures_lock_the_account_before_password_comparison() {
    let (lifeline, clock) = lifeline();

    lifeline
        .register("Casey", "User@Test.com ", PASSWORD, None)
        .await
        .unwrap();

    // Four wrong passwords: plain credential errors.
    for variant in [
        "User@Test.com ",
        "user@test.com",
        " USER@TEST.COM",
        "User@test.Com",
    ] {
        let err = lifeline.login(variant, "wrong-password").await.unwrap_err();
        assert_invalid_credentials(err);
    }

    // The fifth failure crosses the threshold and answers with the lockout.
    let err = lifeline
        .login("user@test.com", "wrong-password")
        .await
        .unwrap_err();
    assert_locked(err);

    // Sixth attempt with the CORRECT password, in yet another case/whitespace
    // variant: still rejected, which proves the short-circuit happens before
    // any credential verification.
    let err = lifeline
        .login("  user@TEST.com", PASSWORD)
        .await
        .unwrap_err();
    assert_locked(err);

    // After the lockout window passes, the same credentials go through.
    clock.advance(Duration::minutes(15) + Duration::seconds(1));
    let success = lifeline.login("User@Test.com ", PASSWORD).await.unwrap();
    assert_eq!(success.user.email, "user@test.com");
    assert!(!success.token.is_empty());
}

#[tokio::test]
async fn successful_login_resets_the_failure_count() {
    let (lifeline, _clock) = lifeline();

    lifeline
        .register("Casey", "casey@example.com", PASSWORD, None)
        .await
        .unwrap();

    for _ in 0..4 {
        let err = lifeline
            .login("casey@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert_invalid_credentials(err);
    }

    lifeline.login("casey@example.com", PASSWORD).await.unwrap();

    // The slate is clean: four more failures still do not lock.
    for _ in 0..4 {
        let err = lifeline
            .login("casey@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert_invalid_credentials(err);
    }
    lifeline.login("casey@example.com", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn expired_lock_starts_a_fresh_counting_window() {
    let (lifeline, clock) = lifeline();

    lifeline
        .register("Casey", "casey@example.com", PASSWORD, None)
        .await
        .unwrap();

    for _ in 0..5 {
        let _ = lifeline.login("casey@example.com", "wrong-password").await;
    }
    assert_locked(
        lifeline
            .login("casey@example.com", PASSWORD)
            .await
            .unwrap_err(),
    );

    clock.advance(Duration::minutes(16));

    // One failure after expiry is failure number one, not number six.
    assert_invalid_credentials(
        lifeline
            .login("casey@example.com", "wrong-password")
            .await
            .unwrap_err(),
    );
    lifeline.login("casey@example.com", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn inactive_account_is_rejected_after_verification() {
    let (lifeline, _clock) = lifeline();

    let registered = lifeline
        .register("Casey", "casey@example.com", PASSWORD, None)
        .await
        .unwrap();

    lifeline
        .update_user(
            &registered.user.id,
            UserUpdate {
                status: Some(UserStatus::Inactive),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();

    let err = lifeline
        .login("casey@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::AccountInactive)));

    // A wrong password against an inactive account is still a credential
    // failure, and counts toward the lockout.
    let err = lifeline
        .login("casey@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_invalid_credentials(err);
}

#[tokio::test]
async fn token_round_trips_to_the_current_user() {
    let (lifeline, _clock) = lifeline();

    let registered = lifeline
        .register("Casey", "casey@example.com", PASSWORD, None)
        .await
        .unwrap();

    let user = lifeline.current_user(&registered.token).await.unwrap();
    assert_eq!(user.id, registered.user.id);

    assert!(lifeline.current_user("garbage-token").await.is_err());
}
