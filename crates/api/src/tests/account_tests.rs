// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for account registration, creation, and session authentication.

use super::helpers::{create_admin, create_rider, create_test_persistence};
use crate::auth::AuthenticationService;
use crate::error::{ApiError, AuthError};
use crate::handlers::{change_password, create_account, register_account};
use crate::request_response::{
    ChangePasswordRequest, CreateAccountRequest, RegisterAccountRequest,
};
use rideline_domain::Role;

fn register_request(username: &str) -> RegisterAccountRequest {
    RegisterAccountRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: String::from("Horse-Battery-7!"),
        password_confirmation: String::from("Horse-Battery-7!"),
    }
}

#[test]
fn test_register_account_creates_rider() {
    let mut persistence = create_test_persistence();

    let response = register_account(&mut persistence, register_request("Ann")).unwrap();

    assert_eq!(response.username, "ann");

    let account = persistence
        .get_account_by_username("ann")
        .unwrap()
        .expect("account should exist");
    assert_eq!(account.role, "rider");
}

#[test]
fn test_register_account_rejects_taken_username() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();

    // Same name in different case collides with the stored lowercase form.
    let result = register_account(&mut persistence, register_request("ANN"));

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "username"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_register_account_enforces_password_policy() {
    let mut persistence = create_test_persistence();
    let mut request = register_request("ann");
    request.password = String::from("short");
    request.password_confirmation = String::from("short");

    let result = register_account(&mut persistence, request);

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}

#[test]
fn test_register_account_rejects_malformed_email() {
    let mut persistence = create_test_persistence();
    let mut request = register_request("ann");
    request.email = String::from("not-an-email");

    let result = register_account(&mut persistence, request);

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "email"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_create_account_with_role_requires_admin() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");

    let request = CreateAccountRequest {
        username: String::from("driver_one"),
        email: String::from("driver_one@example.com"),
        password: String::from("Horse-Battery-7!"),
        role: String::from("driver"),
    };

    let response = create_account(&mut persistence, request.clone(), &admin).unwrap();
    assert_eq!(response.role, "driver");

    let mut request = request;
    request.username = String::from("driver_two");
    request.email = String::from("driver_two@example.com");
    let result = create_account(&mut persistence, request, &rider);
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_create_account_rejects_unknown_role() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);

    let request = CreateAccountRequest {
        username: String::from("driver_one"),
        email: String::from("driver_one@example.com"),
        password: String::from("Horse-Battery-7!"),
        role: String::from("superuser"),
    };

    let result = create_account(&mut persistence, request, &admin);
    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "role"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_login_round_trip() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();

    let (token, actor) =
        AuthenticationService::login(&mut persistence, "ANN", "Horse-Battery-7!").unwrap();

    assert_eq!(actor.username, "ann");
    assert_eq!(actor.role, Role::Rider);

    let validated = AuthenticationService::validate_session(&mut persistence, &token).unwrap();
    assert_eq!(validated.user_id, actor.user_id);
    assert_eq!(validated.role, Role::Rider);
}

#[test]
fn test_login_rejects_wrong_password_without_leaking_existence() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();

    let wrong_password = AuthenticationService::login(&mut persistence, "ann", "wrong");
    let unknown_user = AuthenticationService::login(&mut persistence, "ghost", "wrong");

    // Both failures carry the same message.
    match (wrong_password, unknown_user) {
        (
            Err(AuthError::AuthenticationFailed { reason: a }),
            Err(AuthError::AuthenticationFailed { reason: b }),
        ) => assert_eq!(a, b),
        other => panic!("Expected matching authentication failures, got {other:?}"),
    }
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();
    let (token, _) =
        AuthenticationService::login(&mut persistence, "ann", "Horse-Battery-7!").unwrap();

    AuthenticationService::logout(&mut persistence, &token).unwrap();

    let result = AuthenticationService::validate_session(&mut persistence, &token);
    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_change_password_replaces_hash_and_invalidates_sessions() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();
    let (token, actor) =
        AuthenticationService::login(&mut persistence, "ann", "Horse-Battery-7!").unwrap();

    change_password(
        &mut persistence,
        ChangePasswordRequest {
            current_password: String::from("Horse-Battery-7!"),
            new_password: String::from("New-Secret-99!"),
            new_password_confirmation: String::from("New-Secret-99!"),
        },
        &actor,
    )
    .unwrap();

    // The old session is gone and only the new password logs in.
    assert!(AuthenticationService::validate_session(&mut persistence, &token).is_err());
    assert!(AuthenticationService::login(&mut persistence, "ann", "Horse-Battery-7!").is_err());
    assert!(AuthenticationService::login(&mut persistence, "ann", "New-Secret-99!").is_ok());
}

#[test]
fn test_change_password_requires_current_password() {
    let mut persistence = create_test_persistence();
    register_account(&mut persistence, register_request("ann")).unwrap();
    let (_, actor) =
        AuthenticationService::login(&mut persistence, "ann", "Horse-Battery-7!").unwrap();

    let result = change_password(
        &mut persistence,
        ChangePasswordRequest {
            current_password: String::from("wrong"),
            new_password: String::from("New-Secret-99!"),
            new_password_confirmation: String::from("New-Secret-99!"),
        },
        &actor,
    );

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_expired_session_is_rejected() {
    let mut persistence = create_test_persistence();
    let actor = create_rider(&mut persistence, "ann");

    // Session that expired long ago.
    persistence
        .create_session(
            "stale-token",
            actor.user_id,
            "2025-01-01T00:00:00.000000000Z",
            "2025-02-01T00:00:00.000000000Z",
        )
        .unwrap();

    let result = AuthenticationService::validate_session(&mut persistence, "stale-token");
    match result {
        Err(AuthError::AuthenticationFailed { reason }) => {
            assert!(reason.contains("expired"), "unexpected reason: {reason}");
        }
        other => panic!("Expected AuthenticationFailed, got {other:?}"),
    }
}
