// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! AssignRole operation tests, through the full router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use sijill_roles::config::VerifyRolePolicy;
use sijill_roles::models::{ActivityAction, Role, RoleClaims};
use tower::ServiceExt;

mod common;

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admin_assigns_moderator() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "admin1", Role::Admin);
    common::seed_account(&store, &identity, "u1", Role::User);

    let token = common::test_token("admin1");
    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "u1", "role": "moderator"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "moderator");
    assert_eq!(body["uid"], "u1");

    // Stored role updated with attribution
    let profile = store.profile("u1").unwrap();
    assert_eq!(profile.role, Role::Moderator);
    assert_eq!(profile.role_updated_by.as_deref(), Some("admin1"));
    assert!(profile.role_updated_at.is_some());

    // Claim-role set (role only; flags come from reconciliation)
    assert_eq!(
        identity.claims("u1").unwrap(),
        RoleClaims::role_only(Role::Moderator)
    );

    // Audit entry appended
    let logs = store.log_entries();
    let entry = logs
        .iter()
        .find(|e| e.action == ActivityAction::SetUserRole)
        .expect("set_user_role entry");
    assert_eq!(entry.user_id, "admin1");
    assert_eq!(entry.target_user_id.as_deref(), Some("u1"));
    assert_eq!(entry.new_role, Role::Moderator);
}

#[tokio::test]
async fn test_assign_then_verify_reports_moderator() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "admin1", Role::Admin);
    common::seed_account(&store, &identity, "u1", Role::User);

    let token = common::test_token("admin1");
    let response = app
        .clone()
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "u1", "role": "moderator"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            "/functions/verify-role",
            Some(&token),
            json!({"targetUid": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["role"], "moderator");
    assert_eq!(body["isModerator"], true);
    assert_eq!(body["isAdmin"], false);
}

#[tokio::test]
async fn test_unknown_target_reports_internal() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "admin1", Role::Admin);

    // The target passed validation (non-empty uid, known role) but has no
    // identity account; that failure is infrastructure-shaped, not a
    // caller error the admin panel should branch on.
    let token = common::test_token("admin1");
    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "no-such-user", "role": "moderator"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal");

    // Nothing was stored or audited for the phantom account.
    assert!(store.profile("no-such-user").is_none());
    assert!(store.log_entries().is_empty());
}

#[tokio::test]
async fn test_non_admin_requester_denied() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "mod1", Role::Moderator);
    common::seed_account(&store, &identity, "u1", Role::User);

    let token = common::test_token("mod1");
    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "u1", "role": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "permission_denied");

    // Target unchanged in both stores
    assert_eq!(store.profile("u1").unwrap().role, Role::User);
    assert_eq!(
        identity.claims("u1").unwrap(),
        RoleClaims::role_only(Role::User)
    );
    assert!(store.log_entries().is_empty());
}

#[tokio::test]
async fn test_requester_without_profile_denied() {
    // A caller with an identity but no stored profile defaults to role user.
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    identity.insert_account(common::identity_record("ghost", "ghost@example.com"));
    common::seed_account(&store, &identity, "u1", Role::User);

    let token = common::test_token("ghost");
    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "u1", "role": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "admin1", Role::Admin);

    let token = common::test_token("admin1");

    for body in [json!({}), json!({"uid": "u1"}), json!({"role": "admin"})] {
        let response = app
            .clone()
            .oneshot(post_json("/functions/assign-role", Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "admin1", Role::Admin);
    common::seed_account(&store, &identity, "u1", Role::User);

    let token = common::test_token("admin1");
    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            Some(&token),
            json!({"uid": "u1", "role": "superuser"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_argument");
    assert_eq!(store.profile("u1").unwrap().role, Role::User);
}

#[tokio::test]
async fn test_unauthenticated_call_mutates_nothing() {
    let (app, store, identity) = common::create_test_app(VerifyRolePolicy::AnyAuthenticated);
    common::seed_account(&store, &identity, "u1", Role::User);

    let response = app
        .oneshot(post_json(
            "/functions/assign-role",
            None,
            json!({"uid": "u1", "role": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.profile("u1").unwrap().role, Role::User);
    assert!(store.log_entries().is_empty());
}
