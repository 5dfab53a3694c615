// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Firestore store integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set) and are skipped otherwise. They cover
//! the write shapes the in-memory fake cannot: field-masked partial
//! updates and the server-side login counter increment.

use sijill_roles::db::{FirestoreStore, ProfileStore};
use sijill_roles::models::{Role, UserProfile};

mod common;

fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

async fn test_store() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[tokio::test]
async fn test_role_update_touches_only_role_fields() {
    require_emulator!();

    let store = test_store().await;
    let uid = unique_uid("mask");

    let mut profile = UserProfile::for_new_account(&uid, "mask@example.com", "Masked", false);
    profile.stats.total_logins = 3;
    store.set_profile(&profile).await.unwrap();

    store
        .update_role(&uid, Role::Moderator, "admin1")
        .await
        .unwrap();

    let stored = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Moderator);
    assert_eq!(stored.role_updated_by.as_deref(), Some("admin1"));
    assert!(stored.role_updated_at.is_some());
    // Everything outside the mask is untouched.
    assert_eq!(stored.stats.total_logins, 3);
    assert_eq!(stored.email, "mask@example.com");
    assert_eq!(stored.display_name, "Masked");
}

#[tokio::test]
async fn test_login_stamp_increments_counter_server_side() {
    require_emulator!();

    let store = test_store().await;
    let uid = unique_uid("login");

    let profile = UserProfile::for_new_account(&uid, "login@example.com", "Login", false);
    store.set_profile(&profile).await.unwrap();

    store.record_login(&uid).await.unwrap();
    store.record_login(&uid).await.unwrap();

    let stored = store.get_profile(&uid).await.unwrap().unwrap();
    // for_new_account starts at 1; two logins land on top of it.
    assert_eq!(stored.stats.total_logins, 3);
    assert!(!stored.last_login.is_empty());
    assert_eq!(stored.role, Role::User);
}

#[tokio::test]
async fn test_login_stamp_racing_role_update_loses_nothing() {
    require_emulator!();

    let store = test_store().await;
    let uid = unique_uid("race");

    let mut profile = UserProfile::for_new_account(&uid, "race@example.com", "Race", false);
    profile.stats.total_logins = 0;
    store.set_profile(&profile).await.unwrap();

    // Login stamps land concurrently with role changes; both writes are
    // field-masked, so neither side can revert the other's fields no
    // matter how they interleave.
    for round in 0..5u32 {
        let role = if round % 2 == 0 {
            Role::Moderator
        } else {
            Role::Admin
        };
        let (login, update) = tokio::join!(
            store.record_login(&uid),
            store.update_role(&uid, role, "admin1")
        );
        login.unwrap();
        update.unwrap();
    }

    let stored = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(stored.stats.total_logins, 5);
    assert_eq!(stored.role, Role::Moderator);
    assert_eq!(stored.role_updated_by.as_deref(), Some("admin1"));
}

#[tokio::test]
async fn test_partial_updates_require_existing_profile() {
    require_emulator!();

    let store = test_store().await;
    let uid = unique_uid("ghost");

    // Neither write may conjure a fragment document for an account that
    // has no profile.
    assert!(store.update_role(&uid, Role::Admin, "admin1").await.is_err());
    assert!(store.record_login(&uid).await.is_err());
    assert!(store.get_profile(&uid).await.unwrap().is_none());
}
