// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Document store layer.
//!
//! Handlers talk to the store through the [`ProfileStore`] trait so tests
//! can substitute an in-memory fake; [`FirestoreStore`] is the production
//! implementation.

pub mod firestore;

pub use firestore::FirestoreStore;

use crate::error::AppError;
use crate::models::{ActivityLogEntry, Role, UserProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITY_LOGS: &str = "activity_logs";
    pub const SEARCH_QUERIES: &str = "search_queries";
}

/// Typed operations against the document store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get a user profile by uid.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Create or replace a user profile.
    async fn set_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    /// Update the stored role plus the attribution fields on an existing profile.
    async fn update_role(&self, uid: &str, role: Role, updated_by: &str) -> Result<(), AppError>;

    /// Increment the login counter and refresh last-login/last-activity.
    async fn record_login(&self, uid: &str) -> Result<(), AppError>;

    /// Append an audit entry. Entries are never mutated afterwards.
    async fn append_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), AppError>;

    /// Delete a user profile document.
    async fn delete_profile(&self, uid: &str) -> Result<(), AppError>;

    /// Delete all search-query records for an account. Returns the count.
    async fn delete_search_queries(&self, uid: &str) -> Result<usize, AppError>;

    /// Delete at most `limit` of the account's most recent audit entries.
    /// Older entries are retained. Returns the count deleted.
    async fn delete_recent_activity_logs(&self, uid: &str, limit: u32)
        -> Result<usize, AppError>;
}
