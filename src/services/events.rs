// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Account lifecycle event handlers.
//!
//! These mirror the platform's fire-and-forget triggers: nothing awaits
//! their result, so failures are logged and reported as a [`BestEffort`]
//! outcome instead of propagating. The profile-changed handler is the
//! reconciliation path that copies a changed stored role back into the
//! identity provider's claims.

use crate::db::ProfileStore;
use crate::error::AppError;
use crate::identity::IdentityProvider;
use crate::models::{ActivityLogEntry, Role, RoleClaims, UserProfile};
use serde::Deserialize;
use std::sync::Arc;

/// On account deletion, only this many of the most recent audit entries are
/// removed; older ones are retained to keep deletion cost bounded.
pub const RECENT_LOG_CLEANUP_LIMIT: u32 = 100;

/// Outcome of a fire-and-forget handler.
///
/// `Logged` means the handler failed, the failure went to the log, and no
/// caller will ever see an error. Tests assert on this instead of silence.
#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort {
    Completed,
    Logged(String),
}

impl BestEffort {
    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffort::Completed)
    }

    fn from_result(result: Result<(), AppError>, context: &str) -> Self {
        match result {
            Ok(()) => BestEffort::Completed,
            Err(e) => {
                tracing::error!(error = %e, context, "Trigger handler failed");
                BestEffort::Logged(e.to_string())
            }
        }
    }
}

/// Lifecycle event dispatch target.
///
/// A thin HTTP adapter (`routes::events`) feeds platform trigger payloads
/// into these methods; tests call them directly with constructed events.
#[derive(Clone)]
pub struct AccountEvents {
    store: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountEvents {
    pub fn new(store: Arc<dyn ProfileStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// A new identity was created upstream.
    ///
    /// Creates the default profile if none exists (idempotent), then always
    /// counts the login and refreshes the activity timestamps.
    pub async fn on_account_created(&self, event: AccountCreatedEvent) -> BestEffort {
        BestEffort::from_result(self.handle_account_created(&event).await, "account_created")
    }

    async fn handle_account_created(&self, event: &AccountCreatedEvent) -> Result<(), AppError> {
        if self.store.get_profile(&event.uid).await?.is_none() {
            let profile = UserProfile::for_new_account(
                &event.uid,
                event.email.as_deref().unwrap_or(""),
                event.display_name.as_deref().unwrap_or("New user"),
                event.email_verified.unwrap_or(false),
            );
            self.store.set_profile(&profile).await?;

            self.identity
                .set_custom_claims(&event.uid, &RoleClaims::role_only(Role::User))
                .await?;

            tracing::info!(uid = %event.uid, "Created default profile for new account");
        }

        self.store.record_login(&event.uid).await
    }

    /// A profile document changed. No-op unless the role changed.
    ///
    /// Copies the new stored role into the claims (with derived booleans)
    /// and records the reconciliation in the audit trail.
    pub async fn on_role_changed(&self, event: ProfileChangedEvent) -> BestEffort {
        if event.before.role == event.after.role {
            return BestEffort::Completed;
        }
        BestEffort::from_result(self.handle_role_changed(&event).await, "role_changed")
    }

    async fn handle_role_changed(&self, event: &ProfileChangedEvent) -> Result<(), AppError> {
        self.identity
            .set_custom_claims(&event.uid, &RoleClaims::with_flags(event.after.role))
            .await?;

        self.store
            .append_activity_log(&ActivityLogEntry::claims_reconciled(
                &event.uid,
                event.before.role,
                event.after.role,
            ))
            .await?;

        tracing::info!(
            uid = %event.uid,
            old_role = %event.before.role,
            new_role = %event.after.role,
            "Custom claims reconciled"
        );
        Ok(())
    }

    /// An identity was deleted upstream; cascade-clean its data.
    pub async fn on_account_deleted(&self, event: AccountDeletedEvent) -> BestEffort {
        BestEffort::from_result(self.handle_account_deleted(&event).await, "account_deleted")
    }

    async fn handle_account_deleted(&self, event: &AccountDeletedEvent) -> Result<(), AppError> {
        self.store.delete_profile(&event.uid).await?;

        // The two cleanup batches are independent and order-insensitive.
        let (searches, logs) = tokio::try_join!(
            self.store.delete_search_queries(&event.uid),
            self.store
                .delete_recent_activity_logs(&event.uid, RECENT_LOG_CLEANUP_LIMIT),
        )?;

        tracing::info!(
            uid = %event.uid,
            search_queries = searches,
            activity_logs = logs,
            "Account data cleaned up"
        );
        Ok(())
    }
}

// ─── Event payloads ──────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreatedEvent {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: Option<bool>,
}

/// Role fields of a profile document snapshot, before or after a change.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RoleSnapshot {
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileChangedEvent {
    pub uid: String,
    pub before: RoleSnapshot,
    pub after: RoleSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountDeletedEvent {
    pub uid: String,
}
