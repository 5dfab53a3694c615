// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! User profile document stored in Firestore.

use crate::models::Role;
use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";

/// Profile document in `users/{uid}`.
///
/// The role field here is the source of truth for reconciliation; the copy
/// in the identity provider's custom claims is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity provider uid (also the document ID)
    pub uid: String,
    /// Email address (empty when the provider did not share one)
    pub email: String,
    /// Display name
    pub display_name: String,
    /// Stored role
    #[serde(default)]
    pub role: Role,
    /// Whether the provider has verified the email
    pub is_email_verified: bool,
    /// Account status, `active` unless suspended
    pub status: String,
    /// When the profile was created (RFC 3339)
    pub created_at: String,
    /// Uid of the admin who created this account, if created via
    /// CreateAdminAccount rather than self-registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Last login timestamp (RFC 3339)
    pub last_login: String,
    /// Uid of the admin who last changed the role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_updated_by: Option<String>,
    /// When the role was last changed (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_updated_at: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub stats: UsageStats,
}

impl UserProfile {
    /// Build the default profile created on first authentication.
    pub fn for_new_account(uid: &str, email: &str, display_name: &str, verified: bool) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            role: Role::User,
            is_email_verified: verified,
            status: STATUS_ACTIVE.to_string(),
            created_at: now.clone(),
            created_by: None,
            last_login: now.clone(),
            role_updated_by: None,
            role_updated_at: None,
            preferences: Preferences::default(),
            stats: UsageStats {
                total_logins: 1,
                total_searches: 0,
                last_activity: now,
            },
        }
    }
}

/// Per-account UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub language: String,
    pub theme: String,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "ar".to_string(),
            theme: "system".to_string(),
            notifications: true,
        }
    }
}

/// Usage counters maintained by the account-created trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_logins: u64,
    pub total_searches: u64,
    /// Last activity timestamp (RFC 3339), empty if never recorded
    #[serde(default)]
    pub last_activity: String,
}
