// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Append-only audit records for role mutations.

use crate::models::Role;
use serde::{Deserialize, Serialize};

/// What a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    SetUserRole,
    CreateAdminUser,
    RoleClaimUpdated,
}

/// One entry in the `activity_logs` collection.
///
/// Write-only from the service's point of view: nothing here ever reads an
/// entry back, except the bounded cleanup on account deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Acting account (for claim reconciliation, the account whose role changed)
    pub user_id: String,
    pub action: ActivityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_role: Option<Role>,
    pub new_role: Role,
    /// RFC 3339
    pub timestamp: String,
    /// Human-readable description of the change
    pub details: String,
}

impl ActivityLogEntry {
    pub fn role_assigned(actor: &str, target: &str, role: Role) -> Self {
        Self {
            user_id: actor.to_string(),
            action: ActivityAction::SetUserRole,
            target_user_id: Some(target.to_string()),
            old_role: None,
            new_role: role,
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: format!("Assigned role {} to user {}", role, target),
        }
    }

    pub fn admin_created(actor: &str, new_uid: &str, email: &str) -> Self {
        Self {
            user_id: actor.to_string(),
            action: ActivityAction::CreateAdminUser,
            target_user_id: Some(new_uid.to_string()),
            old_role: None,
            new_role: Role::Admin,
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: format!("Created new admin user: {}", email),
        }
    }

    pub fn claims_reconciled(uid: &str, old: Role, new: Role) -> Self {
        Self {
            user_id: uid.to_string(),
            action: ActivityAction::RoleClaimUpdated,
            target_user_id: None,
            old_role: Some(old),
            new_role: new,
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: format!("Updated custom claims for role {}", new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&ActivityAction::SetUserRole).unwrap();
        assert_eq!(json, "\"set_user_role\"");
        let json = serde_json::to_string(&ActivityAction::RoleClaimUpdated).unwrap();
        assert_eq!(json, "\"role_claim_updated\"");
    }

    #[test]
    fn test_role_assigned_entry() {
        let entry = ActivityLogEntry::role_assigned("admin1", "u1", Role::Moderator);
        assert_eq!(entry.action, ActivityAction::SetUserRole);
        assert_eq!(entry.target_user_id.as_deref(), Some("u1"));
        assert_eq!(entry.new_role, Role::Moderator);
        assert!(entry.old_role.is_none());
        assert!(entry.details.contains("moderator"));
    }

    #[test]
    fn test_reconciled_entry_keeps_old_role() {
        let entry = ActivityLogEntry::claims_reconciled("u1", Role::User, Role::Admin);
        assert_eq!(entry.old_role, Some(Role::User));
        assert_eq!(entry.new_role, Role::Admin);
        assert!(entry.target_user_id.is_none());
    }
}
