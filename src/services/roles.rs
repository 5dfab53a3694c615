// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Role administration operations.
//!
//! Keeps the account's authorization level consistent between the identity
//! provider's custom claims and the stored profile, with every change
//! attributed and audited. Claims and stored role are written one after the
//! other with no cross-store transaction, so they can diverge briefly until
//! the reconciling trigger fires.

use crate::config::VerifyRolePolicy;
use crate::db::ProfileStore;
use crate::error::{AppError, Result};
use crate::identity::{IdentityProvider, NewIdentity};
use crate::models::{ActivityLogEntry, Role, RoleClaims, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::ValidateEmail;

const MIN_PASSWORD_LEN: usize = 6;

/// The callable role-administration operations.
#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityProvider>,
    policy: VerifyRolePolicy,
}

impl RoleService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityProvider>,
        policy: VerifyRolePolicy,
    ) -> Self {
        Self {
            store,
            identity,
            policy,
        }
    }

    /// Stored role of the given account, `user` when no profile exists.
    async fn stored_role(&self, uid: &str) -> Result<Role> {
        Ok(self
            .store
            .get_profile(uid)
            .await?
            .map(|p| p.role)
            .unwrap_or_default())
    }

    /// Fail with PermissionDenied unless the requester's STORED role is admin.
    ///
    /// The stored role is checked rather than the claim so a freshly demoted
    /// admin cannot keep acting on a stale token's claims.
    async fn require_admin(&self, requester: &str, denied: &str) -> Result<()> {
        if self.stored_role(requester).await?.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(denied.to_string()))
        }
    }

    /// Assign a role to an account.
    ///
    /// Sets the claim-role, updates the stored role with attribution, and
    /// appends a `set_user_role` audit entry.
    pub async fn assign_role(
        &self,
        requester: &str,
        req: AssignRoleRequest,
    ) -> Result<AssignRoleResponse> {
        self.require_admin(requester, "Only admins can assign roles")
            .await?;

        let uid = match req.uid.as_deref() {
            Some(uid) if !uid.is_empty() => uid,
            _ => {
                return Err(AppError::InvalidArgument(
                    "uid and role are required".to_string(),
                ))
            }
        };
        let role: Role = match req.role.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::models::role::InvalidRole| {
                    AppError::InvalidArgument(e.to_string())
                })?,
            None => {
                return Err(AppError::InvalidArgument(
                    "uid and role are required".to_string(),
                ))
            }
        };

        // Claims first, then the stored role; the reconciling trigger closes
        // any window left by a failure between the two. Validation is done,
        // so whatever fails here is an internal fault rather than something
        // the caller can correct.
        self.identity
            .set_custom_claims(uid, &RoleClaims::role_only(role))
            .await
            .map_err(AppError::into_internal)?;
        self.store
            .update_role(uid, role, requester)
            .await
            .map_err(AppError::into_internal)?;
        self.store
            .append_activity_log(&ActivityLogEntry::role_assigned(requester, uid, role))
            .await
            .map_err(AppError::into_internal)?;

        tracing::info!(requester, target = uid, role = %role, "Role assigned");

        Ok(AssignRoleResponse {
            success: true,
            message: format!("Role {} assigned successfully", role),
            role,
            uid: uid.to_string(),
        })
    }

    /// Create a new admin account.
    ///
    /// Validation happens before any side effect; the email-verification
    /// link is best-effort and never fails the operation.
    pub async fn create_admin_account(
        &self,
        requester: &str,
        req: CreateAdminRequest,
    ) -> Result<CreateAdminResponse> {
        self.require_admin(requester, "Only admins can create admin users")
            .await?;

        let (email, password, display_name) = match (&req.email, &req.password, &req.display_name)
        {
            (Some(e), Some(p), Some(d)) if !e.is_empty() && !p.is_empty() && !d.is_empty() => {
                (e.clone(), p.clone(), d.clone())
            }
            _ => {
                return Err(AppError::InvalidArgument(
                    "email, password and displayName are required".to_string(),
                ))
            }
        };
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidArgument(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if !email.validate_email() {
            return Err(AppError::InvalidArgument(
                "Invalid email address".to_string(),
            ));
        }

        let created = self
            .identity
            .create_user(&NewIdentity {
                email: email.clone(),
                password,
                display_name: display_name.clone(),
                email_verified: false,
            })
            .await?;

        let now = chrono::Utc::now().to_rfc3339();
        let profile = UserProfile {
            uid: created.uid.clone(),
            email: email.clone(),
            display_name,
            role: Role::Admin,
            is_email_verified: false,
            status: crate::models::user::STATUS_ACTIVE.to_string(),
            created_at: now.clone(),
            created_by: Some(requester.to_string()),
            last_login: now,
            role_updated_by: None,
            role_updated_at: None,
            preferences: Default::default(),
            stats: Default::default(),
        };
        self.store
            .set_profile(&profile)
            .await
            .map_err(AppError::into_internal)?;

        self.identity
            .set_custom_claims(
                &created.uid,
                &RoleClaims {
                    role: Some(Role::Admin),
                    admin: Some(true),
                    moderator: None,
                },
            )
            .await
            .map_err(AppError::into_internal)?;

        // Verification email is advisory only.
        if let Err(e) = self
            .identity
            .generate_email_verification_link(&email)
            .await
        {
            tracing::warn!(error = %e, email = %email, "Failed to generate verification email");
        }

        self.store
            .append_activity_log(&ActivityLogEntry::admin_created(
                requester,
                &created.uid,
                &email,
            ))
            .await
            .map_err(AppError::into_internal)?;

        tracing::info!(requester, uid = %created.uid, email = %email, "Admin user created");

        Ok(CreateAdminResponse {
            success: true,
            message: "Admin user created successfully".to_string(),
            uid: created.uid,
            email,
        })
    }

    /// Report an account's claim-role, stored role, and derived flags.
    ///
    /// Read-only. With `targetUid` omitted the requester inspects itself;
    /// whether non-admins may inspect OTHERS is governed by
    /// [`VerifyRolePolicy`] rather than hardcoded.
    pub async fn verify_role(
        &self,
        requester: &str,
        req: VerifyRoleRequest,
    ) -> Result<VerifyRoleResponse> {
        let target = match req.target_uid.as_deref() {
            Some(uid) if !uid.is_empty() => uid.to_string(),
            _ => requester.to_string(),
        };

        if self.policy == VerifyRolePolicy::SelfOrAdmin && target != requester {
            self.require_admin(requester, "Only admins can verify other users' roles")
                .await?;
        }

        let record = self
            .identity
            .get_user(&target)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let stored_role = self.store.get_profile(&target).await?.map(|p| p.role);
        let claim_role = record.custom_claims.role;

        // Claim wins, then the stored role, then plain user.
        let role = claim_role.or(stored_role).unwrap_or_default();

        Ok(VerifyRoleResponse {
            success: true,
            uid: target,
            email: record.email,
            display_name: record.display_name,
            custom_claims: record.custom_claims.clone(),
            firestore_role: stored_role.unwrap_or_default(),
            role,
            is_admin: claim_role == Some(Role::Admin) || stored_role == Some(Role::Admin),
            is_moderator: claim_role == Some(Role::Moderator)
                || stored_role == Some(Role::Moderator),
            email_verified: record.email_verified,
            created_at: record.created_at,
        })
    }
}

// ─── Request / response shapes ───────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AssignRoleRequest {
    pub uid: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignRoleResponse {
    pub success: bool,
    pub message: String,
    pub role: Role,
    pub uid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAdminResponse {
    pub success: bool,
    pub message: String,
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRoleRequest {
    pub target_uid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRoleResponse {
    pub success: bool,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub custom_claims: RoleClaims,
    pub firestore_role: Role,
    pub role: Role,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub email_verified: bool,
    pub created_at: Option<String>,
}
