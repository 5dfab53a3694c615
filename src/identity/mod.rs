// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Identity provider layer.
//!
//! The provider owns account credentials and the custom claims embedded in
//! identity tokens. Handlers only see the [`IdentityProvider`] trait;
//! [`GoogleIdentity`] talks to the Identity Toolkit admin API.

pub mod google;

pub use google::GoogleIdentity;

use crate::error::AppError;
use crate::models::RoleClaims;
use async_trait::async_trait;

/// A provider-side account record.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub custom_claims: RoleClaims,
    /// Account creation time (RFC 3339), if the provider reports one
    pub created_at: Option<String>,
}

/// Parameters for creating a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub email_verified: bool,
}

/// Operations against the identity provider's admin API.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up an account by uid. `None` if the identity does not exist.
    async fn get_user(&self, uid: &str) -> Result<Option<IdentityRecord>, AppError>;

    /// Create a new identity. Fails with `AlreadyExists` on email collision.
    async fn create_user(&self, new: &NewIdentity) -> Result<IdentityRecord, AppError>;

    /// Replace the account's custom claims.
    async fn set_custom_claims(&self, uid: &str, claims: &RoleClaims) -> Result<(), AppError>;

    /// Generate an email-verification link for the given address.
    async fn generate_email_verification_link(&self, email: &str) -> Result<String, AppError>;
}
