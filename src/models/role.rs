// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Authorization roles and the custom-claims payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization level of an account.
///
/// Stored both in the profile document (`users/{uid}.role`) and in the
/// identity provider's custom claims. The two may diverge transiently
/// between a role write and the reconciling claims update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::Moderator)
    }
}

impl Default for Role {
    /// Accounts start as plain users.
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid role '{0}', expected one of: user, admin, moderator")]
pub struct InvalidRole(pub String);

/// Custom claims embedded in identity tokens.
///
/// The reconciling trigger writes the derived `admin`/`moderator` booleans
/// alongside the role so downstream consumers can check a single flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator: Option<bool>,
}

impl RoleClaims {
    /// Claims carrying just a role, as set for newly registered accounts.
    pub fn role_only(role: Role) -> Self {
        Self {
            role: Some(role),
            admin: None,
            moderator: None,
        }
    }

    /// Claims with the derived booleans, as written by reconciliation.
    pub fn with_flags(role: Role) -> Self {
        Self {
            role: Some(role),
            admin: Some(role.is_admin()),
            moderator: Some(role.is_moderator()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_claims_with_flags() {
        let claims = RoleClaims::with_flags(Role::Moderator);
        assert_eq!(claims.role, Some(Role::Moderator));
        assert_eq!(claims.admin, Some(false));
        assert_eq!(claims.moderator, Some(true));
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Moderator).unwrap();
        assert_eq!(json, "\"moderator\"");
        let back: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }
}
