// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Who may call VerifyRole for a target other than themselves.
///
/// The original deployment let any authenticated caller inspect any
/// account's role and claims. That is kept as the default, but it is a
/// least-privilege gap, so the policy is configurable rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyRolePolicy {
    /// Any authenticated caller may verify any target.
    #[default]
    AnyAuthenticated,
    /// Callers may verify themselves; only admins may verify others.
    SelfOrAdmin,
}

impl FromStr for VerifyRolePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-authenticated" => Ok(Self::AnyAuthenticated),
            "self-or-admin" => Ok(Self::SelfOrAdmin),
            _ => Err(ConfigError::Invalid("VERIFY_ROLE_POLICY")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (Firestore + Identity Toolkit)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Admin panel origin for CORS
    pub admin_panel_url: String,
    /// Public URL of this service; OIDC audience for event delivery
    pub service_url: String,
    /// JWT signing key for caller tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Authorization policy for VerifyRole on other accounts
    pub verify_role_policy: VerifyRolePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In production the signing key comes from a Secret Manager binding,
    /// which Cloud Run injects as an environment variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            admin_panel_url: env::var("ADMIN_PANEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            service_url: env::var("SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            verify_role_policy: match env::var("VERIFY_ROLE_POLICY") {
                Ok(v) => v.trim().parse()?,
                Err(_) => VerifyRolePolicy::default(),
            },
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            admin_panel_url: "http://localhost:5173".to_string(),
            service_url: "http://localhost:8080".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            verify_role_policy: VerifyRolePolicy::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "any-authenticated".parse::<VerifyRolePolicy>().unwrap(),
            VerifyRolePolicy::AnyAuthenticated
        );
        assert_eq!(
            "self-or-admin".parse::<VerifyRolePolicy>().unwrap(),
            VerifyRolePolicy::SelfOrAdmin
        );
        assert!("open".parse::<VerifyRolePolicy>().is_err());
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("VERIFY_ROLE_POLICY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.verify_role_policy, VerifyRolePolicy::AnyAuthenticated);
    }
}
