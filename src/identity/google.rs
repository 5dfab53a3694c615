// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Identity Toolkit admin API client.
//!
//! Handles:
//! - Account lookup (with custom claims)
//! - Admin account creation
//! - Custom-claims updates
//! - Email-verification link generation
//!
//! Authenticates with application-default credentials via gcloud-sdk; when
//! FIREBASE_AUTH_EMULATOR_HOST is set, talks to the Auth emulator with the
//! well-known `owner` token instead.

use crate::error::AppError;
use crate::identity::{IdentityProvider, IdentityRecord, NewIdentity};
use crate::models::RoleClaims;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Identity Toolkit admin client.
#[derive(Clone)]
pub struct GoogleIdentity {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    token_gen: Option<Arc<gcloud_sdk::GoogleAuthTokenGenerator>>,
}

impl GoogleIdentity {
    /// Create a new client for the given project.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if let Ok(host) = std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            tracing::info!(host = %host, "Using Identity Toolkit emulator");
            return Ok(Self {
                http: reqwest::Client::new(),
                base_url: format!("http://{}/identitytoolkit.googleapis.com/v1", host),
                project_id: project_id.to_string(),
                token_gen: None,
            });
        }

        let token_gen = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::Default,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
        )
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to initialize GCP credentials: {}", e))
        })?;

        tracing::info!(project = project_id, "Identity Toolkit client initialized");

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            project_id: project_id.to_string(),
            token_gen: Some(Arc::new(token_gen)),
        })
    }

    /// Bearer token for the admin API (`owner` against the emulator).
    async fn bearer_token(&self) -> Result<String, AppError> {
        match &self.token_gen {
            Some(gen) => {
                let token = gen.create_token().await.map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to obtain access token: {}", e))
                })?;
                Ok(String::from_utf8_lossy(token.token.ref_sensitive_value()).to_string())
            }
            None => Ok("owner".to_string()),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/projects/{}/accounts{}",
            self.base_url, self.project_id, action
        )
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, AppError> {
        let token = self.bearer_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Identity API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body: ApiErrorEnvelope = response.json().await.unwrap_or_default();
            let message = error_body.error.message;
            return Err(match message.as_str() {
                m if m.starts_with("EMAIL_EXISTS") => {
                    AppError::AlreadyExists("This email address is already in use".to_string())
                }
                m if m.starts_with("USER_NOT_FOUND") => {
                    AppError::NotFound("User not found".to_string())
                }
                m if m.starts_with("INVALID_EMAIL") => {
                    AppError::InvalidArgument("Invalid email address".to_string())
                }
                _ => AppError::Internal(anyhow::anyhow!(
                    "Identity API error ({}): {}",
                    status,
                    message
                )),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Identity API response parse: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn get_user(&self, uid: &str) -> Result<Option<IdentityRecord>, AppError> {
        let body = serde_json::json!({ "localId": [uid] });
        let result: LookupResponse = self.post_json(&self.endpoint(":lookup"), &body).await?;

        Ok(result.users.into_iter().next().map(ApiUser::into_record))
    }

    async fn create_user(&self, new: &NewIdentity) -> Result<IdentityRecord, AppError> {
        let body = serde_json::json!({
            "email": new.email,
            "password": new.password,
            "displayName": new.display_name,
            "emailVerified": new.email_verified,
        });
        let created: SignUpResponse = self.post_json(&self.endpoint(""), &body).await?;

        Ok(IdentityRecord {
            uid: created.local_id,
            email: Some(new.email.clone()),
            display_name: Some(new.display_name.clone()),
            email_verified: new.email_verified,
            custom_claims: RoleClaims::default(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        })
    }

    async fn set_custom_claims(&self, uid: &str, claims: &RoleClaims) -> Result<(), AppError> {
        let attributes = serde_json::to_string(claims)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Claims serialization: {}", e)))?;

        let body = serde_json::json!({
            "localId": uid,
            "customAttributes": attributes,
        });
        let _: serde_json::Value = self.post_json(&self.endpoint(":update"), &body).await?;
        Ok(())
    }

    async fn generate_email_verification_link(&self, email: &str) -> Result<String, AppError> {
        let body = serde_json::json!({
            "requestType": "VERIFY_EMAIL",
            "email": email,
            "returnOobLink": true,
        });
        let result: OobCodeResponse = self
            .post_json(&self.endpoint(":sendOobCode"), &body)
            .await?;
        Ok(result.oob_link)
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
    /// Serialized JSON string of the custom claims
    custom_attributes: Option<String>,
    /// Milliseconds since epoch, as a decimal string
    created_at: Option<String>,
}

impl ApiUser {
    fn into_record(self) -> IdentityRecord {
        let custom_claims = self
            .custom_attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        let created_at = self.created_at.as_deref().and_then(parse_epoch_millis);

        IdentityRecord {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            email_verified: self.email_verified,
            custom_claims,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeResponse {
    #[serde(default)]
    oob_link: String,
}

/// Convert the API's epoch-milliseconds string to RFC 3339.
fn parse_epoch_millis(raw: &str) -> Option<String> {
    let millis: i64 = raw.parse().ok()?;
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_api_user_parses_claims() {
        let user = ApiUser {
            local_id: "u1".to_string(),
            email: Some("a@example.com".to_string()),
            display_name: Some("Amal".to_string()),
            email_verified: true,
            custom_attributes: Some(r#"{"role":"admin","admin":true}"#.to_string()),
            created_at: Some("1700000000000".to_string()),
        };

        let record = user.into_record();
        assert_eq!(record.custom_claims.role, Some(Role::Admin));
        assert_eq!(record.custom_claims.admin, Some(true));
        assert!(record.created_at.unwrap().starts_with("2023-11-14T"));
    }

    #[test]
    fn test_api_user_tolerates_garbage_claims() {
        let user = ApiUser {
            local_id: "u2".to_string(),
            email: None,
            display_name: None,
            email_verified: false,
            custom_attributes: Some("not json".to_string()),
            created_at: None,
        };

        let record = user.into_record();
        assert_eq!(record.custom_claims, RoleClaims::default());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_epoch_millis_parsing() {
        assert!(parse_epoch_millis("abc").is_none());
        assert!(parse_epoch_millis("1700000000000").is_some());
    }
}
