// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Firestore implementation of [`ProfileStore`].
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Activity logs (append-only audit trail)
//! - Search queries (deleted on account cleanup only)

use crate::db::{collections, ProfileStore};
use crate::error::AppError;
use crate::models::{ActivityLogEntry, Role, UserProfile};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

/// Masked write shape for role changes on a profile document.
#[derive(serde::Serialize, serde::Deserialize)]
struct RoleFields {
    role: Role,
    role_updated_by: String,
    role_updated_at: String,
}

/// Masked write shape for login stamps on a profile document.
#[derive(serde::Serialize, serde::Deserialize)]
struct LoginFields {
    last_login: String,
    stats: LoginStatsFields,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct LoginStatsFields {
    last_activity: String,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Store(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Extract the document id from a full Firestore document name
    /// (`projects/.../documents/{collection}/{id}`).
    fn doc_id(name: &str) -> String {
        name.rsplit('/').next().unwrap_or(name).to_string()
    }

    /// Batch delete documents by id using transactions.
    async fn batch_delete(&self, doc_ids: &[String], collection: &str) -> Result<(), AppError> {
        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Store(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Store(format!("Failed to commit batch deletion: {}", e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FirestoreStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn set_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn update_role(&self, uid: &str, role: Role, updated_by: &str) -> Result<(), AppError> {
        // Field-masked write: only the role fields move, so a profile write
        // racing this one (login stamps, preference edits) is never clobbered
        // by a stale whole-document image.
        let fields = RoleFields {
            role,
            role_updated_by: updated_by.to_string(),
            role_updated_at: chrono::Utc::now().to_rfc3339(),
        };

        let _: () = self
            .client
            .fluent()
            .update()
            .fields(["role", "role_updated_by", "role_updated_at"])
            .in_col(collections::USERS)
            .precondition(firestore::FirestoreWritePrecondition::Exists(true))
            .document_id(uid)
            .object(&fields)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Role update for {} failed: {}", uid, e)))?;
        Ok(())
    }

    async fn record_login(&self, uid: &str) -> Result<(), AppError> {
        // Server-side increment plus masked timestamp stamps in one write.
        // Transforms only take effect on the transaction path, so this goes
        // through a single-write transaction rather than a plain update.
        let now = chrono::Utc::now().to_rfc3339();
        let fields = LoginFields {
            last_login: now.clone(),
            stats: LoginStatsFields { last_activity: now },
        };

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .fields(["last_login", "stats.last_activity"])
            .in_col(collections::USERS)
            .precondition(firestore::FirestoreWritePrecondition::Exists(true))
            .document_id(uid)
            .object(&fields)
            .transforms(|t| t.fields([t.field("stats.total_logins").increment(1)]))
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Store(format!("Login stamp for {} failed: {}", uid, e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Store(format!("Login stamp for {} failed: {}", uid, e)))?;
        Ok(())
    }

    async fn append_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), AppError> {
        let _: ActivityLogEntry = self
            .client
            .fluent()
            .insert()
            .into(collections::ACTIVITY_LOGS)
            .generate_document_id()
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete_profile(&self, uid: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete_search_queries(&self, uid: &str) -> Result<usize, AppError> {
        let uid = uid.to_string();
        let docs = self
            .client
            .fluent()
            .select()
            .from(collections::SEARCH_QUERIES)
            .filter(move |q| q.for_all([q.field("user_id").eq(uid.clone())]))
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let doc_ids: Vec<String> = docs.iter().map(|d| Self::doc_id(&d.name)).collect();
        let count = doc_ids.len();

        // Deletes within a chunk are independent, so issue them concurrently
        // with a cap rather than one transaction per document.
        stream::iter(doc_ids)
            .map(|doc_id| {
                let client = self.client.clone();
                async move {
                    client
                        .fluent()
                        .delete()
                        .from(collections::SEARCH_QUERIES)
                        .document_id(&doc_id)
                        .execute()
                        .await
                        .map_err(|e| AppError::Store(e.to_string()))
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::debug!(count, "Deleted search-query records");
        Ok(count)
    }

    async fn delete_recent_activity_logs(
        &self,
        uid: &str,
        limit: u32,
    ) -> Result<usize, AppError> {
        let uid = uid.to_string();
        let docs = self
            .client
            .fluent()
            .select()
            .from(collections::ACTIVITY_LOGS)
            .filter(move |q| q.for_all([q.field("user_id").eq(uid.clone())]))
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let doc_ids: Vec<String> = docs.iter().map(|d| Self::doc_id(&d.name)).collect();
        let count = doc_ids.len();

        self.batch_delete(&doc_ids, collections::ACTIVITY_LOGS)
            .await?;

        tracing::debug!(count, "Deleted recent activity-log entries");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_extraction() {
        let name = "projects/p/databases/(default)/documents/activity_logs/abc123";
        assert_eq!(FirestoreStore::doc_id(name), "abc123");
        assert_eq!(FirestoreStore::doc_id("bare"), "bare");
    }
}
