// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Lifecycle trigger adapter.
//!
//! Thin HTTP layer between the platform's event delivery and
//! [`AccountEvents`]. Handlers answer 204 regardless of outcome: the
//! platform fires and forgets, failures live in the log. Deliveries are
//! authenticated upstream by `require_events_auth`, which verifies the
//! pipeline's OIDC token before any handler runs.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;

use crate::services::events::{AccountCreatedEvent, AccountDeletedEvent, ProfileChangedEvent};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/account-created", post(account_created))
        .route("/events/profile-updated", post(profile_updated))
        .route("/events/account-deleted", post(account_deleted))
}

async fn account_created(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AccountCreatedEvent>,
) -> StatusCode {
    state.events.on_account_created(event).await;
    StatusCode::NO_CONTENT
}

async fn profile_updated(
    State(state): State<Arc<AppState>>,
    Json(event): Json<ProfileChangedEvent>,
) -> StatusCode {
    state.events.on_role_changed(event).await;
    StatusCode::NO_CONTENT
}

async fn account_deleted(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AccountDeletedEvent>,
) -> StatusCode {
    state.events.on_account_deleted(event).await;
    StatusCode::NO_CONTENT
}
