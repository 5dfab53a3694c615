// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Event-delivery authentication middleware.

use crate::services::oidc::OidcError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Require a valid event-pipeline OIDC token for `/events/*` routes.
pub async fn require_events_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request.headers().get(header::AUTHORIZATION);

    let principal = state
        .events_verifier
        .verify_event_token(auth_header)
        .await
        .map_err(|err| match err {
            OidcError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Blocked event delivery: invalid OIDC token");
                StatusCode::FORBIDDEN
            }
            OidcError::Transient(reason) => {
                tracing::error!(reason = %reason, "Event OIDC verification transient failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    tracing::debug!(
        email = %principal.email,
        subject = %principal.subject,
        audience = %principal.audience,
        "Event delivery OIDC verification succeeded"
    );

    Ok(next.run(request).await)
}
