// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Callable role-administration endpoints.
//!
//! Each endpoint takes a JSON argument object plus the authenticated-caller
//! context installed by the auth middleware, and returns the operation's
//! result object or a typed error.

use axum::{extract::State, routing::post, Extension, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::roles::{
    AssignRoleRequest, AssignRoleResponse, CreateAdminRequest, CreateAdminResponse,
    VerifyRoleRequest, VerifyRoleResponse,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/functions/assign-role", post(assign_role))
        .route("/functions/create-admin", post(create_admin))
        .route("/functions/verify-role", post(verify_role))
}

async fn assign_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<AssignRoleResponse>> {
    Ok(Json(state.roles.assign_role(&caller.uid, req).await?))
}

async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<Json<CreateAdminResponse>> {
    Ok(Json(
        state.roles.create_admin_account(&caller.uid, req).await?,
    ))
}

async fn verify_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<VerifyRoleRequest>,
) -> Result<Json<VerifyRoleResponse>> {
    Ok(Json(state.roles.verify_role(&caller.uid, req).await?))
}
