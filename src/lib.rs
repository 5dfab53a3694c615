// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Sijill role administration service.
//!
//! Keeps each account's role consistent between the identity provider's
//! custom claims and the `users` profile collection, with an append-only
//! audit trail for every change.

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{AccountEvents, OidcVerifier, RoleService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub roles: RoleService,
    pub events: AccountEvents,
    pub events_verifier: Arc<OidcVerifier>,
}
