// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Middleware modules (authentication, security headers).

pub mod auth;
pub mod events_auth;
pub mod security;

pub use auth::require_auth;
pub use events_auth::require_events_auth;
