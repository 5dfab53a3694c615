// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Services module - business logic layer.

pub mod events;
pub mod oidc;
pub mod roles;

pub use events::{AccountEvents, BestEffort};
pub use oidc::OidcVerifier;
pub use roles::RoleService;
