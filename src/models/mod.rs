// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Data models for the application.

pub mod activity_log;
pub mod role;
pub mod user;

pub use activity_log::{ActivityAction, ActivityLogEntry};
pub use role::{Role, RoleClaims};
pub use user::{Preferences, UsageStats, UserProfile};
