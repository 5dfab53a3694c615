// SPDX-License-Identifier: MIT
// Copyright 2026 Sijill Contributors

//! Sijill role-administration API server.
//!
//! Serves the callable role operations and the lifecycle trigger adapter
//! on top of Firestore and the Identity Toolkit admin API.

use sijill_roles::{
    config::Config,
    db::FirestoreStore,
    identity::GoogleIdentity,
    services::{AccountEvents, OidcVerifier, RoleService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Sijill role service");

    // Initialize Firestore
    let store = Arc::new(
        FirestoreStore::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
    );

    // Initialize the Identity Toolkit client
    let identity = Arc::new(
        GoogleIdentity::new(&config.gcp_project_id)
            .await
            .expect("Failed to initialize identity provider"),
    );

    let roles = RoleService::new(
        store.clone(),
        identity.clone(),
        config.verify_role_policy,
    );
    let events = AccountEvents::new(store, identity);

    // Event deliveries must present a Google-signed OIDC token
    let events_verifier =
        Arc::new(OidcVerifier::new(&config).expect("Failed to initialize OIDC verifier"));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        roles,
        events,
        events_verifier,
    });

    // Build router
    let app = sijill_roles::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sijill_roles=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
