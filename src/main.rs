// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use respass::{
    api::router,
    config::AppConfig,
    session::{FileSessionStore, SessionPaths, SessionStore},
    site_config::{HttpSiteConfigService, SiteConfigCache, SiteConfigPoller},
    state::AppState,
    telemetry,
    token::{keys::import_signing_key, HttpIssueCodeService, IssueCodeBackend, TokenVerifier},
};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");
    telemetry::init(config.log_format);

    let verifier = TokenVerifier::from_pem(&config.public_key_pem).expect("Invalid token public key");
    let signing_key = config
        .private_key_pem
        .as_deref()
        .map(|pem| import_signing_key(pem).expect("Invalid token private key"));
    if signing_key.is_none() {
        warn!("No signing key configured; token issuance is disabled");
    }

    let mut state = AppState::new(verifier, signing_key);

    if let Some(url) = config.issue_code_url.clone() {
        info!(%url, "Using hosted issue-code service");
        let service = HttpIssueCodeService::new(url).expect("Failed to build issue-code client");
        state = state.with_issue_codes(IssueCodeBackend::Remote(service));
    }

    if let Some(root) = config.api_root.clone() {
        info!(%root, "Resolving residents through the directory service");
        state = state.with_directory_root(root);
    }

    let shutdown = CancellationToken::new();

    if let Some(source) = config.site_config.clone() {
        let store: Arc<dyn SessionStore> = Arc::new(
            FileSessionStore::open(SessionPaths::new(&config.data_dir)).expect("Failed to open data directory"),
        );
        let cache = Arc::new(SiteConfigCache::load(store));
        let service = HttpSiteConfigService::new(source.url).expect("Failed to build site-config client");
        let poller = SiteConfigPoller::new(cache.clone(), service, source.property_id);
        tokio::spawn(poller.run(shutdown.clone()));
        state = state.with_site_config(cache);
    }

    let app = router(state);

    let addr = config.bind_addr().expect("Invalid bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    info!("Respass server listening on http://{addr} (docs at /docs)");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await
        .expect("Server error");

    info!("Shutting down server...");
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
