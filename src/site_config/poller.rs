// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Site Config Poller
//!
//! Background task that keeps a [`SiteConfigCache`] current. A failed fetch
//! keeps the last known configuration; the next sweep simply tries again.
//!
//! ## Shutdown
//!
//! Stops when its `tokio_util::sync::CancellationToken` is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::cache::SiteConfigCache;
use super::service::SiteConfigService;

/// Default interval between fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

pub struct SiteConfigPoller<S> {
    cache: Arc<SiteConfigCache>,
    service: S,
    property_id: String,
    poll_interval: Duration,
}

impl<S: SiteConfigService> SiteConfigPoller<S> {
    pub fn new(cache: Arc<SiteConfigCache>, service: S, property_id: impl Into<String>) -> Self {
        Self {
            cache,
            service,
            property_id: property_id.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until `shutdown` is cancelled. The first fetch happens at once.
    ///
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            property_id = %self.property_id,
            interval_secs = self.poll_interval.as_secs(),
            "Site config poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Site config poller shutting down");
                return;
            }

            // Failures are logged by the cache and retried next sweep.
            let _ = self.cache.refresh(&self.service, &self.property_id).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Site config poller shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::serve;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::site_config::service::{testing, HttpSiteConfigService};

    #[tokio::test]
    async fn first_sweep_fills_cache_then_stops_on_cancel() {
        let base = serve(testing::router()).await;
        let service = HttpSiteConfigService::new(base.join("config").unwrap()).unwrap();
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let cache = Arc::new(SiteConfigCache::load(store));

        let shutdown = CancellationToken::new();
        let poller = SiteConfigPoller::new(cache.clone(), service, "riverside")
            .with_poll_interval(Duration::from_millis(10));
        let handle = tokio::spawn(poller.run(shutdown.clone()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while cache.current().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(cache.default_building().as_deref(), Some("A"));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
