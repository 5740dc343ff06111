// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use p256::ecdsa::SigningKey;
use url::Url;

use crate::site_config::SiteConfigCache;
use crate::token::{IssueCodeBackend, TokenVerifier};

/// Shared state for the issuance server's handlers.
#[derive(Clone)]
pub struct AppState {
    /// Verifies bearer tokens presented by callers
    pub verifier: TokenVerifier,
    /// Signs issued tokens; `None` disables issuance
    pub signing_key: Option<Arc<SigningKey>>,
    pub issue_codes: IssueCodeBackend,
    /// Directory service used to resolve residents given by name
    pub directory_root: Option<Url>,
    /// Validates building codes when present
    pub site_config: Option<Arc<SiteConfigCache>>,
}

impl AppState {
    pub fn new(verifier: TokenVerifier, signing_key: Option<SigningKey>) -> Self {
        Self {
            verifier,
            signing_key: signing_key.map(Arc::new),
            issue_codes: IssueCodeBackend::default(),
            directory_root: None,
            site_config: None,
        }
    }

    pub fn with_issue_codes(mut self, issue_codes: IssueCodeBackend) -> Self {
        self.issue_codes = issue_codes;
        self
    }

    pub fn with_directory_root(mut self, directory_root: Url) -> Self {
        self.directory_root = Some(directory_root);
        self
    }

    pub fn with_site_config(mut self, site_config: Arc<SiteConfigCache>) -> Self {
        self.site_config = Some(site_config);
        self
    }
}
