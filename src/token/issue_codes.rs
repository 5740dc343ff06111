// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issue codes: revoking a resident's older tokens.
//!
//! Each resident has a "last valid" issue code. A token whose `ic` claim does
//! not match it has been revoked. Residents with no stored code accept any
//! code. This check runs after [`verify`](super::verify) succeeds and never
//! changes that decision; callers use it to gate follow-up actions such as
//! item collection.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use url::Url;

use super::claims::{TokenClaims, DEFAULT_ISSUE_CODE};
use crate::remote::{ensure_success, http_client, SyncFailure};

/// Result of an issue-code lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCodeStatus {
    /// The presented code is current (or the resident has none stored)
    Valid,
    /// A newer code has been issued
    Revoked { last_valid: u32 },
}

/// Key lookup: resident id -> last valid issue code.
pub trait IssueCodeService: Send + Sync {
    fn check(
        &self,
        resident_id: &str,
        issue_code: u32,
    ) -> impl Future<Output = Result<IssueCodeStatus, SyncFailure>> + Send;
}

/// Check the issue code of already verified claims.
pub async fn check_issue_code<S: IssueCodeService>(
    claims: &TokenClaims,
    service: &S,
) -> Result<IssueCodeStatus, SyncFailure> {
    let status = service.check(&claims.sub, claims.ic).await?;
    if let IssueCodeStatus::Revoked { last_valid } = status {
        warn!(
            resident_id = %claims.sub,
            presented = claims.ic,
            last_valid,
            "Presented token has a revoked issue code"
        );
    }
    Ok(status)
}

/// In-process issue-code store used by the issuance server.
#[derive(Debug, Default)]
pub struct IssueCodeRegistry {
    codes: RwLock<HashMap<String, u32>>,
}

impl IssueCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last valid code stored for a resident.
    pub fn current(&self, resident_id: &str) -> Option<u32> {
        self.codes
            .read()
            .ok()
            .and_then(|codes| codes.get(resident_id).copied())
    }

    /// Code to put in the next token issued for a resident.
    pub fn next_for(&self, resident_id: &str) -> u32 {
        self.current(resident_id).unwrap_or(DEFAULT_ISSUE_CODE)
    }

    /// Invalidate every token issued so far for a resident.
    ///
    /// Returns the new current code. `None` if the store lock is poisoned.
    pub fn revoke(&self, resident_id: &str) -> Option<u32> {
        let mut codes = self.codes.write().ok()?;
        let next = codes
            .get(resident_id)
            .copied()
            .unwrap_or(DEFAULT_ISSUE_CODE)
            + 1;
        codes.insert(resident_id.to_string(), next);
        info!(resident_id, issue_code = next, "Revoked earlier issue codes");
        Some(next)
    }

    pub fn status(&self, resident_id: &str, issue_code: u32) -> IssueCodeStatus {
        match self.current(resident_id) {
            Some(last_valid) if last_valid != issue_code => IssueCodeStatus::Revoked { last_valid },
            _ => IssueCodeStatus::Valid,
        }
    }
}

impl IssueCodeService for IssueCodeRegistry {
    async fn check(&self, resident_id: &str, issue_code: u32) -> Result<IssueCodeStatus, SyncFailure> {
        Ok(self.status(resident_id, issue_code))
    }
}

/// Client for the hosted issue-code service (`GET ?rid=&ic=`).
///
/// 200 means valid; 401 carries `Last valid: N; Supplied: M`.
#[derive(Debug, Clone)]
pub struct HttpIssueCodeService {
    client: reqwest::Client,
    url: Url,
}

impl HttpIssueCodeService {
    pub fn new(url: Url) -> Result<Self, SyncFailure> {
        Ok(Self {
            client: http_client()?,
            url,
        })
    }
}

impl IssueCodeService for HttpIssueCodeService {
    async fn check(&self, resident_id: &str, issue_code: u32) -> Result<IssueCodeStatus, SyncFailure> {
        let endpoint = self.url.as_str();
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("rid", resident_id), ("ic", &issue_code.to_string())])
            .send()
            .await
            .map_err(|e| SyncFailure::transport(endpoint, e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let body = response
                .text()
                .await
                .map_err(|e| SyncFailure::decode(endpoint, e))?;
            let last_valid = parse_last_valid(&body)
                .ok_or_else(|| SyncFailure::decode(endpoint, format!("unexpected body {body:?}")))?;
            return Ok(IssueCodeStatus::Revoked { last_valid });
        }

        ensure_success(&response, endpoint)?;
        Ok(IssueCodeStatus::Valid)
    }
}

/// Where the server looks issue codes up.
#[derive(Debug, Clone)]
pub enum IssueCodeBackend {
    /// Codes kept in this process; revocation supported
    Local(Arc<IssueCodeRegistry>),
    /// Codes owned by the hosted service; read only
    Remote(HttpIssueCodeService),
}

impl IssueCodeBackend {
    /// The local registry, if codes are kept in-process.
    pub fn registry(&self) -> Option<&IssueCodeRegistry> {
        match self {
            IssueCodeBackend::Local(registry) => Some(registry.as_ref()),
            IssueCodeBackend::Remote(_) => None,
        }
    }

    /// Code for the next token issued to `resident_id`.
    pub fn next_for(&self, resident_id: &str) -> u32 {
        self.registry()
            .map(|registry| registry.next_for(resident_id))
            .unwrap_or(DEFAULT_ISSUE_CODE)
    }
}

impl Default for IssueCodeBackend {
    fn default() -> Self {
        IssueCodeBackend::Local(Arc::new(IssueCodeRegistry::new()))
    }
}

impl IssueCodeService for IssueCodeBackend {
    async fn check(&self, resident_id: &str, issue_code: u32) -> Result<IssueCodeStatus, SyncFailure> {
        match self {
            IssueCodeBackend::Local(registry) => registry.check(resident_id, issue_code).await,
            IssueCodeBackend::Remote(service) => service.check(resident_id, issue_code).await,
        }
    }
}

fn parse_last_valid(body: &str) -> Option<u32> {
    body.split(';')
        .find_map(|part| part.trim().strip_prefix("Last valid:"))
        .and_then(|n| n.trim().parse().ok())
}
