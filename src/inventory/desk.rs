// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Front-desk workflow: receiving items and handing them to residents.

use std::sync::Arc;

use tracing::{info, warn};

use super::model::{ItemRecord, ReceiptRow};
use super::service::{CollectionSubmission, InventoryQuery, InventoryService};
use super::InventoryError;
use crate::site_config::SiteConfigCache;
use crate::token::{check_issue_code, IssueCodeService, IssueCodeStatus, Role, TokenClaims, TokenVerifier};

/// Who is collecting.
#[derive(Debug, Clone)]
pub enum Collector {
    /// A resident whose code was scanned and checked.
    Resident { claims: TokenClaims, token: String },
    /// Scan skipped; the staff member is recorded as collector.
    Staff {
        staff: TokenClaims,
        bld: String,
        unit: String,
    },
}

impl Collector {
    pub fn building(&self) -> &str {
        match self {
            Collector::Resident { claims, .. } => &claims.bld,
            Collector::Staff { bld, .. } => bld,
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            Collector::Resident { claims, .. } => &claims.unit,
            Collector::Staff { unit, .. } => unit,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Collector::Resident { claims, .. } => &claims.name,
            Collector::Staff { staff, .. } => &staff.name,
        }
    }

    /// Token forwarded with the submission, absent for unverified collections.
    pub fn recipient_jwt(&self) -> Option<&str> {
        match self {
            Collector::Resident { token, .. } => Some(token),
            Collector::Staff { .. } => None,
        }
    }
}

pub struct InventoryDesk<S, C> {
    service: S,
    verifier: TokenVerifier,
    issue_codes: C,
    site_config: Option<Arc<SiteConfigCache>>,
}

impl<S: InventoryService, C: IssueCodeService> InventoryDesk<S, C> {
    pub fn new(service: S, verifier: TokenVerifier, issue_codes: C) -> Self {
        Self {
            service,
            verifier,
            issue_codes,
            site_config: None,
        }
    }

    /// Validate receipts against the site's buildings and item types.
    pub fn with_site_config(mut self, cache: Arc<SiteConfigCache>) -> Self {
        self.site_config = Some(cache);
        self
    }

    /// Check every row, then record them in one request.
    pub async fn receive(&self, rows: &[ReceiptRow]) -> Result<(), InventoryError> {
        for (index, row) in rows.iter().enumerate() {
            if let Some(field) = row.missing_field() {
                return Err(InventoryError::IncompleteReceipt { row: index, field });
            }
            if let Some(cache) = &self.site_config {
                if !cache.accepts_building(&row.bld) {
                    return Err(InventoryError::UnknownBuilding(row.bld.clone()));
                }
                if !cache.accepts_item_type(&row.item_type) {
                    return Err(InventoryError::UnknownItemType(row.item_type.clone()));
                }
            }
        }
        if rows.is_empty() {
            return Err(InventoryError::NothingSelected);
        }

        self.service.receive_items(rows).await?;
        info!(items = rows.len(), "Items received");
        Ok(())
    }

    /// Turn a scanned code into a collector.
    ///
    /// The code must verify, belong to a resident, and carry the resident's
    /// current issue code.
    pub async fn identify(&self, code: &str) -> Result<Collector, InventoryError> {
        let claims = self.verifier.verify(code)?;
        if claims.role != Role::Resident {
            return Err(InventoryError::NotResident);
        }
        if let IssueCodeStatus::Revoked { last_valid } = check_issue_code(&claims, &self.issue_codes).await? {
            return Err(InventoryError::Revoked {
                presented: claims.ic,
                last_valid,
            });
        }

        Ok(Collector::Resident {
            claims,
            token: code.to_string(),
        })
    }

    /// Collect for a unit without scanning a resident code.
    pub fn skip_scan(
        &self,
        staff: &TokenClaims,
        bld: impl Into<String>,
        unit: impl Into<String>,
    ) -> Result<Collector, InventoryError> {
        if !staff.role.is_staff() {
            return Err(InventoryError::StaffRequired);
        }
        let (bld, unit) = (bld.into(), unit.into());
        warn!(staff = %staff.name, building = %bld, unit = %unit, "Collecting without a resident scan");

        Ok(Collector::Staff {
            staff: staff.clone(),
            bld,
            unit,
        })
    }

    /// Items waiting at the desk for the collector's unit.
    pub async fn pending_items(&self, collector: &Collector) -> Result<Vec<ItemRecord>, InventoryError> {
        let query = InventoryQuery {
            bld: collector.building().to_string(),
            unit: collector.unit().to_string(),
        };
        let items = self.service.query_items(&query).await?;
        Ok(items.into_iter().filter(ItemRecord::is_awaiting_collection).collect())
    }

    pub async fn collect(&self, collector: &Collector, item_ids: &[u64]) -> Result<String, InventoryError> {
        if item_ids.is_empty() {
            return Err(InventoryError::NothingSelected);
        }
        let submission = CollectionSubmission {
            collected: item_ids.to_vec(),
            recipient_jwt: collector.recipient_jwt().map(str::to_string),
        };

        let message = self.service.submit_collection(&submission).await?;
        info!(
            collector = %collector.name(),
            building = %collector.building(),
            unit = %collector.unit(),
            items = item_ids.len(),
            verified = submission.recipient_jwt.is_some(),
            "Items collected"
        );
        Ok(message)
    }
}
