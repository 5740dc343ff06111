// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Site Configuration
//!
//! Per-property option lists (buildings, inventory item types, inventory
//! locations) fetched from the site-config service and cached in the
//! session's `siteConfig` slot. The directory uses the building list to
//! pick a default building and to reject unknown building codes.

pub mod cache;
pub mod model;
pub mod poller;
pub mod service;

pub use cache::{SiteConfigCache, SiteConfigError};
pub use model::{SelectOption, SiteConfig};
pub use poller::SiteConfigPoller;
pub use service::{HttpSiteConfigService, SiteConfigService};
