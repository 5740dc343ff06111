// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Respass - resident identity tokens for a single property
//!
//! Residents and staff carry a QR code holding an ES256-signed token. Staff
//! devices scan and verify those codes offline, keep a cached copy of the
//! resident directory, and mint resident codes through the issuance server.
//!
//! ## Modules
//!
//! - `token` - Token codec, signing, verification and issue codes
//! - `session` - Persisted session slots and auth state
//! - `directory` - Resident directory cache and directory-service sync
//! - `site_config` - Property configuration (buildings) and its poller
//! - `inventory` - Receiving items and handing them to residents
//! - `scanner` - Frame-driven scan loop
//! - `api` - Issuance server HTTP handlers (Axum)

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod inventory;
pub mod remote;
pub mod scanner;
pub mod session;
pub mod site_config;
pub mod state;
pub mod telemetry;
pub mod token;
