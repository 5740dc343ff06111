// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and [`AppConfig`], which is loaded
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root of the persisted session store | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_PUBLIC_KEY` | SPKI PEM key tokens are verified against | embedded property key |
//! | `TOKEN_PRIVATE_KEY` | PKCS8 PEM key tokens are signed with | unset: issuance disabled |
//! | `API_ROOT` | Directory service base URL | unset: residents must be given by id |
//! | `ISSUE_CODE_URL` | Hosted issue-code service | unset: codes kept in-process |
//! | `SITE_CONFIG_URL` | Hosted site-config service | unset: buildings not validated |
//! | `PROPERTY_ID` | Property key for the site-config service | required with `SITE_CONFIG_URL` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! PEM values may carry literal `\n` sequences in place of newlines.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::token::PROPERTY_PUBLIC_KEY;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TOKEN_PUBLIC_KEY_ENV: &str = "TOKEN_PUBLIC_KEY";
pub const TOKEN_PRIVATE_KEY_ENV: &str = "TOKEN_PRIVATE_KEY";
pub const API_ROOT_ENV: &str = "API_ROOT";
pub const ISSUE_CODE_URL_ENV: &str = "ISSUE_CODE_URL";
pub const SITE_CONFIG_URL_ENV: &str = "SITE_CONFIG_URL";
pub const PROPERTY_ID_ENV: &str = "PROPERTY_ID";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid port: {value}")]
    InvalidPort { var: &'static str, value: String },
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid bind address {0}")]
    InvalidBindAddress(String),
    #[error("{0} is set but {1} is not")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Remote site-config source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfigSource {
    pub url: Url,
    pub property_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub public_key_pem: String,
    pub private_key_pem: Option<String>,
    pub api_root: Option<Url>,
    pub issue_code_url: Option<Url>,
    pub site_config: Option<SiteConfigSource>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let site_config = match (parse_url(SITE_CONFIG_URL_ENV, get(SITE_CONFIG_URL_ENV))?, get(PROPERTY_ID_ENV)) {
            (Some(url), Some(property_id)) => Some(SiteConfigSource { url, property_id }),
            (Some(_), None) => return Err(ConfigError::Incomplete(SITE_CONFIG_URL_ENV, PROPERTY_ID_ENV)),
            (None, _) => None,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            data_dir: get(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            public_key_pem: get(TOKEN_PUBLIC_KEY_ENV)
                .map(|pem| unescape_pem(&pem))
                .unwrap_or_else(|| PROPERTY_PUBLIC_KEY.to_string()),
            private_key_pem: get(TOKEN_PRIVATE_KEY_ENV).map(|pem| unescape_pem(&pem)),
            api_root: parse_url(API_ROOT_ENV, get(API_ROOT_ENV))?,
            issue_code_url: parse_url(ISSUE_CODE_URL_ENV, get(ISSUE_CODE_URL_ENV))?,
            site_config,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidBindAddress(addr))
    }
}

fn parse_url(var: &'static str, value: Option<String>) -> Result<Option<Url>, ConfigError> {
    value
        .map(|v| Url::parse(v.trim()).map_err(|source| ConfigError::InvalidUrl { var, source }))
        .transpose()
}

fn unescape_pem(pem: &str) -> String {
    pem.replace("\\n", "\n")
}
