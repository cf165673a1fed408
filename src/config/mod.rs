// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration
//!
//! Resolved in layers: built-in defaults, then an optional TOML file, then
//! environment variables and command line flags (see [`crate::cli`]).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::gateway::RoutePolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub listen_addr: String,
    pub upstream_url: String,
    pub profile_service_url: String,
    pub app_platform: String,
    pub jwt_secret: String,
    pub key_store_path: PathBuf,
    /// Reuse the newest persisted key pair at startup instead of generating one
    pub reuse_persisted_key: bool,
    pub max_body_bytes: usize,
    pub request_timeout_ms: u64,
    pub maintenance_mode: bool,
    pub routes: RoutePolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            upstream_url: "http://127.0.0.1:8081".to_string(),
            profile_service_url: "http://127.0.0.1:8082/user/v1/profile".to_string(),
            app_platform: "WEB".to_string(),
            jwt_secret: String::new(),
            key_store_path: PathBuf::from("./data/gateway-keys.jsonl"),
            reuse_persisted_key: false,
            max_body_bytes: 10 * 1024 * 1024,
            request_timeout_ms: 30_000,
            maintenance_mode: false,
            routes: RoutePolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overlaid with the file at `path`; fields missing from the
    /// file keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the file at `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        check_url("upstream_url", &self.upstream_url)?;
        check_url("profile_service_url", &self.profile_service_url)?;

        if self.jwt_secret.trim().is_empty() {
            return Err(invalid("jwt_secret", "must not be empty"));
        }
        if self.app_platform.trim().is_empty() {
            return Err(invalid("app_platform", "must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(invalid("max_body_bytes", "must be greater than zero"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("listen_addr", e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, format!("unsupported scheme {}", other))),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
