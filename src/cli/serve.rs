// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::{start_server, GatewayComponents};
use crate::clients::{HttpProfileClient, InMemorySessionStore};
use crate::config::GatewayConfig;
use crate::gateway::{HttpUpstream, JwtValidator, MaintenanceGate};
use crate::keys::{FileKeyStore, KeyManager, KeyStore};

/// Arguments for the serve command
///
/// Every flag can also come from its `GATEWAY_*` environment variable and
/// takes precedence over the config file.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "GATEWAY_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Backend base URL
    #[arg(long, env = "GATEWAY_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    #[arg(long, env = "GATEWAY_PROFILE_SERVICE_URL")]
    pub profile_service_url: Option<String>,

    /// Value of the X-APP-PLATFORM header sent to the profile service
    #[arg(long, env = "GATEWAY_APP_PLATFORM")]
    pub app_platform: Option<String>,

    /// HMAC secret for bearer tokens
    #[arg(long, env = "GATEWAY_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "GATEWAY_KEY_STORE_PATH")]
    pub key_store_path: Option<PathBuf>,

    #[arg(long, env = "GATEWAY_REUSE_PERSISTED_KEY")]
    pub reuse_persisted_key: Option<bool>,

    #[arg(long, env = "GATEWAY_MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    #[arg(long, env = "GATEWAY_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    #[arg(long, env = "GATEWAY_MAINTENANCE_MODE")]
    pub maintenance_mode: Option<bool>,
}

impl ServeArgs {
    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(v) = &self.listen_addr {
            config.listen_addr = v.clone();
        }
        if let Some(v) = &self.upstream_url {
            config.upstream_url = v.clone();
        }
        if let Some(v) = &self.profile_service_url {
            config.profile_service_url = v.clone();
        }
        if let Some(v) = &self.app_platform {
            config.app_platform = v.clone();
        }
        if let Some(v) = &self.jwt_secret {
            config.jwt_secret = v.clone();
        }
        if let Some(v) = &self.key_store_path {
            config.key_store_path = v.clone();
        }
        if let Some(v) = self.reuse_persisted_key {
            config.reuse_persisted_key = v;
        }
        if let Some(v) = self.max_body_bytes {
            config.max_body_bytes = v;
        }
        if let Some(v) = self.request_timeout_ms {
            config.request_timeout_ms = v;
        }
        if let Some(v) = self.maintenance_mode {
            config.maintenance_mode = v;
        }
    }

    pub fn resolve(&self) -> Result<GatewayConfig> {
        let mut config = GatewayConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// Build the filter chain from configuration and serve until shutdown
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.resolve().context("Invalid gateway configuration")?;
    let addr = config.socket_addr()?;

    println!("🚀 Starting Secure Gateway...\n");
    println!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    println!("🔗 Upstream: {}", config.upstream_url);
    println!();

    // Key material is created and persisted before anything listens
    let store: Arc<dyn KeyStore> = Arc::new(FileKeyStore::new(&config.key_store_path));
    let keys = if config.reuse_persisted_key {
        KeyManager::recover(store).await
    } else {
        KeyManager::initialize(store).await
    }
    .with_context(|| {
        format!(
            "Could not persist gateway key pair to {}",
            config.key_store_path.display()
        )
    })?;
    let keys = Arc::new(keys);
    println!("🔑 Gateway key pair ready ({})", config.key_store_path.display());

    let policy = Arc::new(config.routes.clone());
    let profiles = HttpProfileClient::new(
        config.profile_service_url.clone(),
        &config.app_platform,
        config.request_timeout(),
    )?;
    let upstream = HttpUpstream::new(&config.upstream_url, config.request_timeout(), config.max_body_bytes)?;
    let maintenance = Arc::new(MaintenanceGate::new(policy.clone(), config.maintenance_mode));
    if config.maintenance_mode {
        warn!("Maintenance mode is ON, only whitelisted routes are served");
    }

    let components = GatewayComponents {
        keys: keys.clone(),
        policy,
        validator: Arc::new(JwtValidator::new(config.jwt_secret.as_bytes())),
        profiles: Arc::new(profiles),
        sessions: Arc::new(InMemorySessionStore::new()),
        upstream: Arc::new(upstream),
        maintenance,
        max_body_bytes: config.max_body_bytes,
    };

    spawn_rotation_on_hangup(keys);

    tokio::select! {
        result = start_server(addr, components) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}

/// Rotate the gateway key pair on SIGHUP
#[cfg(unix)]
fn spawn_rotation_on_hangup(keys: Arc<KeyManager>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                error!("Could not install SIGHUP handler, key rotation disabled: {}", e);
                return;
            }
        };
        while hangup.recv().await.is_some() {
            match keys.rotate().await {
                Ok(key_pair) => info!("Rotated gateway key pair on SIGHUP, new id {}", key_pair.id),
                Err(e) => error!("Key rotation failed, keeping current key pair: {}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_rotation_on_hangup(_keys: Arc<KeyManager>) {}
