// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway Key Lifecycle
//!
//! Owns the single active key pair of the process. The pair is generated,
//! persisted, and only then cached; callers receive an `Arc` snapshot, so a
//! rotation never changes the key an in-flight exchange already holds.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::key_pair::KeyPair;
use super::store::KeyStore;
use super::KeyError;

pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    active: RwLock<Option<Arc<KeyPair>>>,
}

impl KeyManager {
    /// Create a manager with nothing cached; the first
    /// [`active_key_pair`](Self::active_key_pair) call generates the pair.
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            active: RwLock::new(None),
        }
    }

    /// Generate and persist the startup key pair
    ///
    /// # Errors
    ///
    /// Fails if the pair cannot be persisted. Callers treat this as fatal:
    /// serving a key that cannot be recovered after restart is not allowed.
    pub async fn initialize(store: Arc<dyn KeyStore>) -> Result<Self, KeyError> {
        let manager = Self::new(store);
        manager.active_key_pair().await?;
        Ok(manager)
    }

    /// Reuse the most recently persisted pair, generating one only if the
    /// store is empty
    pub async fn recover(store: Arc<dyn KeyStore>) -> Result<Self, KeyError> {
        match store.find_latest().await? {
            Some(key_pair) => {
                info!(
                    "🔑 Recovered gateway key pair {} (created {})",
                    key_pair.id, key_pair.created_at
                );
                Ok(Self {
                    store,
                    active: RwLock::new(Some(Arc::new(key_pair))),
                })
            }
            None => {
                warn!("No persisted gateway key pair found, generating a new one");
                Self::initialize(store).await
            }
        }
    }

    /// Currently active key pair, generated on first need
    pub async fn active_key_pair(&self) -> Result<Arc<KeyPair>, KeyError> {
        if let Some(active) = self.active.read().await.as_ref() {
            return Ok(active.clone());
        }

        let mut active = self.active.write().await;
        // Another task may have generated it while we waited for the lock
        if let Some(existing) = active.as_ref() {
            return Ok(existing.clone());
        }

        let generated = self.generate_and_persist().await?;
        *active = Some(generated.clone());
        Ok(generated)
    }

    /// Replace the active key pair
    ///
    /// New exchanges pick up the new pair; exchanges that already captured
    /// the previous snapshot complete with it. On persistence failure the
    /// previous pair stays active.
    pub async fn rotate(&self) -> Result<Arc<KeyPair>, KeyError> {
        let mut active = self.active.write().await;
        let generated = self.generate_and_persist().await?;
        if let Some(previous) = active.replace(generated.clone()) {
            info!("🔄 Rotated gateway key pair {} -> {}", previous.id, generated.id);
        }
        Ok(generated)
    }

    async fn generate_and_persist(&self) -> Result<Arc<KeyPair>, KeyError> {
        let key_pair = KeyPair::generate();
        if let Err(e) = self.store.save(&key_pair).await {
            error!("Failed to persist gateway key pair {}: {}", key_pair.id, e);
            return Err(e);
        }
        info!("🔑 Generated gateway key pair {}", key_pair.id);
        Ok(Arc::new(key_pair))
    }
}
