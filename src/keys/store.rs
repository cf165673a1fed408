// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Key pair persistence
//!
//! Persistence exists for audit and recovery; the gateway never reads the
//! store on the request path.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::key_pair::{KeyPair, KeyPairRecord};
use super::KeyError;

#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn save(&self, key_pair: &KeyPair) -> Result<(), KeyError>;

    /// Most recently saved pair, if any
    async fn find_latest(&self) -> Result<Option<KeyPair>, KeyError>;
}

/// Process-local store, contents are lost on restart
#[derive(Clone, Default)]
pub struct InMemoryKeyStore {
    records: Arc<RwLock<Vec<KeyPairRecord>>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn save(&self, key_pair: &KeyPair) -> Result<(), KeyError> {
        self.records.write().await.push(key_pair.to_record());
        Ok(())
    }

    async fn find_latest(&self) -> Result<Option<KeyPair>, KeyError> {
        match self.records.read().await.last() {
            Some(record) => KeyPair::from_record(record).map(Some),
            None => Ok(None),
        }
    }
}

/// Append-only JSON-lines file, one record per generated pair
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn save(&self, key_pair: &KeyPair) -> Result<(), KeyError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| KeyError::Persistence(format!("create {:?}: {}", parent, e)))?;
        }

        let mut line = serde_json::to_string(&key_pair.to_record())
            .map_err(|e| KeyError::Persistence(e.to_string()))?;
        line.push('\n');

        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| KeyError::Persistence(format!("open {:?}: {}", self.path, e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| KeyError::Persistence(format!("write {:?}: {}", self.path, e)))?;
        file.sync_all()
            .await
            .map_err(|e| KeyError::Persistence(format!("sync {:?}: {}", self.path, e)))?;
        Ok(())
    }

    async fn find_latest(&self) -> Result<Option<KeyPair>, KeyError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(KeyError::Persistence(format!("read {:?}: {}", self.path, e))),
        };

        match content.lines().rev().find(|line| !line.trim().is_empty()) {
            Some(line) => {
                let record: KeyPairRecord = serde_json::from_str(line)
                    .map_err(|e| KeyError::Corrupt(e.to_string()))?;
                KeyPair::from_record(&record).map(Some)
            }
            None => Ok(None),
        }
    }
}
