// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session records
//!
//! A user has at most one current web token and one current mobile token.
//! A token that is valid but no longer current has been superseded by a
//! newer login elsewhere.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
    pub token_id: String,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Session store unavailable: {0}")]
pub struct SessionStoreError(pub String);

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_web_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError>;
    async fn find_mobile_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError>;
}

/// In-memory session table keyed by token
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    web: Arc<RwLock<HashMap<String, SessionRecord>>>,
    mobile: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `token` the current web session of `user_id`, replacing any previous one
    pub async fn put_web_session(&self, user_id: &str, token: &str) {
        Self::put(&self.web, user_id, token).await;
    }

    /// Make `token` the current mobile session of `user_id`, replacing any previous one
    pub async fn put_mobile_session(&self, user_id: &str, token: &str) {
        Self::put(&self.mobile, user_id, token).await;
    }

    async fn put(table: &RwLock<HashMap<String, SessionRecord>>, user_id: &str, token: &str) {
        let mut table = table.write().await;
        table.retain(|_, record| record.user_id != user_id);
        table.insert(
            token.to_string(),
            SessionRecord {
                user_id: user_id.to_string(),
                token_id: token.to_string(),
            },
        );
        tracing::debug!("Session stored for user {} (total: {})", user_id, table.len());
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find_web_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.web.read().await.get(token).cloned())
    }

    async fn find_mobile_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.mobile.read().await.get(token).cloned())
    }
}
