// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User profile service client
//!
//! The gateway only needs to know whether a user exists; the profile
//! payload is kept as loosely typed JSON.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile request failed: {0}")]
    Transport(String),

    #[error("Profile service returned status {0}")]
    Status(u16),

    #[error("Profile response could not be parsed: {0}")]
    Parse(String),
}

#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// `Ok(None)` means the service answered and the user does not exist
    async fn query_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError>;
}

pub struct HttpProfileClient {
    client: reqwest::Client,
    url: String,
}

impl HttpProfileClient {
    pub fn new(url: impl Into<String>, app_platform: &str, timeout: Duration) -> Result<Self, ProfileError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-app-platform",
            HeaderValue::from_str(app_platform).map_err(|e| ProfileError::Transport(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProfileError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn query_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        info!("Querying user profile for userId: {}", user_id);

        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await
            .map_err(|e| {
                error!("Profile service call failed: {}", e);
                ProfileError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProfileError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProfileError::Transport(e.to_string()))?;
        let profile = parse_profile(&body)?;
        debug!("Profile service answered for userId {}: found={}", user_id, profile.is_some());
        Ok(profile)
    }
}

/// Empty body and JSON `null` both mean "no such user"
pub fn parse_profile(body: &[u8]) -> Result<Option<UserProfile>, ProfileError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<UserProfile>>(body).map_err(|e| ProfileError::Parse(e.to_string()))
}
