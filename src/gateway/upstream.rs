// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Forwarding to the backend
//!
//! The gateway sits in front of a single backend base URL. Method, path,
//! query, end-to-end headers and body are passed through unchanged.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    response::Response,
};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::api::GatewayError;

const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, request: Request) -> Result<Response, GatewayError>;
}

pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
    max_body_bytes: usize,
}

impl HttpUpstream {
    pub fn new(base_url: &str, timeout: Duration, max_body_bytes: usize) -> Result<Self, GatewayError> {
        Url::parse(base_url)
            .map_err(|e| GatewayError::UpstreamUnavailable(format!("invalid upstream URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_body_bytes,
        })
    }

    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

fn unavailable(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::UpstreamUnavailable(err.to_string())
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(&self, request: Request) -> Result<Response, GatewayError> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, self.max_body_bytes).await.map_err(unavailable)?;

        let path_and_query = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let url = self.target_url(path_and_query);
        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes()).map_err(unavailable)?;
        debug!("Forwarding {} {}", method, url);

        let mut outbound = self.client.request(method, &url);
        for (name, value) in parts.headers.iter() {
            if !is_hop_by_hop(name.as_str()) {
                outbound = outbound.header(name.as_str(), value.as_bytes());
            }
        }

        let upstream = outbound.body(body.to_vec()).send().await.map_err(|e| {
            error!("Upstream request to {} failed: {}", url, e);
            unavailable(e)
        })?;

        let status = StatusCode::from_u16(upstream.status().as_u16()).map_err(unavailable)?;
        let mut response = Response::builder().status(status);
        for (name, value) in upstream.headers().iter() {
            if !is_hop_by_hop(name.as_str()) {
                response = response.header(name.as_str(), value.as_bytes());
            }
        }

        let bytes = upstream.bytes().await.map_err(unavailable)?;
        debug!("Upstream answered {} ({} bytes)", status, bytes.len());
        response.body(Body::from(bytes)).map_err(unavailable)
    }
}
