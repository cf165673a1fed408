// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request decryption and response encryption
//!
//! Wraps every secured route. The request body is buffered in full and
//! opened with the active key pair; the response body is buffered in full
//! and sealed to the client key learned on the way in, producing exactly
//! one envelope per response.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{
        header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::context::{ClientKey, ExchangeContext};
use super::routes::RoutePolicy;
use crate::api::GatewayError;
use crate::crypto::{decode_field, decrypt_with_shared, encrypt_with_shared, CryptoError, IncomingEnvelope};
use crate::keys::KeyManager;

pub struct EncryptionFilter {
    keys: Arc<KeyManager>,
    policy: Arc<RoutePolicy>,
    max_body_bytes: usize,
}

impl EncryptionFilter {
    pub fn new(keys: Arc<KeyManager>, policy: Arc<RoutePolicy>, max_body_bytes: usize) -> Self {
        Self {
            keys,
            policy,
            max_body_bytes,
        }
    }

    /// Snapshot the active key pair for one exchange
    pub async fn begin_exchange(&self) -> Result<ExchangeContext, GatewayError> {
        let key_pair = self.keys.active_key_pair().await.map_err(|e| {
            error!("No active key pair for exchange: {}", e);
            GatewayError::from(e)
        })?;
        Ok(ExchangeContext::new(key_pair))
    }

    /// Plaintext for the downstream request
    ///
    /// An empty body, or an envelope without cipher text, passes through as
    /// an empty body. A bodyless envelope that still names a public key
    /// records it, so the response can be sealed.
    pub fn decrypt_request(&self, body: &[u8], ctx: &ExchangeContext) -> Result<Vec<u8>, GatewayError> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            debug!("Empty request body, nothing to decrypt");
            return Ok(Vec::new());
        }

        let incoming: IncomingEnvelope = serde_json::from_slice(body).map_err(|e| {
            warn!("Request body is not an encrypted envelope: {}", e);
            GatewayError::EnvelopeMalformed(format!("invalid envelope JSON: {}", e))
        })?;

        if incoming.is_bodyless() {
            debug!("Envelope without cipher text, forwarding empty body");
            if let Some(public_key) = incoming.public_key.as_deref().filter(|v| !v.trim().is_empty()) {
                let public_key = decode_field("publicKey", public_key)?;
                let client = ClientKey::derive(&public_key, ctx.key_pair())
                    .map_err(|e| GatewayError::EnvelopeMalformed(e.to_string()))?;
                ctx.record_client_key(client)?;
            }
            return Ok(Vec::new());
        }

        let envelope = incoming.complete().map_err(|presence| {
            warn!(
                "Incomplete envelope (cipherText: {}, publicKey: {}, nonce: {})",
                presence.cipher_text, presence.public_key, presence.nonce
            );
            GatewayError::EnvelopeMalformed("missing envelope fields".to_string())
        })?;
        let decoded = envelope.decode()?;

        let client = ClientKey::derive(&decoded.public_key, ctx.key_pair())
            .map_err(|_| GatewayError::DecryptionFailed)?;
        let plaintext = decrypt_with_shared(&decoded.cipher_text, &decoded.nonce, &client.shared_key)
            .map_err(|e| {
                warn!("Request decryption failed: {}", e);
                GatewayError::from(e)
            })?;
        ctx.record_client_key(client)?;

        debug!("Decrypted request body ({} bytes)", plaintext.len());
        Ok(plaintext)
    }

    /// Serialized envelope sealing `plaintext` to the exchange's client key
    pub fn encrypt_response(&self, plaintext: &[u8], ctx: &ExchangeContext) -> Result<Vec<u8>, GatewayError> {
        let client = ctx.client_key().ok_or_else(|| {
            GatewayError::EncryptionFailed("no client public key recorded for this exchange".to_string())
        })?;

        let envelope = encrypt_with_shared(plaintext, &client.shared_key, ctx.key_pair().public_key())?;
        serde_json::to_vec(&envelope).map_err(|e| {
            GatewayError::from(CryptoError::EncryptionFailed {
                reason: e.to_string(),
            })
        })
    }

    async fn process(&self, request: Request, next: Next) -> Result<Response, GatewayError> {
        let ctx = self.begin_exchange().await?;

        let (mut parts, body) = request.into_parts();
        let buffered = to_bytes(body, self.max_body_bytes).await.map_err(|e| {
            GatewayError::EnvelopeMalformed(format!("request body unreadable: {}", e))
        })?;
        let plaintext = self.decrypt_request(&buffered, &ctx)?;
        set_length(&mut parts.headers, plaintext.len());
        // The sealed response is always identity-encoded JSON
        parts.headers.remove(ACCEPT_ENCODING);

        let response = next.run(Request::from_parts(parts, Body::from(plaintext))).await;

        let (mut parts, body) = response.into_parts();
        let buffered = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| GatewayError::EncryptionFailed(format!("response body unreadable: {}", e)))?;
        if buffered.is_empty() {
            debug!("Empty response body, nothing to encrypt");
            return Ok(Response::from_parts(parts, Body::empty()));
        }

        let sealed = self.encrypt_response(&buffered, &ctx)?;
        parts.headers.remove(CONTENT_ENCODING);
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        set_length(&mut parts.headers, sealed.len());
        Ok(Response::from_parts(parts, Body::from(sealed)))
    }
}

fn set_length(headers: &mut HeaderMap, len: usize) {
    headers.remove(TRANSFER_ENCODING);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
}

pub async fn encryption_middleware(
    State(filter): State<Arc<EncryptionFilter>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !filter.policy.is_secured(&path) {
        return next.run(request).await;
    }

    match filter.process(request, next).await {
        Ok(response) => {
            info!("🔐 Encrypted exchange completed for {}", path);
            response
        }
        Err(e) => {
            error!("Encrypted exchange failed for {}: {}", path, e);
            e.into_response()
        }
    }
}
