// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Envelope handling on secured routes

use crate::common::*;
use async_trait::async_trait;
use axum::http::{header::CONTENT_LENGTH, Method, StatusCode};
use secure_gateway::{
    api::{CRYPTO_FAILURE_CODE, CRYPTO_FAILURE_MESSAGE},
    crypto::{EncryptedEnvelope, TAG_LEN},
    keys::{KeyError, KeyPair, KeyStore},
};

struct UnwritableStore;

#[async_trait]
impl KeyStore for UnwritableStore {
    async fn save(&self, _key_pair: &KeyPair) -> Result<(), KeyError> {
        Err(KeyError::Persistence("read-only filesystem".to_string()))
    }

    async fn find_latest(&self) -> Result<Option<KeyPair>, KeyError> {
        Ok(None)
    }
}

async fn assert_crypto_failure(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["msgHeader"]["responseCode"], CRYPTO_FAILURE_CODE);
    assert_eq!(body["msgHeader"]["responseMessage"], CRYPTO_FAILURE_MESSAGE);
    assert!(body["msgHeader"]["errorId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("msgBody").is_none());
}

#[tokio::test]
async fn test_empty_cipher_text_forwarded_as_empty_body() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    let body = br#"{"cipherText":"","publicKey":"","nonce":""}"#.to_vec();

    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let seen = gw.upstream.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1.is_empty());
}

#[tokio::test]
async fn test_decrypted_body_reaches_upstream_with_new_length() {
    let gw = GatewayBuilder::new()
        .upstream(RecordingUpstream::replying(|_| br#"{"ok":true}"#.to_vec()))
        .build()
        .await;
    let token = gw.web_login(&["USER"]).await;
    let client = Client::new();
    let plaintext = br#"{"amount":125,"currency":"MYR"}"#;
    let sealed = client.seal(plaintext, &gw.gateway_public_key().await);

    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), sealed)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(gw.upstream.seen()[0].1, plaintext.to_vec());

    let declared: usize = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap();
    let body = body_bytes(response).await;
    assert_eq!(declared, body.len());
    assert_eq!(client.open(&body), br#"{"ok":true}"#);
}

#[tokio::test]
async fn test_missing_nonce_rejected_before_upstream() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    let client = Client::new();
    let sealed = client.seal(b"{}", &gw.gateway_public_key().await);
    let mut envelope: serde_json::Value = serde_json::from_slice(&sealed).unwrap();
    envelope.as_object_mut().unwrap().remove("nonce");

    let response = gw
        .send(request(
            Method::POST,
            SECURED_PATH,
            Some(&token),
            serde_json::to_vec(&envelope).unwrap(),
        ))
        .await;

    assert_crypto_failure(response).await;
    assert!(gw.upstream.seen().is_empty());
}

#[tokio::test]
async fn test_tampered_cipher_text_rejected() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    let client = Client::new();
    let sealed = client.seal(br#"{"op":"ping"}"#, &gw.gateway_public_key().await);

    let envelope: EncryptedEnvelope = serde_json::from_slice(&sealed).unwrap();
    let mut decoded = envelope.decode().unwrap();
    assert_eq!(decoded.cipher_text.len(), br#"{"op":"ping"}"#.len() + TAG_LEN);
    decoded.cipher_text[0] ^= 0x01;
    let tampered = EncryptedEnvelope::from_bytes(&decoded.cipher_text, &decoded.public_key, &decoded.nonce);

    let response = gw
        .send(request(
            Method::POST,
            SECURED_PATH,
            Some(&token),
            serde_json::to_vec(&tampered).unwrap(),
        ))
        .await;

    assert_crypto_failure(response).await;
    assert!(gw.upstream.seen().is_empty());
}

#[tokio::test]
async fn test_non_json_body_rejected() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;

    let response = gw
        .send(request(Method::POST, SECURED_PATH, Some(&token), b"plain text".to_vec()))
        .await;

    assert_crypto_failure(response).await;
}

#[tokio::test]
async fn test_response_without_client_key_is_not_sent_in_plaintext() {
    let gw = GatewayBuilder::new()
        .upstream(RecordingUpstream::replying(|_| br#"{"secret":"balance"}"#.to_vec()))
        .build()
        .await;
    let token = gw.web_login(&["USER"]).await;

    // Bodyless GET: nothing tells the gateway who to encrypt for
    let response = gw.send(request(Method::GET, SECURED_PATH, Some(&token), Vec::new())).await;

    assert_eq!(gw.upstream.seen().len(), 1);
    let status = response.status();
    let body = body_bytes(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!String::from_utf8_lossy(&body).contains("balance"));
}

#[tokio::test]
async fn test_missing_key_material_yields_failure_envelope() {
    let gw = GatewayBuilder::new().key_store(UnwritableStore).build().await;
    let token = gw.web_login(&["USER"]).await;

    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), b"{}".to_vec())).await;

    assert_crypto_failure(response).await;
    assert!(gw.upstream.seen().is_empty());
}

#[tokio::test]
async fn test_request_sealed_to_rotated_key_fails() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    let client = Client::new();
    let old_public = gw.gateway_public_key().await;

    gw.keys.rotate().await.unwrap();
    assert_ne!(gw.gateway_public_key().await, old_public);
    assert_eq!(gw.key_store.count().await, 2);

    let stale = client.seal(br#"{"op":"ping"}"#, &old_public);
    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), stale)).await;
    assert_crypto_failure(response).await;

    let fresh = client.seal(br#"{"op":"ping"}"#, &gw.gateway_public_key().await);
    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), fresh)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.open(&body_bytes(response).await), br#"{"op":"pong"}"#);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    let body = vec![b' '; 128 * 1024];

    let response = gw.send(request(Method::POST, SECURED_PATH, Some(&token), body)).await;
    assert_crypto_failure(response).await;
}

#[tokio::test]
async fn test_sealed_response_drops_backend_content_encoding() {
    let gw = GatewayBuilder::new()
        .upstream(RecordingUpstream::ping_pong().with_reply_header("content-encoding", "gzip"))
        .build()
        .await;
    let token = gw.web_login(&["USER"]).await;
    let client = Client::new();
    let sealed = client.seal(br#"{"op":"ping"}"#, &gw.gateway_public_key().await);

    let mut req = request(Method::POST, SECURED_PATH, Some(&token), sealed);
    req.headers_mut()
        .insert("accept-encoding", "gzip, br".parse().unwrap());
    let response = gw.send(req).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(client.open(&body_bytes(response).await), br#"{"op":"pong"}"#);

    // The backend is never invited to compress a body the gateway must seal
    let headers = gw.upstream.seen_headers();
    assert_eq!(headers.len(), 1);
    assert!(headers[0].get("accept-encoding").is_none());
}
