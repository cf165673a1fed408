// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::common::*;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn test_maintenance_blocks_non_whitelisted_routes() {
    let gw = GatewayBuilder::new().build().await;
    let token = gw.web_login(&["USER"]).await;
    gw.maintenance.set_enabled(true);

    let response = gw.send(request(Method::GET, SECURED_PATH, Some(&token), Vec::new())).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["msgHeader"]["responseCode"], "503");
    assert!(body["msgHeader"]["errorId"].is_string());
    assert!(gw.upstream.seen().is_empty());
}

#[tokio::test]
async fn test_maintenance_keeps_whitelist_reachable() {
    let gw = GatewayBuilder::new().build().await;
    gw.maintenance.set_enabled(true);

    let response = gw
        .send(request(Method::GET, "/common/v1/publickey", None, Vec::new()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = gw.send(request(Method::GET, "/health", None, Vec::new())).await;
    assert_eq!(response.status(), StatusCode::OK);

    gw.maintenance.set_enabled(false);
    let response = gw
        .send(request(Method::POST, "/auth/v1/login", None, b"{}".to_vec()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
