// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{Request, State},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::errors::GatewayError;
use super::response::ApiResponse;
use crate::clients::{ProfileClient, SessionStore};
use crate::gateway::{
    auth_middleware, encryption_middleware, maintenance_middleware, AuthFilter, EncryptionFilter,
    MaintenanceGate, RoutePolicy, TokenValidator, Upstream,
};
use crate::keys::KeyManager;

/// Everything the filter chain is built from
///
/// Assembled once by the composition root; the router only holds shared
/// references.
#[derive(Clone)]
pub struct GatewayComponents {
    pub keys: Arc<KeyManager>,
    pub policy: Arc<RoutePolicy>,
    pub validator: Arc<dyn TokenValidator>,
    pub profiles: Arc<dyn ProfileClient>,
    pub sessions: Arc<dyn SessionStore>,
    pub upstream: Arc<dyn Upstream>,
    pub maintenance: Arc<MaintenanceGate>,
    pub max_body_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<KeyManager>,
    pub upstream: Arc<dyn Upstream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyPayload {
    pub id: String,
    pub public_key: String,
}

/// Router with the filter chain applied
///
/// Layers run outermost first: trace, maintenance, auth, encryption, then
/// the gateway's own routes or the upstream fallback. `/health` is matched
/// exactly and sits outside the filter chain.
pub fn create_app(components: GatewayComponents) -> Router {
    let auth = Arc::new(AuthFilter::new(
        components.policy.clone(),
        components.validator,
        components.profiles,
        components.sessions,
    ));
    let encryption = Arc::new(EncryptionFilter::new(
        components.keys.clone(),
        components.policy,
        components.max_body_bytes,
    ));

    let state = AppState {
        keys: components.keys,
        upstream: components.upstream,
    };

    let filtered = Router::new()
        // Gateway public key for client-side encryption
        .route("/common/v1/publickey", get(public_key_handler))
        // Everything else goes to the backend
        .fallback(forward_handler)
        .layer(from_fn_with_state(encryption, encryption_middleware))
        .layer(from_fn_with_state(auth, auth_middleware))
        .layer(from_fn_with_state(components.maintenance, maintenance_middleware));

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        .merge(filtered)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, components: GatewayComponents) -> anyhow::Result<()> {
    let app = create_app(components);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn public_key_handler(State(state): State<AppState>) -> Response {
    match state.keys.active_key_pair().await {
        Ok(key_pair) => ApiResponse::success(PublicKeyPayload {
            id: key_pair.id.to_string(),
            public_key: key_pair.public_key_base64(),
        })
        .into_response(),
        Err(e) => {
            error!("Public key requested but no key pair is available: {}", e);
            GatewayError::from(e).into_response()
        }
    }
}

async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    match state.upstream.forward(request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
