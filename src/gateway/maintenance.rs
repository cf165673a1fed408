// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::routes::RoutePolicy;
use crate::api::GatewayError;

/// Downtime switch; whitelisted routes stay reachable while it is on
pub struct MaintenanceGate {
    policy: Arc<RoutePolicy>,
    enabled: AtomicBool,
}

impl MaintenanceGate {
    pub fn new(policy: Arc<RoutePolicy>, enabled: bool) -> Self {
        Self {
            policy,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn check(&self, path: &str) -> Result<(), GatewayError> {
        if self.is_enabled() && self.policy.is_bypass_downtime(path) {
            warn!("Rejecting {} during maintenance", path);
            return Err(GatewayError::MaintenanceMode);
        }
        Ok(())
    }
}

pub async fn maintenance_middleware(
    State(gate): State<Arc<MaintenanceGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check(request.uri().path()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
