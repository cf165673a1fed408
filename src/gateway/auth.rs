// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bearer token authentication and route authorization
//!
//! A pure gate: it either lets the request continue unchanged or answers
//! with a status. Steps run in a fixed order and the first failure wins.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::routes::RoutePolicy;
use super::token::{extract_bearer_token, Role, TokenValidator};
use crate::api::GatewayError;
use crate::clients::{ProfileClient, SessionStore};

pub struct AuthFilter {
    policy: Arc<RoutePolicy>,
    validator: Arc<dyn TokenValidator>,
    profiles: Arc<dyn ProfileClient>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthFilter {
    pub fn new(
        policy: Arc<RoutePolicy>,
        validator: Arc<dyn TokenValidator>,
        profiles: Arc<dyn ProfileClient>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            policy,
            validator,
            profiles,
            sessions,
        }
    }

    /// Decide whether a request for `path` carrying `headers` may continue
    pub async fn authorize(&self, path: &str, headers: &HeaderMap) -> Result<(), GatewayError> {
        if !self.policy.is_secured(path) {
            debug!("Open route {}, skipping authentication", path);
            return Ok(());
        }

        let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let token = extract_bearer_token(header).ok_or_else(|| {
            warn!("Missing or empty bearer token for {}", path);
            GatewayError::MissingToken
        })?;

        let status = self.validator.validate(token);
        if status != StatusCode::OK {
            warn!("Token rejected for {} with status {}", path, status);
            return Err(GatewayError::InvalidToken { status });
        }

        let claims = self.validator.extract_claims(token).map_err(|e| {
            error!("Claims extraction failed after validation on {}: {}", path, e);
            e
        })?;
        let roles = claims.sorted_roles();

        if !self.check_access_roles(path, &claims.roles) {
            warn!(
                "Access denied for user {} with roles {:?} on {}",
                claims.user_id, roles, path
            );
            return Err(GatewayError::RoleDenied {
                path: path.to_string(),
                roles,
            });
        }

        let profile = self
            .profiles
            .query_user_profile(&claims.user_id)
            .await
            .map_err(|e| {
                error!("Profile lookup failed for user {}: {}", claims.user_id, e);
                GatewayError::ProfileLookupFailed(e.to_string())
            })?;
        if profile.is_none() {
            warn!("User {} not found in profile service", claims.user_id);
            return Err(GatewayError::IdentityNotFound(claims.user_id));
        }

        let session = if claims.is_web_session {
            self.sessions.find_web_session(token).await
        } else {
            self.sessions.find_mobile_session(token).await
        }
        .map_err(|e| {
            error!("Session lookup failed for user {}: {}", claims.user_id, e);
            GatewayError::SessionLookupFailed(e.to_string())
        })?;

        match session {
            Some(record) if record.user_id == claims.user_id => {
                info!(
                    "✅ Authenticated user {} with roles {:?} on {} (web: {})",
                    claims.user_id, roles, path, claims.is_web_session
                );
                Ok(())
            }
            Some(record) => {
                warn!(
                    "Session for token belongs to user {}, token claims user {}",
                    record.user_id, claims.user_id
                );
                Err(GatewayError::SessionMismatch(claims.user_id))
            }
            None => {
                warn!(
                    "No current {} session for user {}",
                    if claims.is_web_session { "web" } else { "mobile" },
                    claims.user_id
                );
                Err(GatewayError::SessionMismatch(claims.user_id))
            }
        }
    }

    /// Role rules in precedence order: TEMP+USER is limited to temporary
    /// routes, PRE_2FA to pre-2FA routes, everything else needs USER on
    /// secured routes.
    pub fn check_access_roles(&self, path: &str, roles: &HashSet<String>) -> bool {
        let has = |role: Role| roles.contains(role.as_str());

        if has(Role::Temp) && has(Role::User) {
            return self.policy.is_temporary(path);
        }
        if has(Role::Pre2fa) {
            return self.policy.is_pre_2fa(path);
        }
        if self.policy.is_secured(path) {
            return has(Role::User);
        }
        true
    }
}

pub async fn auth_middleware(
    State(filter): State<Arc<AuthFilter>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match filter.authorize(&path, request.headers()).await {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
