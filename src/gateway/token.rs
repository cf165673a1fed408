// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bearer token validation and claims

use axum::http::StatusCode;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::api::GatewayError;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Roles that take part in route authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Temp,
    Pre2fa,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Temp => "TEMP",
            Role::Pre2fa => "PRE_2FA",
        }
    }
}

/// Identity extracted from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub is_web_session: bool,
    pub roles: HashSet<String>,
}

impl TokenClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.as_str())
    }

    /// Roles in a stable order, for logs and error values
    pub fn sorted_roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = self.roles.iter().cloned().collect();
        roles.sort();
        roles
    }
}

/// JWT payload as issued by the login service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    #[serde(rename = "userId", alias = "sub")]
    pub user_id: String,
    #[serde(rename = "isWeb", default)]
    pub is_web: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

pub trait TokenValidator: Send + Sync {
    /// Structural, signature and expiry check. `StatusCode::OK` means valid;
    /// anything else is the status to answer with.
    fn validate(&self, token: &str) -> StatusCode;

    /// Claims of a token that already passed [`validate`](Self::validate)
    fn extract_claims(&self, token: &str) -> Result<TokenClaims, GatewayError>;
}

/// HMAC-SHA256 JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenValidator for JwtValidator {
    fn validate(&self, token: &str) -> StatusCode {
        // Claims are decoded here too, so a signed token with the wrong shape is rejected
        match decode::<JwtClaims>(token, &self.decoding_key, &self.validation) {
            Ok(_) => StatusCode::OK,
            Err(e) => {
                tracing::warn!("JWT validation failed: {:?}", e.kind());
                status_for(e.kind())
            }
        }
    }

    fn extract_claims(&self, token: &str) -> Result<TokenClaims, GatewayError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            GatewayError::InternalInvariantViolation(format!(
                "claims unreadable after validation: {}",
                e
            ))
        })?;

        Ok(TokenClaims {
            user_id: data.claims.user_id,
            is_web_session: data.claims.is_web,
            roles: data.claims.roles.into_iter().collect(),
        })
    }
}

fn status_for(kind: &ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ExpiredSignature | ErrorKind::InvalidSignature | ErrorKind::ImmatureSignature => {
            StatusCode::UNAUTHORIZED
        }
        _ => StatusCode::FORBIDDEN,
    }
}

/// Token carried by an `Authorization: Bearer <token>` header value
///
/// Returns `None` for a missing header, a different scheme, or an empty
/// token after the prefix.
pub fn extract_bearer_token(header_value: Option<&str>) -> Option<&str> {
    let token = header_value?.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
