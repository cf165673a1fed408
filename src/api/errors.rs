// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::response::ApiResponse;
use crate::crypto::CryptoError;
use crate::keys::KeyError;

/// Error code carried by every encryption/decryption failure envelope
pub const CRYPTO_FAILURE_CODE: &str = "EXTGW02";

/// Message carried by every encryption/decryption failure envelope
pub const CRYPTO_FAILURE_MESSAGE: &str = "Failed to process encrypted payload";

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Bearer token is missing or empty")]
    MissingToken,

    #[error("Bearer token rejected with status {status}")]
    InvalidToken { status: StatusCode },

    #[error("Access denied for roles {roles:?} on {path}")]
    RoleDenied { path: String, roles: Vec<String> },

    #[error("User profile lookup failed: {0}")]
    ProfileLookupFailed(String),

    #[error("User {0} does not exist")]
    IdentityNotFound(String),

    #[error("Session lookup failed: {0}")]
    SessionLookupFailed(String),

    #[error("Presented token does not match the current session of user {0}")]
    SessionMismatch(String),

    #[error("Gateway key material unavailable: {0}")]
    MissingKeyMaterial(String),

    #[error("Malformed encrypted envelope: {0}")]
    EnvelopeMalformed(String),

    #[error("Request decryption failed")]
    DecryptionFailed,

    #[error("Response encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Service is under maintenance")]
    MaintenanceMode,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingToken | GatewayError::RoleDenied { .. } => StatusCode::FORBIDDEN,
            GatewayError::InvalidToken { status } => *status,
            GatewayError::IdentityNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::SessionMismatch(_) => StatusCode::CONFLICT,
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::MaintenanceMode => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::ProfileLookupFailed(_)
            | GatewayError::SessionLookupFailed(_)
            | GatewayError::MissingKeyMaterial(_)
            | GatewayError::EnvelopeMalformed(_)
            | GatewayError::DecryptionFailed
            | GatewayError::EncryptionFailed(_)
            | GatewayError::InternalInvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Crypto and key failures answer with the fixed `EXTGW02` envelope
    pub fn is_crypto_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingKeyMaterial(_)
                | GatewayError::EnvelopeMalformed(_)
                | GatewayError::DecryptionFailed
                | GatewayError::EncryptionFailed(_)
        )
    }

    /// Structured body for this error, `None` when the status alone is sent
    pub fn to_response(&self) -> Option<ApiResponse<()>> {
        if self.is_crypto_failure() {
            return Some(ApiResponse::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                Uuid::new_v4().to_string(),
                CRYPTO_FAILURE_CODE,
                CRYPTO_FAILURE_MESSAGE,
            ));
        }
        match self {
            GatewayError::InternalInvariantViolation(_) | GatewayError::MaintenanceMode => {
                Some(ApiResponse::failure_for_status(self.status_code()))
            }
            _ => None,
        }
    }
}

impl From<KeyError> for GatewayError {
    fn from(err: KeyError) -> Self {
        GatewayError::MissingKeyMaterial(err.to_string())
    }
}

impl From<CryptoError> for GatewayError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::DecryptionFailed => GatewayError::DecryptionFailed,
            CryptoError::InvalidEncoding { .. } => GatewayError::EnvelopeMalformed(err.to_string()),
            CryptoError::EncryptionFailed { .. } | CryptoError::InvalidKey { .. } => {
                GatewayError::EncryptionFailed(err.to_string())
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.to_response() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}
