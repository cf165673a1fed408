// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway filter chain
//!
//! Ordered as axum middleware layers around the upstream forwarder:
//!
//! 1. **Maintenance**: downtime gate
//! 2. **Auth**: bearer token, roles and session checks
//! 3. **Encryption**: envelope decryption in, envelope encryption out
//! 4. **Upstream**: forwards the plaintext exchange to the backend

pub mod auth;
pub mod context;
pub mod encryption;
pub mod maintenance;
pub mod routes;
pub mod token;
pub mod upstream;

pub use auth::{auth_middleware, AuthFilter};
pub use context::{ClientKey, ExchangeContext};
pub use encryption::{encryption_middleware, EncryptionFilter};
pub use maintenance::{maintenance_middleware, MaintenanceGate};
pub use routes::RoutePolicy;
pub use token::{extract_bearer_token, JwtClaims, JwtValidator, Role, TokenClaims, TokenValidator};
pub use upstream::{HttpUpstream, Upstream};
