// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod crypto;
pub mod gateway;
pub mod keys;

pub use api::{create_app, ApiResponse, GatewayComponents, GatewayError};
pub use config::{ConfigError, GatewayConfig};
pub use gateway::{AuthFilter, EncryptionFilter, RoutePolicy};
pub use keys::{KeyManager, KeyPair};
