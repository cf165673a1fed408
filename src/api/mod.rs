// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod response;

pub use errors::{GatewayError, CRYPTO_FAILURE_CODE, CRYPTO_FAILURE_MESSAGE};
pub use http_server::{create_app, start_server, AppState, GatewayComponents, PublicKeyPayload};
pub use response::{ApiResponse, MessageBody, MessageHeader};
