// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Standard success/failure wrapper
//!
//! ```json
//! {
//!   "msgHeader": { "errorId", "timestamp", "responseCode", "responseMessage", "errorMessage" },
//!   "msgBody": { "payload": ... }
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub http_status: Option<StatusCode>,
    pub msg_header: MessageHeader,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub msg_body: Option<MessageBody<T>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_id: Option<String>,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub response_code: String,
    pub response_message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody<T> {
    pub payload: T,
}

impl<T> ApiResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            http_status: Some(StatusCode::OK),
            msg_header: MessageHeader::ok(),
            msg_body: Some(MessageBody { payload }),
        }
    }
}

impl ApiResponse<()> {
    /// Failure with a caller-chosen error id, code and message
    pub fn failure(status: StatusCode, error_id: String, code: &str, message: &str) -> Self {
        Self {
            http_status: Some(status),
            msg_header: MessageHeader {
                error_message: Some(error_message(&error_id, code, message)),
                error_id: Some(error_id),
                timestamp: now(),
                response_code: code.to_string(),
                response_message: message.to_string(),
            },
            msg_body: None,
        }
    }

    /// Failure whose code and message mirror `status`, with a fresh error id
    pub fn failure_for_status(status: StatusCode) -> Self {
        let code = status.as_u16().to_string();
        let message = status.canonical_reason().unwrap_or("Unknown");
        Self::failure(status, Uuid::new_v4().to_string(), &code, message)
    }
}

impl MessageHeader {
    fn ok() -> Self {
        Self {
            error_id: None,
            timestamp: now(),
            response_code: StatusCode::OK.as_u16().to_string(),
            response_message: "OK".to_string(),
            error_message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.http_status.unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

fn error_message(error_id: &str, code: &str, message: &str) -> String {
    format!("{} - {} (Error ID: {})", code, message, error_id)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
