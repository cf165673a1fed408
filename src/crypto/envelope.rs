// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wire envelope for encrypted request and response bodies
//!
//! ```json
//! { "cipherText": "<base64>", "publicKey": "<base64>", "nonce": "<base64>" }
//! ```
//!
//! `publicKey` is always the *sender's* key: the client's on requests, the
//! gateway's on responses.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::error::CryptoError;

/// Fully populated envelope, as produced by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub cipher_text: String,
    pub public_key: String,
    pub nonce: String,
}

/// Envelope as received from a client; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEnvelope {
    #[serde(default)]
    pub cipher_text: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Raw bytes of an envelope after base64 decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEnvelope {
    pub cipher_text: Vec<u8>,
    pub public_key: Vec<u8>,
    pub nonce: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Build an envelope from raw bytes
    pub fn from_bytes(cipher_text: &[u8], public_key: &[u8], nonce: &[u8]) -> Self {
        Self {
            cipher_text: BASE64.encode(cipher_text),
            public_key: BASE64.encode(public_key),
            nonce: BASE64.encode(nonce),
        }
    }

    /// Decode all three fields
    pub fn decode(&self) -> Result<DecodedEnvelope, CryptoError> {
        Ok(DecodedEnvelope {
            cipher_text: decode_field("cipherText", &self.cipher_text)?,
            public_key: decode_field("publicKey", &self.public_key)?,
            nonce: decode_field("nonce", &self.nonce)?,
        })
    }
}

impl IncomingEnvelope {
    /// True when the body carries no ciphertext at all (absent or empty)
    pub fn is_bodyless(&self) -> bool {
        !has_text(&self.cipher_text)
    }

    /// Promote to a complete envelope if every field has text
    ///
    /// Returns the per-field presence flags on failure so the caller can log
    /// which part was missing.
    pub fn complete(self) -> Result<EncryptedEnvelope, FieldPresence> {
        let presence = FieldPresence {
            cipher_text: has_text(&self.cipher_text),
            public_key: has_text(&self.public_key),
            nonce: has_text(&self.nonce),
        };
        match (self.cipher_text, self.public_key, self.nonce) {
            (Some(cipher_text), Some(public_key), Some(nonce)) if presence.all() => {
                Ok(EncryptedEnvelope {
                    cipher_text,
                    public_key,
                    nonce,
                })
            }
            _ => Err(presence),
        }
    }
}

/// Which envelope fields were present and non-blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPresence {
    pub cipher_text: bool,
    pub public_key: bool,
    pub nonce: bool,
}

impl FieldPresence {
    pub fn all(&self) -> bool {
        self.cipher_text && self.public_key && self.nonce
    }
}

/// Decode one base64 envelope field
pub fn decode_field(field: &str, value: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(value.trim())
        .map_err(|e| CryptoError::InvalidEncoding {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}
