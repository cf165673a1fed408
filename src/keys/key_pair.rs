// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::KeyError;
use crate::crypto::{self, PUBLIC_KEY_LEN, SECRET_KEY_LEN};

/// The gateway's long-lived X25519 key pair
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub id: Uuid,
    public_key: [u8; PUBLIC_KEY_LEN],
    secret_key: [u8; SECRET_KEY_LEN],
    pub created_at: DateTime<Utc>,
}

impl KeyPair {
    /// Generate a fresh pair with a new id and the current timestamp
    pub fn generate() -> Self {
        let (public_key, secret_key) = crypto::generate_key_pair();
        Self {
            id: Uuid::new_v4(),
            public_key,
            secret_key,
            created_at: Utc::now(),
        }
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn secret_key(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.secret_key
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key)
    }

    pub fn to_record(&self) -> KeyPairRecord {
        KeyPairRecord {
            id: self.id.to_string(),
            public_key: BASE64.encode(self.public_key),
            secret_key: BASE64.encode(self.secret_key),
            created_date: self.created_at,
        }
    }

    /// Rebuild a pair from its persisted form
    ///
    /// Rejects records whose public key does not belong to the secret key.
    pub fn from_record(record: &KeyPairRecord) -> Result<Self, KeyError> {
        let id = Uuid::parse_str(&record.id)
            .map_err(|e| KeyError::Corrupt(format!("id: {}", e)))?;
        let public_key = decode_key::<PUBLIC_KEY_LEN>("publicKey", &record.public_key)?;
        let secret_key = decode_key::<SECRET_KEY_LEN>("secretKey", &record.secret_key)?;

        let derived = crypto::public_key_for(&secret_key)
            .map_err(|e| KeyError::Corrupt(e.to_string()))?;
        if derived != public_key {
            return Err(KeyError::Corrupt(format!(
                "key pair {} public key does not match secret key",
                id
            )));
        }

        Ok(Self {
            id,
            public_key,
            secret_key,
            created_at: record.created_date,
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("public_key", &self.public_key_base64())
            .field("secret_key", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Persisted form of a [`KeyPair`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairRecord {
    pub id: String,
    pub public_key: String,
    pub secret_key: String,
    pub created_date: DateTime<Utc>,
}

fn decode_key<const N: usize>(field: &str, value: &str) -> Result<[u8; N], KeyError> {
    let bytes = BASE64
        .decode(value)
        .map_err(|e| KeyError::Corrupt(format!("{}: {}", field, e)))?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| KeyError::Corrupt(format!("{}: expected {} bytes, got {}", field, N, bytes.len())))
}
