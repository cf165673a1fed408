// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-exchange key state
//!
//! Created when an exchange enters the encryption filter, written once by
//! request decryption, read by response encryption. The key pair snapshot
//! is taken at creation, so a rotation mid-exchange has no effect here.

use std::sync::{Arc, OnceLock};

use crate::api::GatewayError;
use crate::crypto::{CryptoError, SharedKey, PUBLIC_KEY_LEN};
use crate::keys::KeyPair;

#[derive(Debug, Clone)]
pub struct ClientKey {
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub shared_key: SharedKey,
}

impl ClientKey {
    /// Agree on a shared key between the client's public key and the
    /// gateway key pair
    pub fn derive(public_key: &[u8], key_pair: &KeyPair) -> Result<Self, CryptoError> {
        let shared_key = SharedKey::derive(public_key, key_pair.secret_key())?;
        let mut client_public = [0u8; PUBLIC_KEY_LEN];
        // derive() already rejected every length other than PUBLIC_KEY_LEN
        client_public.copy_from_slice(public_key);
        Ok(Self {
            public_key: client_public,
            shared_key,
        })
    }
}

#[derive(Debug)]
pub struct ExchangeContext {
    key_pair: Arc<KeyPair>,
    client: OnceLock<ClientKey>,
}

impl ExchangeContext {
    pub fn new(key_pair: Arc<KeyPair>) -> Self {
        Self {
            key_pair,
            client: OnceLock::new(),
        }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Single write of the request path
    ///
    /// A second write in the same exchange is an `InternalInvariantViolation`.
    pub fn record_client_key(&self, client: ClientKey) -> Result<(), GatewayError> {
        self.client.set(client).map_err(|_| {
            GatewayError::InternalInvariantViolation(
                "client key recorded twice in one exchange".to_string(),
            )
        })
    }

    /// Client key learned on the request path, if any
    pub fn client_key(&self) -> Option<&ClientKey> {
        self.client.get()
    }
}
