// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! X25519 Key Agreement
//!
//! Precomputes the NaCl box key for one pairing: `X25519(my_secret,
//! their_public)` run through HSalsa20, as `crypto_box_beforenm` does. Both
//! sides of an exchange arrive at the same key without ever sending it.

use crypto_box::SalsaBox;
use rand::rngs::OsRng;
use std::fmt;
use std::sync::Arc;
use x25519_dalek::{PublicKey, StaticSecret};

use super::error::CryptoError;

/// X25519 public key size
pub const PUBLIC_KEY_LEN: usize = 32;

/// X25519 secret key size
pub const SECRET_KEY_LEN: usize = 32;

/// Precomputed box key for one (public, secret) pairing.
///
/// Computing this once per exchange lets the request path and the response
/// path share the agreement instead of running X25519 twice.
#[derive(Clone)]
pub struct SharedKey(Arc<SalsaBox>);

impl SharedKey {
    /// Derive the shared key from the peer's public key and our secret key
    ///
    /// # Errors
    ///
    /// - either key is not exactly 32 bytes
    /// - the peer key is a low-order point (the agreement would be all zeros)
    pub fn derive(their_public: &[u8], my_secret: &[u8]) -> Result<Self, CryptoError> {
        let their_public = to_array::<PUBLIC_KEY_LEN>(their_public, "public_key")?;
        let my_secret = to_array::<SECRET_KEY_LEN>(my_secret, "secret_key")?;

        let shared = StaticSecret::from(my_secret).diffie_hellman(&PublicKey::from(their_public));
        if !shared.was_contributory() {
            return Err(CryptoError::invalid_key("public_key", "low-order point"));
        }

        let cipher = SalsaBox::new(
            &crypto_box::PublicKey::from(their_public),
            &crypto_box::SecretKey::from(my_secret),
        );
        Ok(Self(Arc::new(cipher)))
    }

    pub(crate) fn cipher(&self) -> &SalsaBox {
        &self.0
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

/// Generate a fresh X25519 key pair as `(public, secret)` raw bytes
pub fn generate_key_pair() -> ([u8; PUBLIC_KEY_LEN], [u8; SECRET_KEY_LEN]) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    (public.to_bytes(), secret.to_bytes())
}

/// Public key belonging to a secret key
pub fn public_key_for(secret_key: &[u8]) -> Result<[u8; PUBLIC_KEY_LEN], CryptoError> {
    let secret = StaticSecret::from(to_array::<SECRET_KEY_LEN>(secret_key, "secret_key")?);
    Ok(PublicKey::from(&secret).to_bytes())
}

fn to_array<const N: usize>(bytes: &[u8], key_type: &str) -> Result<[u8; N], CryptoError> {
    <[u8; N]>::try_from(bytes).map_err(|_| {
        CryptoError::invalid_key(
            key_type,
            format!("expected {} bytes, got {}", N, bytes.len()),
        )
    })
}
