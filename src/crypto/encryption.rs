// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! XSalsa20-Poly1305 Encryption/Decryption
//!
//! Symmetric half of the NaCl box: the key comes from
//! [`SharedKey::derive`](super::ecdh::SharedKey::derive), the nonce is
//! drawn fresh from the OS RNG on every seal, and the 16-byte Poly1305 tag
//! precedes the ciphertext exactly as `crypto_box` lays it out.

use crypto_box::aead::{generic_array::GenericArray, Aead};
use rand::{rngs::OsRng, RngCore};

use super::ecdh::SharedKey;
use super::error::CryptoError;

/// XSalsa20 nonce size
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag overhead carried by every ciphertext
pub const TAG_LEN: usize = 16;

/// Generate a random 24-byte nonce
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key` with a freshly generated nonce
///
/// # Returns
///
/// `(tag_and_ciphertext, nonce)`
///
/// # Security
///
/// **CRITICAL**: Never reuse the same nonce with the same key! This function
/// never accepts a caller nonce for that reason.
pub fn seal(plaintext: &[u8], key: &SharedKey) -> Result<(Vec<u8>, [u8; NONCE_LEN]), CryptoError> {
    let nonce = generate_nonce();
    let ciphertext = seal_with_nonce(plaintext, &nonce, key)?;
    Ok((ciphertext, nonce))
}

fn seal_with_nonce(
    plaintext: &[u8],
    nonce: &[u8; NONCE_LEN],
    key: &SharedKey,
) -> Result<Vec<u8>, CryptoError> {
    Ok(key.cipher().encrypt(GenericArray::from_slice(nonce), plaintext)?)
}

/// Decrypt and verify `ciphertext` (tag included) under `key`
///
/// Every failure maps to [`CryptoError::DecryptionFailed`].
pub fn open(ciphertext: &[u8], nonce: &[u8], key: &SharedKey) -> Result<Vec<u8>, CryptoError> {
    // A valid ciphertext is at least one tag long; the empty message seals to exactly TAG_LEN
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(CryptoError::DecryptionFailed);
    }

    key.cipher()
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
