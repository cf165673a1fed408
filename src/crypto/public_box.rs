// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Authenticated public-key box
//!
//! NaCl `crypto_box`: X25519 + HSalsa20 + XSalsa20-Poly1305, byte-compatible
//! with TweetNaCl and libsodium clients. The `*_with_shared`
//! variants take a precomputed [`SharedKey`]; the plain variants derive it on
//! every call.

use super::ecdh::{public_key_for, SharedKey, PUBLIC_KEY_LEN};
use super::encryption::{open, seal};
use super::envelope::EncryptedEnvelope;
use super::error::CryptoError;

/// Encrypt `plaintext` from the holder of `sender_secret_key` to
/// `recipient_public_key`
///
/// The returned envelope carries the sender's public key so the recipient
/// can derive the same shared key.
pub fn encrypt(
    plaintext: &[u8],
    recipient_public_key: &[u8],
    sender_secret_key: &[u8],
) -> Result<EncryptedEnvelope, CryptoError> {
    let sender_public = public_key_for(sender_secret_key)?;
    let key = SharedKey::derive(recipient_public_key, sender_secret_key)?;
    encrypt_with_shared(plaintext, &key, &sender_public)
}

/// Encrypt with an already derived shared key
pub fn encrypt_with_shared(
    plaintext: &[u8],
    key: &SharedKey,
    sender_public_key: &[u8; PUBLIC_KEY_LEN],
) -> Result<EncryptedEnvelope, CryptoError> {
    let (cipher_text, nonce) = seal(plaintext, key)?;
    Ok(EncryptedEnvelope::from_bytes(&cipher_text, sender_public_key, &nonce))
}

/// Open a box sent by the holder of `sender_public_key` to the holder of
/// `recipient_secret_key`
///
/// Empty inputs, wrong key or nonce sizes, a low-order sender key and a tag
/// mismatch all return [`CryptoError::DecryptionFailed`].
pub fn decrypt(
    cipher_text: &[u8],
    nonce: &[u8],
    sender_public_key: &[u8],
    recipient_secret_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if cipher_text.is_empty()
        || nonce.is_empty()
        || sender_public_key.is_empty()
        || recipient_secret_key.is_empty()
    {
        return Err(CryptoError::DecryptionFailed);
    }

    let key = SharedKey::derive(sender_public_key, recipient_secret_key)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    decrypt_with_shared(cipher_text, nonce, &key)
}

/// Open a box with an already derived shared key
pub fn decrypt_with_shared(
    cipher_text: &[u8],
    nonce: &[u8],
    key: &SharedKey,
) -> Result<Vec<u8>, CryptoError> {
    open(cipher_text, nonce, key)
}
