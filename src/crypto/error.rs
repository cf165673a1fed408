// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! ## Error Variants
//!
//! - **DecryptionFailed**: box open failed. Deliberately carries no detail:
//!   a wrong key, a tampered ciphertext, a bad nonce and an empty input all
//!   surface as the same value so callers cannot build an oracle from it.
//! - **EncryptionFailed**: box seal failed (bad recipient key, cipher error)
//! - **InvalidKey**: key material has the wrong size or is a low-order point
//! - **InvalidEncoding**: a wire field is not valid base64

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Box open failed for any reason
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Box seal failed
    #[error("Encryption failed: {reason}")]
    EncryptionFailed {
        /// Specific failure reason
        reason: String,
    },

    /// Invalid cryptographic key
    #[error("Invalid key ({key_type}): {reason}")]
    InvalidKey {
        /// Type of key that failed (e.g., "recipient_public_key", "sender_secret_key")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// Wire field could not be decoded
    #[error("Invalid encoding for field '{field}': {reason}")]
    InvalidEncoding {
        /// Which envelope field failed
        field: String,
        /// Specific failure reason
        reason: String,
    },
}

impl CryptoError {
    pub(crate) fn invalid_key(key_type: &str, reason: impl Into<String>) -> Self {
        CryptoError::InvalidKey {
            key_type: key_type.to_string(),
            reason: reason.into(),
        }
    }
}

// Conversion from box cipher errors. The aead error is opaque, so a failed
// seal is the only case that reaches this path.
impl From<crypto_box::aead::Error> for CryptoError {
    fn from(err: crypto_box::aead::Error) -> Self {
        CryptoError::EncryptionFailed {
            reason: format!("xsalsa20poly1305 error: {}", err),
        }
    }
}
