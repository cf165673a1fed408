// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Payload Encryption Module
//!
//! Cryptographic primitives for the encrypted request/response bodies that
//! pass between clients and the gateway:
//!
//! - **ECDH**: X25519 key agreement precomputed into a NaCl box key
//! - **Encryption**: XSalsa20-Poly1305 with random 24-byte nonces
//! - **Public Box**: the `encrypt` / `decrypt` box contract over raw bytes
//! - **Envelope**: the base64 JSON wire format
//!
//! ## Security Considerations
//!
//! - Nonces are generated internally and never accepted from callers
//! - Every decryption failure has the same shape (no oracle)
//! - Secret keys and shared keys never appear in `Debug` output or logs

pub mod ecdh;
pub mod encryption;
pub mod envelope;
pub mod error;
pub mod public_box;

pub use ecdh::{generate_key_pair, public_key_for, SharedKey, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
pub use encryption::{NONCE_LEN, TAG_LEN};
pub use envelope::{decode_field, DecodedEnvelope, EncryptedEnvelope, FieldPresence, IncomingEnvelope};
pub use error::CryptoError;
pub use public_box::{decrypt, decrypt_with_shared, encrypt, encrypt_with_shared};
