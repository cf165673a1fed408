// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod key_pair;
pub mod manager;
pub mod store;

pub use key_pair::{KeyPair, KeyPairRecord};
pub use manager::KeyManager;
pub use store::{FileKeyStore, InMemoryKeyStore, KeyStore};

/// Key lifecycle errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyError {
    #[error("Key persistence failed: {0}")]
    Persistence(String),

    #[error("Persisted key record is corrupt: {0}")]
    Corrupt(String),
}
