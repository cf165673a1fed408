// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

use crate::keys::{FileKeyStore, KeyPair, KeyStore};

/// Arguments for the key store commands
#[derive(Args, Debug)]
pub struct KeyStoreArgs {
    /// JSON-lines key store file
    #[arg(long, env = "GATEWAY_KEY_STORE_PATH", default_value = "./data/gateway-keys.jsonl")]
    pub key_store_path: PathBuf,
}

/// Pre-provision a key pair for a gateway started with `reuse_persisted_key`
pub async fn generate_key(args: KeyStoreArgs) -> Result<()> {
    let store = FileKeyStore::new(&args.key_store_path);
    let key_pair = KeyPair::generate();
    store.save(&key_pair).await?;

    println!("🔑 Generated key pair {}", key_pair.id);
    println!("  Public key: {}", key_pair.public_key_base64());
    println!("  Stored in:  {}", args.key_store_path.display());
    Ok(())
}

pub async fn show_key(args: KeyStoreArgs) -> Result<()> {
    let store = FileKeyStore::new(&args.key_store_path);
    let key_pair = store
        .find_latest()
        .await?
        .ok_or_else(|| anyhow!("No key pair in {}", args.key_store_path.display()))?;

    println!("📋 Key pair {}", key_pair.id);
    println!("  Created:    {}", key_pair.created_at);
    println!("  Public key: {}", key_pair.public_key_base64());
    Ok(())
}
