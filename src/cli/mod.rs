// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod keys;
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Secure Gateway
#[derive(Parser, Debug)]
#[command(name = "secure-gateway")]
#[command(version)]
#[command(about = "Authenticating, payload-encrypting API gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gateway
    Serve(serve::ServeArgs),

    /// Generate a key pair and append it to the key store
    GenerateKey(keys::KeyStoreArgs),

    /// Print the newest persisted public key
    ShowKey(keys::KeyStoreArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::GenerateKey(args) => keys::generate_key(args).await,
        Commands::ShowKey(args) => keys::show_key(args).await,
    }
}
