//! Runtime configuration for the Conecto server.
//!
//! All ledger credentials and contract addresses come from the environment.
//! The configuration is built once at startup and passed explicitly to every
//! component that needs ledger access; nothing reads the environment after
//! initialization.

use anyhow::{Context, Result};
use std::env;

/// Default chain: Base Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 84532;

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 3000;

/// Server configuration, read-only after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the target network
    pub rpc_url: String,
    /// Chain ID used when signing transactions
    pub chain_id: u64,
    /// Address of the Conecto registry contract
    pub registry_address: String,
    /// Address of the proxy factory used to deploy subscription contracts
    pub factory_address: String,
    /// Address of the ERC-1155 drop implementation the factory clones
    pub drop_implementation: String,
    /// Private key of the admin wallet that signs server-side transactions
    pub admin_private_key: String,
    /// Port the HTTP API listens on
    pub api_port: u16,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Required: `CONECTO_RPC_URL`, `CONECTO_CONTRACT_ADDRESS`,
    /// `CONECTO_FACTORY_ADDRESS`, `CONECTO_DROP_IMPLEMENTATION`,
    /// `CONECTO_ADMIN_KEY`. Optional: `CONECTO_CHAIN_ID`, `CONECTO_API_PORT`.
    pub fn from_env() -> Result<Self> {
        let rpc_url = require_var("CONECTO_RPC_URL")?;
        let registry_address = require_var("CONECTO_CONTRACT_ADDRESS")?;
        let factory_address = require_var("CONECTO_FACTORY_ADDRESS")?;
        let drop_implementation = require_var("CONECTO_DROP_IMPLEMENTATION")?;
        let admin_private_key = require_var("CONECTO_ADMIN_KEY")?;

        let chain_id = match env::var("CONECTO_CHAIN_ID") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("CONECTO_CHAIN_ID must be a decimal chain id")?,
            Err(_) => DEFAULT_CHAIN_ID,
        };

        let api_port = match env::var("CONECTO_API_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .context("CONECTO_API_PORT must be a port number")?,
            Err(_) => DEFAULT_API_PORT,
        };

        Ok(Self {
            rpc_url,
            chain_id,
            registry_address,
            factory_address,
            drop_implementation,
            admin_private_key,
            api_port,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("missing required environment variable {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = require_var("CONECTO_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("CONECTO_TEST_UNSET_VARIABLE"));
    }
}
