use anyhow::Result;
use clap::Parser;
use conecto_server::{
    api::{start_api_server, AppState},
    config::Config,
    ledger::EvmLedger,
};
use log::info;
use std::sync::Arc;

/// Conecto Server Arguments
#[derive(Parser)]
#[clap(name = "conecto")]
#[clap(about = "Conecto server - creator handles, landing pages, and tokenized subscriptions")]
struct Args {
    /// API port to listen on (overrides CONECTO_API_PORT)
    #[clap(long)]
    api_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = args.api_port {
        config.api_port = port;
    }

    info!(
        "connecting to {} (chain id {}), registry {}",
        config.rpc_url, config.chain_id, config.registry_address
    );

    let ledger = Arc::new(EvmLedger::new(&config)?);
    let state = AppState::new(ledger);

    start_api_server(config.api_port, state).await
}
