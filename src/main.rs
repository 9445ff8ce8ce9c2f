//! dydx_v3 entry point
//!
//! 1. Loads `.env` and client options (env, or YAML via `--config <path>`)
//! 2. Builds the client, recovering API credentials if needed
//! 3. Prints the API key and the STARK public key
//! 4. With `--account`, fetches the default account

use std::path::PathBuf;

use anyhow::Context;
use dydx_v3::config::{self, ClientOptions};
use dydx_v3::logging::init_logging;
use dydx_v3::DydxClient;
use tracing::{error, info};

struct CliArgs {
    config_path: Option<PathBuf>,
    fetch_account: bool,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs {
        config_path: None,
        fetch_account: false,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--account" => cli.fetch_account = true,
            "--config" => {
                let path = args.next().context("--config requires a path")?;
                cli.config_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(cli)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = parse_args()?;

    let options = match &cli.config_path {
        Some(path) => config::load_config(path)?,
        None => ClientOptions::from_env()?,
    };
    info!(phase = "init", host = %options.host, "Starting dydx_v3");

    let client = DydxClient::new(options).await?;
    let address = client.default_ethereum_address().map(str::to_string);

    println!("Network id: {}", client.network_id());
    println!("API key:    {}", client.private().credentials().key);

    let stark_key = match (client.private().stark_private_key(), client.onboarding(), &address) {
        (Some(key), _, _) => Some(key.clone()),
        (None, Some(onboarding), Some(address)) => Some(onboarding.derive_stark_key(address).await?),
        _ => None,
    };
    match stark_key {
        Some(key) => println!("STARK public key: {}", key.public_key()?),
        None => println!("STARK public key: unavailable (no STARK key or wallet signer)"),
    }
    if let Some(public_key) = client.stark_public_key() {
        println!("STARK public key y: {}", public_key.y);
    }

    if cli.fetch_account {
        match client.private().get_account(None).await {
            Ok(account) => {
                println!("Account id:   {}", account.id);
                println!("Position id:  {}", account.position_id);
                println!("Equity:       {}", account.equity);
                println!("Free collat.: {}", account.free_collateral);
                println!("Open positions: {}", account.open_positions.len());
            }
            Err(e) => {
                error!(error = %e, "Account fetch failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
