use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use sendmany_relay::blockchain::identity::{decode_identity, SeedPhrase};
use sendmany_relay::blockchain::{QubicScheme, TransferInstruction, Wallet};
use sendmany_relay::config::loader::SEED_ENV_VAR;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the send-many relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a JSON file of transfers to a running relay
    Send {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the identity derived from the seed in SENDMANY_SEED
    Identity,
    /// Check an identity's format and checksum
    VerifyIdentity { identity: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Send { file } => {
            let content = std::fs::read_to_string(&file)?;
            let transfers: Vec<TransferInstruction> = serde_json::from_str(&content)?;
            let client = reqwest::Client::new();
            let res = client
                .post(format!("{}/send-transfers", cli.url))
                .json(&transfers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Identity => {
            let seed = std::env::var(SEED_ENV_VAR)
                .map_err(|_| format!("Environment variable {} not set", SEED_ENV_VAR))?;
            let wallet = Wallet::from_seed(&QubicScheme, SeedPhrase::new(seed))?;
            println!("{}", wallet.identity());
        }
        Commands::VerifyIdentity { identity } => match decode_identity(&identity) {
            Ok(key) => println!("valid: {}", hex::encode(key.as_bytes())),
            Err(e) => {
                eprintln!("invalid: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
