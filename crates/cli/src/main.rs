//! Folio CLI - database migrations and secret generation.
//!
//! # Usage
//!
//! ```bash
//! # Apply content and session migrations
//! folio migrate
//!
//! # Print a fresh session signing secret
//! folio secret generate
//!
//! # Print a fresh admin secret of 24 random bytes
//! folio secret generate --bytes 24
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `secret generate` - Generate a high-entropy secret

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (content tables and session store)
    Migrate,
    /// Manage secrets
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Generate a random URL-safe secret
    Generate {
        /// Number of random bytes before encoding
        #[arg(short, long, default_value_t = commands::secret::DEFAULT_SECRET_BYTES)]
        bytes: usize,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Secret { action } => match action {
            SecretAction::Generate { bytes } => {
                let secret = commands::secret::generate(bytes)?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{secret}");
                }
            }
        },
    }
    Ok(())
}
