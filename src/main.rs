//! Multisig wallet CLI application
//!
//! A command-line host for a single M-of-N wallet.

use clap::{Parser, Subcommand};
use multisig_wallet::cli::{self, AppState};
use multisig_wallet::multisig::{Address, PublicKey, Signature};
use multisig_wallet::storage::StorageConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "An M-of-N multi-signature wallet", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    /// Do not keep backups of the previous wallet file
    #[arg(long)]
    no_backup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signer key pair
    Keygen,

    /// Initialize a new wallet
    Init {
        /// Owner address; also the account the wallet spends from
        #[arg(short, long)]
        owner: Address,

        /// Number of signatures required to execute a transfer
        #[arg(short, long)]
        threshold: u32,
    },

    /// Signer administration (owner only)
    Signer {
        #[command(subcommand)]
        action: SignerCommands,
    },

    /// Change the required signature count (owner only)
    Threshold {
        /// Owner's hex-encoded private key
        #[arg(short, long)]
        key: String,

        /// New threshold
        #[arg(short, long)]
        required: u32,
    },

    /// Credit the wallet account in the local ledger
    Fund {
        #[arg(short, long)]
        amount: u128,
    },

    /// Show the wallet balance
    Balance {
        /// Also check whether the balance covers this amount
        #[arg(short, long)]
        amount: Option<u128>,
    },

    /// Sign the next transfer with a signer's private key
    Sign {
        /// Hex-encoded private key
        #[arg(short, long)]
        key: String,

        #[arg(short, long)]
        to: Address,

        #[arg(short, long)]
        amount: u128,
    },

    /// Check signatures for the next transfer without executing it
    Verify {
        #[arg(short, long)]
        to: Address,

        #[arg(short, long)]
        amount: u128,

        /// Signatures as <address>:<hex proof>, in order
        #[arg(short, long = "sig")]
        signatures: Vec<Signature>,
    },

    /// Execute a transfer
    Execute {
        #[arg(short, long)]
        to: Address,

        #[arg(short, long)]
        amount: u128,

        /// Signatures as <address>:<hex proof>, in order
        #[arg(short, long = "sig")]
        signatures: Vec<Signature>,
    },

    /// Display wallet information
    Show,
}

#[derive(Subcommand)]
enum SignerCommands {
    /// Authorize a signer
    Add {
        /// Owner's hex-encoded private key
        #[arg(short, long)]
        key: String,

        /// Signer's compressed public key (hex)
        #[arg(short, long)]
        pubkey: PublicKey,

        /// Signer identity; derived from the public key when omitted
        #[arg(short, long)]
        address: Option<Address>,
    },

    /// Revoke a signer
    Remove {
        /// Owner's hex-encoded private key
        #[arg(short, long)]
        key: String,

        #[arg(short, long)]
        address: Address,
    },

    /// List authorized signers
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = StorageConfig {
        data_dir: cli.data_dir.clone(),
        backup_enabled: !cli.no_backup,
        ..Default::default()
    };

    // Commands that do not need a loaded wallet
    match &cli.command {
        Commands::Keygen => return cli::cmd_keygen(),
        Commands::Init { owner, threshold } => return cli::cmd_init(config, *owner, *threshold),
        Commands::Fund { amount } => return cli::cmd_fund(config, *amount),
        _ => {}
    }

    let mut state = AppState::load(config)?;

    match cli.command {
        Commands::Keygen | Commands::Init { .. } | Commands::Fund { .. } => unreachable!(),

        Commands::Signer { action } => match action {
            SignerCommands::Add {
                key,
                pubkey,
                address,
            } => cli::cmd_signer_add(&mut state, &key, pubkey, address)?,
            SignerCommands::Remove { key, address } => {
                cli::cmd_signer_remove(&mut state, &key, &address)?
            }
            SignerCommands::List => cli::cmd_signer_list(&state)?,
        },

        Commands::Threshold { key, required } => {
            cli::cmd_threshold(&mut state, &key, required)?;
        }

        Commands::Balance { amount } => {
            cli::cmd_balance(&state, amount)?;
        }

        Commands::Sign { key, to, amount } => {
            cli::cmd_sign(&state, &key, to, amount)?;
        }

        Commands::Verify {
            to,
            amount,
            signatures,
        } => {
            cli::cmd_verify(&state, to, amount, signatures)?;
        }

        Commands::Execute {
            to,
            amount,
            signatures,
        } => {
            cli::cmd_execute(&mut state, to, amount, signatures)?;
        }

        Commands::Show => {
            cli::cmd_show(&state)?;
        }
    }

    Ok(())
}
