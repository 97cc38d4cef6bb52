use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use meh_vault::vault::open_file_session;
use meh_vault::wallet::{
    MnemonicStrength, derivation_path, derive_wallets, generate_mnemonic, require_valid_address,
};
use meh_vault::{Blockchain, FileStorage, VaultSession, VaultSettings, Wallet};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding the vault password
const PASSWORD_ENV: &str = "MEH_VAULT_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "meh-vault", version, about = "Encrypted HD wallet vault for Solana and Ethereum")]
struct Cli {
    /// Vault file (defaults to MEH_VAULT_PATH, then the platform data dir)
    #[arg(long, global = true, value_name = "PATH")]
    vault: Option<PathBuf>,

    /// Vault password (defaults to MEH_VAULT_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a fresh BIP39 seed phrase without touching the vault
    Mnemonic {
        #[arg(long, default_value_t = 12)]
        words: usize,
    },
    /// Create a new vault, replacing nothing unless --force is given
    Create {
        #[arg(long)]
        chain: Blockchain,
        /// Import this seed phrase instead of generating one
        #[arg(long)]
        mnemonic: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// Derive and store the next wallet(s)
    Add {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// List stored wallets
    List {
        #[arg(long)]
        show_private: bool,
    },
    /// Remove every wallet, keeping the seed phrase
    Clear,
    /// Delete the stored vault
    Delete {
        #[arg(long)]
        yes: bool,
    },
    /// Derive wallets from a seed phrase without a vault
    Derive {
        #[arg(long)]
        chain: Blockchain,
        #[arg(long)]
        mnemonic: String,
        #[arg(long, default_value_t = 0)]
        index: u32,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Check an address and print its normalized form
    Address {
        #[arg(long)]
        chain: Blockchain,
        address: String,
    },
    /// Show whether a vault exists and what it holds
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let mut settings = VaultSettings::from_env();
    if let Some(path) = &cli.vault {
        settings = settings.with_vault_path(path);
    }

    match &cli.command {
        Command::Mnemonic { words } => {
            let strength = MnemonicStrength::from_word_count(*words)?;
            let phrase = generate_mnemonic(strength)?;
            emit(&cli, json!({ "mnemonic": phrase }), || phrase.clone());
        }
        Command::Create {
            chain,
            mnemonic,
            force,
        } => {
            let mut session = open_file_session(&settings)?;
            if session.has_stored_vault()? && !force {
                bail!(
                    "A vault already exists at {} (use --force to replace it)",
                    settings.vault_path.display()
                );
            }

            let password = password(&cli)?;
            let phrase = match mnemonic {
                Some(phrase) => phrase.clone(),
                None => meh_vault::generate_seed_phrase()?,
            };
            let vault = session.create_vault(&password, &phrase, *chain).await?;
            let output = json!({
                "path": settings.vault_path,
                "blockchain": vault.blockchain,
                "seedPhrase": vault.seed_phrase,
            });
            let text = format!(
                "Created {} vault at {}\nSeed phrase (write it down): {}",
                vault.blockchain.config().name,
                settings.vault_path.display(),
                vault.seed_phrase
            );
            emit(&cli, output, || text);
        }
        Command::Add { count } => {
            if *count == 0 {
                bail!("--count must be at least 1");
            }
            let mut session = unlocked_session(&cli, &settings).await?;
            let mut added = Vec::new();
            for _ in 0..*count {
                added.push(session.generate_next_wallet().await?);
            }
            print_wallets(&cli, &added, false);
        }
        Command::List { show_private } => {
            let session = unlocked_session(&cli, &settings).await?;
            print_wallets(&cli, session.wallets(), *show_private);
        }
        Command::Clear => {
            let mut session = unlocked_session(&cli, &settings).await?;
            session.clear_wallets().await?;
            emit(&cli, json!({ "cleared": true }), || "All wallets removed".to_string());
        }
        Command::Delete { yes } => {
            if !yes {
                bail!("Refusing to delete the vault without --yes");
            }
            let mut session = open_file_session(&settings)?;
            session.delete_vault()?;
            emit(&cli, json!({ "deleted": true }), || {
                format!("Deleted vault at {}", settings.vault_path.display())
            });
        }
        Command::Derive {
            chain,
            mnemonic,
            index,
            count,
        } => {
            let wallets = derive_wallets(mnemonic, *chain, *count, *index)?;
            if cli.json {
                let entries: Vec<Value> = wallets
                    .iter()
                    .map(|w| {
                        json!({
                            "index": w.index(),
                            "path": derivation_path(*chain, w.index()).unwrap_or_default(),
                            "publicKey": w.public_key,
                            "privateKey": w.private_key,
                        })
                    })
                    .collect();
                println!("{}", Value::Array(entries));
            } else {
                for w in &wallets {
                    println!(
                        "{:<4} {:<22} {}",
                        w.index(),
                        derivation_path(*chain, w.index())?,
                        w.public_key
                    );
                    println!("     private: {}", w.private_key);
                }
            }
        }
        Command::Address { chain, address } => {
            let normalized = require_valid_address(address, *chain)?;
            emit(&cli, json!({ "chain": chain, "address": normalized }), || {
                normalized.clone()
            });
        }
        Command::Status => {
            let session = open_file_session(&settings)?;
            let exists = session.has_stored_vault()?;
            let mut output = json!({
                "path": settings.vault_path,
                "exists": exists,
            });

            let mut text = format!(
                "Vault: {} ({})",
                settings.vault_path.display(),
                if exists { "present" } else { "absent" }
            );
            if exists {
                if let Some(password) = optional_password(&cli) {
                    let session = unlock(session, &password).await?;
                    if let Some(vault) = session.vault() {
                        output["blockchain"] = json!(vault.blockchain);
                        output["walletCount"] = json!(vault.wallets.len());
                        text.push_str(&format!(
                            "\nChain: {}\nWallets: {}",
                            vault.blockchain.config().name,
                            vault.wallets.len()
                        ));
                    }
                }
            }
            emit(&cli, output, || text);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

fn optional_password(cli: &Cli) -> Option<String> {
    cli.password
        .clone()
        .or_else(|| env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
}

fn password(cli: &Cli) -> Result<String> {
    optional_password(cli)
        .ok_or_else(|| anyhow!("A password is required: pass --password or set {PASSWORD_ENV}"))
}

async fn unlock(
    mut session: VaultSession<FileStorage>,
    password: &str,
) -> Result<VaultSession<FileStorage>> {
    session
        .unlock(password)
        .await
        .map_err(|e| anyhow!(e.user_message()))
        .context("could not unlock vault")?;
    Ok(session)
}

async fn unlocked_session(cli: &Cli, settings: &VaultSettings) -> Result<VaultSession<FileStorage>> {
    let password = password(cli)?;
    let session = open_file_session(settings)?;
    unlock(session, &password).await
}

fn print_wallets(cli: &Cli, wallets: &[Wallet], show_private: bool) {
    if cli.json {
        let entries: Vec<Value> = wallets
            .iter()
            .map(|w| {
                if show_private {
                    json!(w)
                } else {
                    json!(w.public_info())
                }
            })
            .collect();
        println!("{}", Value::Array(entries));
        return;
    }

    if wallets.is_empty() {
        println!("No wallets");
        return;
    }
    for w in wallets {
        println!("#{:<3} {}", w.id, w.public_key);
        if show_private {
            println!("     private: {}", w.private_key);
        }
    }
}

fn emit(cli: &Cli, output: Value, text: impl FnOnce() -> String) {
    if cli.json {
        println!("{output}");
    } else {
        println!("{}", text());
    }
}
