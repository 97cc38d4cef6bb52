//! mehVault Core Library
//!
//! Non-custodial HD wallet vault for Solana and Ethereum.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: BIP39 seed phrases, SLIP-0010 / BIP-32 derivation, validation
//! - **vault**: PBKDF2 + AES-256-GCM encryption, single-slot storage, session
//! - **crypto**: Curve layer (ed25519, secp256k1)
//! - **airdrop**: Validation and error mapping for an external funding service
//!
//! # Security
//!
//! This crate uses `zeroize` to clear sensitive data from memory. Seed
//! phrases, private keys, passwords and derived AES keys are zeroed when
//! dropped, and their `Debug` output is redacted.
//!
//! # Example
//!
//! ```rust,ignore
//! use meh_vault::{vault::{MemoryStorage, VaultSession}, Blockchain};
//!
//! let mut session = VaultSession::new(MemoryStorage::new());
//! let phrase = meh_vault::wallet::generate_seed_phrase()?;
//! session.create_vault("correcthorsebattery", &phrase, Blockchain::Solana).await?;
//! let wallet = session.generate_next_wallet().await?;
//! println!("Solana address: {}", wallet.public_key);
//! ```

pub mod airdrop;
pub mod config;
pub mod crypto;
pub mod error;
pub mod types;
pub mod utils;
pub mod vault;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, VaultError, VaultResult};
pub use types::*;

pub use config::VaultSettings;
pub use vault::{FileStorage, MemoryStorage, SessionState, VaultSession, VaultStorage};
pub use wallet::{
    derive_wallet, derive_wallets, generate_seed_phrase, is_valid_seed_phrase, signer_from_wallet,
};

pub use utils::crypto::{keccak256, to_checksum_address};
