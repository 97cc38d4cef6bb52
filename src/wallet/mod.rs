//! Wallet Module
//!
//! Handles seed phrases, HD key derivation for Solana and Ethereum, signer
//! reconstruction and input validation.

mod derivation;
mod derivation_path;
mod mnemonic;
mod validation;

pub use derivation::*;
pub use derivation_path::*;
pub use mnemonic::*;
pub use validation::*;
