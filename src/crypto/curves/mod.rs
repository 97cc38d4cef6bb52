//! Multi-Curve Key Derivation
//!
//! The vault derives keys on two curves:
//!
//! - `ed25519`: Solana (SLIP-0010, hardened only)
//! - `secp256k1`: Ethereum (BIP-32)
//!
//! ed25519 walks a [`DerivationPath`](crate::wallet::DerivationPath) through
//! [`KeyDerivation`]; secp256k1 goes through `bitcoin::bip32`.

pub mod ed25519;
pub mod secp256k1;
pub mod traits;

pub use ed25519::Ed25519Curve;
pub use secp256k1::Secp256k1Curve;
pub use traits::*;

use serde::{Deserialize, Serialize};

// MARK: - Curve Type Enum

/// Supported elliptic curve types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 - Ethereum
    Secp256k1,
    /// Ed25519 - Solana
    Ed25519,
}

impl CurveType {
    /// Get the curve name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
        }
    }

    /// Whether the curve allows non-hardened path components
    pub fn supports_normal_derivation(&self) -> bool {
        matches!(self, Self::Secp256k1)
    }
}

impl std::fmt::Display for CurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// MARK: - Curve Errors

/// Errors that can occur during curve operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveError {
    InvalidPrivateKey(String),
    InvalidPublicKey(String),
    InvalidSeed(String),
    DerivationFailed(String),
}

impl std::fmt::Display for CurveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrivateKey(s) => write!(f, "Invalid private key: {}", s),
            Self::InvalidPublicKey(s) => write!(f, "Invalid public key: {}", s),
            Self::InvalidSeed(s) => write!(f, "Invalid seed: {}", s),
            Self::DerivationFailed(s) => write!(f, "Key derivation failed: {}", s),
        }
    }
}

impl std::error::Error for CurveError {}
