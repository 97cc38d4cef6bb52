//! Cryptographic primitives for the vault
//!
//! This module provides the curve layer used for HD key derivation:
//! - SLIP-0010 ed25519 (Solana)
//! - BIP-32 secp256k1 (Ethereum)

pub mod curves;

pub use curves::{CurveError, CurveType, Ed25519Curve, ExtendedKey, KeyDerivation, Secp256k1Curve};
