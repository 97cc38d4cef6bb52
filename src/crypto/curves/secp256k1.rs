//! secp256k1 Curve Implementation
//!
//! Used by: Ethereum
//!
//! Features:
//! - BIP-32 key derivation (hardened and normal)
//! - Ethereum address encoding (Keccak-256 + EIP-55)

use bitcoin::bip32::{ChildNumber, Xpriv};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::NetworkKind;
use zeroize::Zeroizing;

use super::CurveError;
use crate::utils::crypto::{keccak256, to_checksum_address};
use crate::wallet::{DerivationComponent, DerivationPath};

/// secp256k1 curve implementation
pub struct Secp256k1Curve;

impl Secp256k1Curve {
    /// BIP-32 private key at `path` below the master node of `seed`
    pub fn derive_private_key(
        seed: &[u8],
        path: &DerivationPath,
    ) -> Result<Zeroizing<[u8; 32]>, CurveError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(CurveError::InvalidSeed(format!(
                "Seed must be 16-64 bytes, got {}",
                seed.len()
            )));
        }

        let secp = Secp256k1::new();
        let master = Xpriv::new_master(NetworkKind::Main, seed)
            .map_err(|e| CurveError::InvalidSeed(e.to_string()))?;
        let children = path
            .components()
            .iter()
            .map(|component| child_number(*component))
            .collect::<Result<Vec<_>, _>>()?;
        let child = master
            .derive_priv(&secp, &children)
            .map_err(|e| CurveError::DerivationFailed(e.to_string()))?;

        Ok(Zeroizing::new(child.private_key.secret_bytes()))
    }

    /// Uncompressed SEC1 public key (65 bytes, `0x04` prefix)
    pub fn uncompressed_public_key(private_key: &[u8; 32]) -> Result<[u8; 65], CurveError> {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(private_key)
            .map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))?;
        Ok(PublicKey::from_secret_key(&secp, &sk).serialize_uncompressed())
    }

    /// Ethereum address: last 20 bytes of Keccak-256 over the 64-byte public
    /// key (prefix stripped), rendered with the EIP-55 checksum.
    pub fn ethereum_address(private_key: &[u8; 32]) -> Result<String, CurveError> {
        let public_key = Self::uncompressed_public_key(private_key)?;
        let hash = keccak256(&public_key[1..]);
        Ok(to_checksum_address(&hash[12..]))
    }

    /// Parse a hex private key with or without `0x`
    pub fn secret_key_from_hex(private_key: &str) -> Result<SecretKey, CurveError> {
        let stripped = private_key.trim_start_matches("0x");
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))?,
        );
        SecretKey::from_slice(&bytes).map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))
    }
}

fn child_number(component: DerivationComponent) -> Result<ChildNumber, CurveError> {
    let child = if component.hardened {
        ChildNumber::from_hardened_idx(component.index)
    } else {
        ChildNumber::from_normal_idx(component.index)
    };
    child.map_err(|e| CurveError::DerivationFailed(e.to_string()))
}
