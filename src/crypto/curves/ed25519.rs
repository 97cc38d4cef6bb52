//! Ed25519 Curve Implementation
//!
//! Used by: Solana
//!
//! Features:
//! - SLIP-0010 key derivation (hardened only)
//! - Solana 64-byte keypair encoding (`seed || public key`)

use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use zeroize::Zeroizing;

use super::{CurveError, ExtendedKey, KeyDerivation};
use crate::wallet::DerivationComponent;

type HmacSha512 = Hmac<sha2::Sha512>;

/// SLIP-0010 master key domain separator for ed25519
const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// Ed25519 curve implementation
pub struct Ed25519Curve;

impl KeyDerivation for Ed25519Curve {
    fn master_key(seed: &[u8]) -> Result<ExtendedKey, CurveError> {
        let result = hmac_sha512(ED25519_SEED_KEY, &[seed])?;
        ExtendedKey::from_hmac_output(result.as_slice())
    }

    fn derive_child(
        parent: &ExtendedKey,
        component: DerivationComponent,
    ) -> Result<ExtendedKey, CurveError> {
        // Ed25519 has no public derivation, so a normal index has no meaning here
        if !component.hardened {
            return Err(CurveError::DerivationFailed(format!(
                "Ed25519 only supports hardened derivation, got {}",
                component
            )));
        }

        // SLIP-0010: 0x00 || private_key || index
        let result = hmac_sha512(
            parent.chain_code(),
            &[
                &[0x00],
                parent.private_key(),
                &component.full_index().to_be_bytes(),
            ],
        )?;
        ExtendedKey::from_hmac_output(result.as_slice())
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, CurveError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| CurveError::DerivationFailed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }

    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

impl Ed25519Curve {
    /// Public key for a 32-byte ed25519 seed
    pub fn public_key(private_key: &[u8; 32]) -> [u8; 32] {
        SigningKey::from_bytes(private_key).verifying_key().to_bytes()
    }

    /// Solana keypair format (64 bytes = secret seed + public key)
    pub fn to_solana_keypair(private_key: &[u8; 32]) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(SigningKey::from_bytes(private_key).to_keypair_bytes())
    }

    /// Solana address is the Base58 public key with no prefix
    pub fn to_solana_address(public_key: &[u8; 32]) -> String {
        bs58::encode(public_key).into_string()
    }

    /// Rebuild a signing key from Solana keypair bytes, checking that the
    /// embedded public half matches the seed.
    pub fn signing_key_from_keypair(keypair: &[u8]) -> Result<SigningKey, CurveError> {
        let bytes: &[u8; 64] = keypair.try_into().map_err(|_| {
            CurveError::InvalidPrivateKey(format!(
                "Keypair must be 64 bytes, got {}",
                keypair.len()
            ))
        })?;

        SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))
    }
}
