//! Crypto Utilities
//!
//! Small encoding and hashing helpers shared by the curve layer and the
//! vault cipher.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use tiny_keccak::{Hasher, Keccak};

use crate::error::{VaultError, VaultResult};

/// Keccak256 hash (used for Ethereum addresses)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to an EIP-55 checksummed Ethereum address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::with_capacity(2 + lower.len());
    result.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_alphabetic() && nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Standard (padded) Base64
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn base64_decode(encoded: &str) -> VaultResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| VaultError::crypto_error(format!("Invalid base64: {}", e)))
}

/// Fill an `N`-byte array from the OS CSPRNG
pub fn random_bytes<const N: usize>() -> VaultResult<[u8; N]> {
    let mut out = [0u8; N];
    OsRng
        .try_fill_bytes(&mut out)
        .map_err(|e| VaultError::crypto_error(format!("Secure RNG unavailable: {}", e)))?;
    Ok(out)
}
