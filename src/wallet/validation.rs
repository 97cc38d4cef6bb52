//! Input Validation
//!
//! Checks that run before any cryptographic work: password policy, address
//! format for both chains, and airdrop amounts. Failures are
//! `ErrorCode::Validation` with a message fit for display.

use crate::crypto::Ed25519Curve;
use crate::error::{VaultError, VaultResult};
use crate::types::Blockchain;
use crate::utils::crypto::to_checksum_address;

/// Password rules for creating a vault
pub fn validate_new_password(password: &str, confirm: &str, min_length: usize) -> VaultResult<()> {
    validate_password_length(password, min_length)?;

    if password != confirm {
        return Err(VaultError::validation("Passwords do not match"));
    }

    Ok(())
}

/// Non-empty and at least `min_length` characters
pub fn validate_password_length(password: &str, min_length: usize) -> VaultResult<()> {
    validate_password_present(password)?;

    if password.chars().count() < min_length {
        return Err(VaultError::validation(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }
    Ok(())
}

/// Unlock only needs a non-empty password; the cipher decides the rest
pub fn validate_password_present(password: &str) -> VaultResult<()> {
    if password.is_empty() {
        return Err(VaultError::validation("Password is required"));
    }
    Ok(())
}

/// Validate an address for a chain.
/// Returns (is_valid, normalized_address)
pub fn validate_address(address: &str, chain: Blockchain) -> (bool, Option<String>) {
    match chain {
        Blockchain::Solana => validate_solana_address(address),
        Blockchain::Ethereum => validate_ethereum_address(address),
    }
}

/// Base58 string decoding to exactly 32 bytes
pub fn validate_solana_address(address: &str) -> (bool, Option<String>) {
    let trimmed = address.trim();

    match bs58::decode(trimmed).into_vec() {
        Ok(bytes) if bytes.len() == 32 => {
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes);
            (true, Some(Ed25519Curve::to_solana_address(&key)))
        }
        _ => (false, None),
    }
}

/// `0x` + 40 hex digits. Mixed-case input must carry a correct EIP-55
/// checksum; all-lowercase or all-uppercase input is accepted unchecked.
pub fn validate_ethereum_address(address: &str) -> (bool, Option<String>) {
    let trimmed = address.trim();

    let Some(hex_part) = trimmed.strip_prefix("0x") else {
        return (false, None);
    };
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return (false, None);
    }

    let bytes = match hex::decode(hex_part.to_lowercase()) {
        Ok(b) => b,
        Err(_) => return (false, None),
    };
    let checksummed = to_checksum_address(&bytes);

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && checksummed != trimmed {
        return (false, None);
    }

    (true, Some(checksummed))
}

/// Require a valid address, returning its normalized form
pub fn require_valid_address(address: &str, chain: Blockchain) -> VaultResult<String> {
    match validate_address(address, chain) {
        (true, Some(normalized)) => Ok(normalized),
        _ => Err(VaultError::validation(format!(
            "Invalid {} address",
            chain.config().name
        ))),
    }
}

/// Airdrop amount in SOL, inclusive range
pub fn validate_airdrop_amount(amount: f64, min: f64, max: f64) -> VaultResult<f64> {
    if !amount.is_finite() || amount < min || amount > max {
        return Err(VaultError::validation(format!(
            "Amount must be between {} and {} SOL",
            min, max
        )));
    }
    Ok(amount)
}
