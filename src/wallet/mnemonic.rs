//! BIP39 Mnemonic Utility
//!
//! Generates and validates seed phrases and turns them into BIP39 seeds.
//!
//! SECURITY: entropy and seeds are wrapped in `Zeroizing` and cleared on drop.

use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// Entropy strength of a generated phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicStrength {
    /// 128 bits, 12 words
    #[default]
    Words12,
    /// 256 bits, 24 words
    Words24,
}

impl MnemonicStrength {
    pub fn entropy_bytes(&self) -> usize {
        match self {
            MnemonicStrength::Words12 => 16,
            MnemonicStrength::Words24 => 32,
        }
    }

    pub fn word_count(&self) -> usize {
        match self {
            MnemonicStrength::Words12 => 12,
            MnemonicStrength::Words24 => 24,
        }
    }

    pub fn from_bits(bits: u32) -> VaultResult<Self> {
        match bits {
            128 => Ok(MnemonicStrength::Words12),
            256 => Ok(MnemonicStrength::Words24),
            other => Err(VaultError::validation(format!(
                "Unsupported mnemonic strength: {} bits (expected 128 or 256)",
                other
            ))),
        }
    }

    pub fn from_word_count(words: usize) -> VaultResult<Self> {
        match words {
            12 => Ok(MnemonicStrength::Words12),
            24 => Ok(MnemonicStrength::Words24),
            other => Err(VaultError::validation(format!(
                "Unsupported word count: {} (expected 12 or 24)",
                other
            ))),
        }
    }
}

/// Generate a fresh checksummed phrase from OS randomness
pub fn generate_mnemonic(strength: MnemonicStrength) -> VaultResult<String> {
    let mut buffer = Zeroizing::new([0u8; 32]);
    let entropy = &mut buffer[..strength.entropy_bytes()];
    OsRng
        .try_fill_bytes(entropy)
        .map_err(|e| VaultError::crypto_error(format!("Secure RNG unavailable: {}", e)))?;

    let mnemonic = Mnemonic::from_entropy(&*entropy)
        .map_err(|e| VaultError::crypto_error(format!("Failed to create mnemonic: {}", e)))?;

    Ok(mnemonic.to_string())
}

/// 12-word phrase, the default for new vaults
pub fn generate_seed_phrase() -> VaultResult<String> {
    generate_mnemonic(MnemonicStrength::default())
}

/// Trim, lowercase and collapse runs of whitespace to single spaces
pub fn normalize_seed_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks wordlist membership and checksum. Never fails.
pub fn is_valid_seed_phrase(phrase: &str) -> bool {
    parse_seed_phrase(phrase).is_ok()
}

/// Parse a normalised phrase, rejecting anything that is not 12 or 24 words
pub fn parse_seed_phrase(phrase: &str) -> VaultResult<Mnemonic> {
    let normalized = Zeroizing::new(normalize_seed_phrase(phrase));
    if normalized.is_empty() {
        return Err(VaultError::invalid_mnemonic("Seed phrase is empty"));
    }

    let word_count = normalized.split(' ').count();
    MnemonicStrength::from_word_count(word_count)
        .map_err(|e| VaultError::invalid_mnemonic(e.message))?;

    Mnemonic::parse_normalized(&normalized)
        .map_err(|e| VaultError::invalid_mnemonic(format!("Invalid seed phrase: {}", e)))
}

/// BIP39 seed (empty passphrase) for a phrase
pub fn seed_from_phrase(phrase: &str) -> VaultResult<Zeroizing<[u8; 64]>> {
    let mnemonic = parse_seed_phrase(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}
