//! Vault Configuration
//!
//! Fixed cryptographic parameters live here as constants: the persisted
//! vault carries no KDF parameters, so they are pinned by the schema version
//! and must never change for version 1. The runtime knobs that are safe to
//! tune (file location, password policy, airdrop range) live in
//! [`VaultSettings`].

use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};

// =============================================================================
// Storage
// =============================================================================

/// Name of the single persisted vault slot
pub const VAULT_STORAGE_KEY: &str = "mehVault_encrypted_vault";

/// Current vault schema version
pub const VAULT_SCHEMA_VERSION: u32 = 1;

/// Environment variable that overrides the vault file location
pub const VAULT_PATH_ENV: &str = "MEH_VAULT_PATH";

// =============================================================================
// Cryptography
// =============================================================================

/// PBKDF2-HMAC-SHA256 rounds (OWASP minimum guidance)
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes for PBKDF2
pub const SALT_LENGTH: usize = 16;

/// Nonce length in bytes for AES-GCM
pub const IV_LENGTH: usize = 12;

/// AES key length in bytes
pub const AES_KEY_LENGTH: usize = 32;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum airdrop amount in SOL
pub const MIN_AIRDROP_AMOUNT: f64 = 0.1;

/// Maximum airdrop amount in SOL (devnet limit)
pub const MAX_AIRDROP_AMOUNT: f64 = 2.0;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Runtime settings for a vault installation
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSettings {
    /// File holding the encrypted vault slot
    pub vault_path: PathBuf,
    /// Minimum accepted password length for new vaults
    pub min_password_length: usize,
    /// Inclusive airdrop range in SOL
    pub min_airdrop_amount: f64,
    pub max_airdrop_amount: f64,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            min_password_length: MIN_PASSWORD_LENGTH,
            min_airdrop_amount: MIN_AIRDROP_AMOUNT,
            max_airdrop_amount: MAX_AIRDROP_AMOUNT,
        }
    }
}

impl VaultSettings {
    /// Defaults, with the vault location taken from `MEH_VAULT_PATH` when set
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(path) = env::var(VAULT_PATH_ENV) {
            if !path.trim().is_empty() {
                settings.vault_path = PathBuf::from(path.trim());
            }
        }
        settings
    }

    pub fn with_vault_path(mut self, path: impl AsRef<Path>) -> Self {
        self.vault_path = path.as_ref().to_path_buf();
        self
    }

    /// Reject settings that weaken the baseline policy
    pub fn validate(&self) -> VaultResult<()> {
        if self.min_password_length < MIN_PASSWORD_LENGTH {
            return Err(VaultError::validation(format!(
                "Minimum password length cannot be below {}",
                MIN_PASSWORD_LENGTH
            )));
        }

        let (min, max) = (self.min_airdrop_amount, self.max_airdrop_amount);
        if min.is_nan() || max.is_nan() || min <= 0.0 || min > max {
            return Err(VaultError::validation(format!(
                "Invalid airdrop range: {} - {}",
                self.min_airdrop_amount, self.max_airdrop_amount
            )));
        }

        if self.vault_path.as_os_str().is_empty() {
            return Err(VaultError::validation("Vault path cannot be empty"));
        }

        Ok(())
    }
}

/// `<platform data dir>/mehVault/mehVault_encrypted_vault.json`, falling back
/// to the working directory when no home directory is known.
pub fn default_vault_path() -> PathBuf {
    let file_name = format!("{}.json", VAULT_STORAGE_KEY);
    match ProjectDirs::from("", "", "mehVault") {
        Some(dirs) => dirs.data_dir().join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = VaultSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings
            .vault_path
            .to_string_lossy()
            .ends_with("mehVault_encrypted_vault.json"));
    }

    #[test]
    fn test_weaker_password_policy_rejected() {
        let settings = VaultSettings {
            min_password_length: 4,
            ..VaultSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inverted_airdrop_range_rejected() {
        let settings = VaultSettings {
            min_airdrop_amount: 3.0,
            max_airdrop_amount: 2.0,
            ..VaultSettings::default()
        };
        assert!(settings.validate().is_err());

        let nan = VaultSettings {
            min_airdrop_amount: f64::NAN,
            ..VaultSettings::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_with_vault_path() {
        let settings = VaultSettings::default().with_vault_path("/tmp/vault.json");
        assert_eq!(settings.vault_path, PathBuf::from("/tmp/vault.json"));
    }
}
