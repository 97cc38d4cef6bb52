//! Unified error types for the vault core
//!
//! Every failure path in the crate ends up as a [`VaultError`] carrying an
//! [`ErrorCode`], so callers can show a distinct message per failure class
//! without matching on strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::CurveError;

/// Main error type for all vault operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl VaultError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    /// Wrong password and tampered ciphertext are deliberately indistinguishable.
    pub fn decryption_failed() -> Self {
        Self::new(
            ErrorCode::DecryptionFailed,
            "Decryption failed: incorrect password or corrupted data",
        )
    }

    pub fn vault_not_found() -> Self {
        Self::new(ErrorCode::VaultNotFound, "No vault found in storage")
    }

    pub fn storage_corrupted(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageCorrupted, msg)
    }

    pub fn unsupported_version(version: u32) -> Self {
        Self::new(
            ErrorCode::UnsupportedVersion,
            format!("Unsupported vault version: {}", version),
        )
    }

    pub fn session_expired() -> Self {
        Self::new(ErrorCode::SessionExpired, "Vault is locked")
    }

    pub fn unsupported_chain(chain: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedChain,
            format!("Unsupported blockchain: {}", chain),
        )
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, msg)
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalService, msg)
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    pub fn is_decryption(&self) -> bool {
        self.code == ErrorCode::DecryptionFailed
    }

    pub fn is_session_expired(&self) -> bool {
        self.code == ErrorCode::SessionExpired
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.code, ErrorCode::Validation | ErrorCode::InvalidMnemonic)
    }

    /// Message suitable for showing to the user as-is
    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::Validation | ErrorCode::InvalidMnemonic | ErrorCode::RateLimited => {
                self.message.clone()
            }
            code => code.user_message().to_string(),
        }
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for VaultError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    Validation,
    InvalidMnemonic,

    // Vault errors
    DecryptionFailed,
    VaultNotFound,
    StorageCorrupted,
    UnsupportedVersion,
    StorageError,

    // Session errors
    SessionExpired,

    // Derivation errors
    UnsupportedChain,
    CryptoError,

    // Collaborator errors
    ExternalService,
    RateLimited,

    // Parse errors
    JsonError,
    HexError,

    // Internal
    Internal,
}

impl ErrorCode {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "Invalid input",
            ErrorCode::InvalidMnemonic => "Invalid BIP39 seed phrase",
            ErrorCode::DecryptionFailed => "Incorrect password",
            ErrorCode::VaultNotFound => "No vault found",
            ErrorCode::StorageCorrupted | ErrorCode::JsonError => "Corrupted vault",
            ErrorCode::UnsupportedVersion => "Vault was written by a newer version",
            ErrorCode::StorageError => "Failed to access vault storage",
            ErrorCode::SessionExpired => "Vault is locked",
            ErrorCode::UnsupportedChain => "Unsupported blockchain",
            ErrorCode::CryptoError | ErrorCode::HexError => "Cryptographic operation failed",
            ErrorCode::ExternalService => "External service request failed",
            ErrorCode::RateLimited => "Rate limit exceeded",
            ErrorCode::Internal => "Internal error",
        }
    }
}

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

// Conversions from common error types

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for VaultError {
    fn from(e: hex::FromHexError) -> Self {
        VaultError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for VaultError {
    fn from(e: std::io::Error) -> Self {
        VaultError::new(ErrorCode::StorageError, e.to_string())
    }
}

impl From<bip39::Error> for VaultError {
    fn from(e: bip39::Error) -> Self {
        VaultError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}

impl From<CurveError> for VaultError {
    fn from(e: CurveError) -> Self {
        VaultError::new(ErrorCode::CryptoError, e.to_string())
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(e: tokio::task::JoinError) -> Self {
        VaultError::new(ErrorCode::Internal, format!("Background task failed: {}", e))
    }
}
