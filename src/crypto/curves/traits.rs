//! Elliptic Curve Traits
//!
//! Defines the common interface for hierarchical key derivation across the
//! curves the vault supports.

use zeroize::Zeroizing;

use super::CurveError;
use crate::wallet::{DerivationComponent, DerivationPath};

/// A private key together with its chain code at some node of the HD tree
#[derive(Clone)]
pub struct ExtendedKey {
    private_key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    /// Split a 64-byte HMAC-SHA512 output into key (left) and chain code (right)
    pub fn from_hmac_output(output: &[u8]) -> Result<Self, CurveError> {
        if output.len() != 64 {
            return Err(CurveError::DerivationFailed(format!(
                "HMAC output must be 64 bytes, got {}",
                output.len()
            )));
        }

        let mut private_key = Zeroizing::new([0u8; 32]);
        private_key.copy_from_slice(&output[..32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);

        Ok(Self {
            private_key,
            chain_code,
        })
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExtendedKey([REDACTED])")
    }
}

/// SLIP-0010 style hierarchical derivation for one curve
pub trait KeyDerivation {
    /// Master node from a BIP39 seed
    fn master_key(seed: &[u8]) -> Result<ExtendedKey, CurveError>;

    /// One derivation step
    fn derive_child(
        parent: &ExtendedKey,
        component: DerivationComponent,
    ) -> Result<ExtendedKey, CurveError>;

    /// Walk `path` from the master node
    fn derive_path(seed: &[u8], path: &DerivationPath) -> Result<ExtendedKey, CurveError> {
        let mut key = Self::master_key(seed)?;
        for component in path.components() {
            key = Self::derive_child(&key, *component)?;
        }
        Ok(key)
    }
}
