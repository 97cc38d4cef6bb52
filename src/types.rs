//! Shared types for the vault core
//!
//! Everything here crosses module boundaries and most of it is persisted
//! (inside the encrypted payload), so the serde field names follow the
//! camelCase layout of the stored JSON.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::CurveType;
use crate::error::{VaultError, VaultResult};

// =============================================================================
// Chain Types
// =============================================================================

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    Solana,
    Ethereum,
}

impl Blockchain {
    pub const ALL: [Blockchain; 2] = [Blockchain::Solana, Blockchain::Ethereum];

    pub fn id(&self) -> &'static str {
        self.config().id_str
    }

    pub fn config(&self) -> &'static BlockchainConfig {
        match self {
            Blockchain::Solana => &BLOCKCHAIN_CONFIGS[0],
            Blockchain::Ethereum => &BLOCKCHAIN_CONFIGS[1],
        }
    }

    /// SLIP-0044 coin type used in the BIP44 path
    pub fn coin_type(&self) -> u32 {
        self.config().coin_type
    }

    pub fn curve(&self) -> CurveType {
        match self {
            Blockchain::Solana => CurveType::Ed25519,
            Blockchain::Ethereum => CurveType::Secp256k1,
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Blockchain {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Blockchain::ALL
            .into_iter()
            .find(|chain| chain.id() == wanted)
            .ok_or_else(|| VaultError::unsupported_chain(s.trim()))
    }
}

/// Per-chain constants: display name, BIP44 coin type, address prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockchainConfig {
    pub id: Blockchain,
    pub id_str: &'static str,
    pub name: &'static str,
    pub coin_type: u32,
    pub address_prefix: &'static str,
}

pub static BLOCKCHAIN_CONFIGS: [BlockchainConfig; 2] = [
    BlockchainConfig {
        id: Blockchain::Solana,
        id_str: "solana",
        name: "Solana",
        coin_type: 501,
        address_prefix: "",
    },
    BlockchainConfig {
        id: Blockchain::Ethereum,
        id_str: "ethereum",
        name: "Ethereum",
        coin_type: 60,
        address_prefix: "0x",
    },
];

// =============================================================================
// Wallet Types
// =============================================================================

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A derived key pair plus display metadata.
///
/// Private keys are hex: 64-byte `seed || public key` for Solana, a
/// `0x`-prefixed 32-byte scalar for Ethereum.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// 1-indexed, always derivation index + 1
    pub id: u32,
    pub public_key: String,
    pub private_key: String,
    pub created_at: i64,
}

impl Wallet {
    /// Derivation index this wallet was produced from
    pub fn index(&self) -> u32 {
        self.id.saturating_sub(1)
    }

    pub fn public_info(&self) -> WalletPublicInfo {
        WalletPublicInfo {
            id: self.id,
            public_key: self.public_key.clone(),
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("id", &self.id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Wallet view for display surfaces that must not see key material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPublicInfo {
    pub id: u32,
    pub public_key: String,
    pub created_at: i64,
}

// =============================================================================
// Vault Types
// =============================================================================

/// Decrypted vault contents.
///
/// `wallets` only grows by appending the next id, or is cleared as a whole,
/// so ids always run 1..=len without gaps.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct VaultData {
    pub seed_phrase: String,
    #[zeroize(skip)]
    pub blockchain: Blockchain,
    pub wallets: Vec<Wallet>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl VaultData {
    pub fn new(seed_phrase: impl Into<String>, blockchain: Blockchain) -> Self {
        let now = now_millis();
        Self {
            seed_phrase: seed_phrase.into(),
            blockchain,
            wallets: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Index the next derived wallet must use
    pub fn next_wallet_index(&self) -> u32 {
        self.wallets.len() as u32
    }

    /// Copy of this vault with `wallet` appended
    pub fn with_wallet(&self, wallet: Wallet) -> VaultResult<Self> {
        let expected = self.next_wallet_index() + 1;
        if wallet.id != expected {
            return Err(VaultError::validation(format!(
                "Wallet id {} out of sequence, expected {}",
                wallet.id, expected
            )));
        }

        let mut updated = self.clone();
        updated.wallets.push(wallet);
        updated.updated_at = now_millis();
        Ok(updated)
    }

    /// Copy of this vault with an empty wallet list
    pub fn without_wallets(&self) -> Self {
        let mut updated = self.clone();
        updated.wallets.clear();
        updated.updated_at = now_millis();
        updated
    }

    /// Check the id sequence of a vault read back from storage
    pub fn check_integrity(&self) -> VaultResult<()> {
        for (position, wallet) in self.wallets.iter().enumerate() {
            if wallet.id as usize != position + 1 {
                return Err(VaultError::storage_corrupted(format!(
                    "Wallet at position {} has id {}",
                    position, wallet.id
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for VaultData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultData")
            .field("seed_phrase", &"[REDACTED]")
            .field("blockchain", &self.blockchain)
            .field("wallets", &self.wallets)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// The only representation ever written to persistent storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVault {
    /// Base64 AES-GCM ciphertext with the tag appended
    pub ciphertext: String,
    /// Base64 PBKDF2 salt (16 bytes)
    pub salt: String,
    /// Base64 AES-GCM nonce (12 bytes)
    pub iv: String,
    pub version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(id: u32) -> Wallet {
        Wallet {
            id,
            public_key: format!("pub{}", id),
            private_key: format!("priv{}", id),
            created_at: 0,
        }
    }

    #[test]
    fn test_blockchain_from_str() {
        assert_eq!("solana".parse::<Blockchain>().unwrap(), Blockchain::Solana);
        assert_eq!(" Ethereum ".parse::<Blockchain>().unwrap(), Blockchain::Ethereum);

        let err = "dogecoin".parse::<Blockchain>().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::UnsupportedChain);
    }

    #[test]
    fn test_blockchain_config() {
        assert_eq!(Blockchain::Solana.coin_type(), 501);
        assert_eq!(Blockchain::Ethereum.coin_type(), 60);
        assert_eq!(Blockchain::Ethereum.config().address_prefix, "0x");
        assert_eq!(Blockchain::Solana.config().name, "Solana");
        for chain in Blockchain::ALL {
            assert_eq!(chain.config().id, chain);
        }
    }

    #[test]
    fn test_vault_data_json_layout() {
        let mut vault = VaultData::new("abandon about", Blockchain::Solana);
        vault.wallets.push(wallet(1));
        let json = serde_json::to_value(&vault).unwrap();

        assert_eq!(json["seedPhrase"], "abandon about");
        assert_eq!(json["blockchain"], "solana");
        assert_eq!(json["wallets"][0]["publicKey"], "pub1");
        assert_eq!(json["wallets"][0]["privateKey"], "priv1");
        assert!(json["createdAt"].is_i64());
        assert!(json["updatedAt"].is_i64());
    }

    #[test]
    fn test_with_wallet_enforces_sequence() {
        let vault = VaultData::new("seed", Blockchain::Ethereum);
        let vault = vault.with_wallet(wallet(1)).unwrap();
        assert_eq!(vault.wallets.len(), 1);

        assert!(vault.with_wallet(wallet(3)).unwrap_err().is_validation());
        assert!(vault.with_wallet(wallet(1)).is_err());
    }

    #[test]
    fn test_without_wallets_keeps_metadata() {
        let vault = VaultData::new("seed", Blockchain::Solana)
            .with_wallet(wallet(1))
            .unwrap();
        let cleared = vault.without_wallets();

        assert!(cleared.wallets.is_empty());
        assert_eq!(cleared.seed_phrase, vault.seed_phrase);
        assert_eq!(cleared.created_at, vault.created_at);
        assert_eq!(cleared.next_wallet_index(), 0);
    }

    #[test]
    fn test_check_integrity_detects_gaps() {
        let mut vault = VaultData::new("seed", Blockchain::Solana);
        vault.wallets.push(wallet(1));
        vault.wallets.push(wallet(3));
        assert!(vault.check_integrity().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let vault = VaultData::new("abandon abandon about", Blockchain::Solana)
            .with_wallet(wallet(1))
            .unwrap();
        let debug = format!("{:?}", vault);
        assert!(!debug.contains("abandon"));
        assert!(!debug.contains("priv1"));
        assert!(debug.contains("pub1"));
    }
}
