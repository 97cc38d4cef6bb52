//! HD Wallet Derivation
//!
//! Derives chain-native key pairs from a BIP39 phrase and a wallet index.
//! Each chain is a [`ChainStrategy`] in a table indexed by [`Blockchain`],
//! so adding a chain means adding one strategy and one table entry.
//!
//! SECURITY: seeds and raw private keys are zeroized when no longer needed.

use bitcoin::secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use super::derivation_path::DerivationPath;
use super::mnemonic::seed_from_phrase;
use crate::crypto::{Ed25519Curve, KeyDerivation, Secp256k1Curve};
use crate::error::{VaultError, VaultResult};
use crate::types::{now_millis, Blockchain, Wallet};
use crate::utils::crypto::keccak256;

/// Encoded key pair produced by a chain strategy
pub struct DerivedKeypair {
    pub public_key: String,
    pub private_key: Zeroizing<String>,
}

/// Per-chain derivation: which path to walk and how to encode the result
pub trait ChainStrategy: Sync {
    fn chain(&self) -> Blockchain;

    fn path(&self, index: u32) -> VaultResult<DerivationPath> {
        let path = DerivationPath::for_chain(self.chain(), index)?;
        path.check_for_chain(self.chain())?;
        Ok(path)
    }

    fn derive_keypair(&self, seed: &[u8], path: &DerivationPath) -> VaultResult<DerivedKeypair>;
}

/// ed25519 over SLIP-0010; private key is the 64-byte `seed || pubkey` in hex
pub struct SolanaStrategy;

impl ChainStrategy for SolanaStrategy {
    fn chain(&self) -> Blockchain {
        Blockchain::Solana
    }

    fn derive_keypair(&self, seed: &[u8], path: &DerivationPath) -> VaultResult<DerivedKeypair> {
        let key = Ed25519Curve::derive_path(seed, path)?;
        let keypair = Ed25519Curve::to_solana_keypair(key.private_key());

        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&keypair[32..]);

        Ok(DerivedKeypair {
            public_key: Ed25519Curve::to_solana_address(&public_key),
            private_key: Zeroizing::new(hex::encode(&keypair[..])),
        })
    }
}

/// secp256k1 over BIP-32; private key is the `0x`-prefixed scalar
pub struct EthereumStrategy;

impl ChainStrategy for EthereumStrategy {
    fn chain(&self) -> Blockchain {
        Blockchain::Ethereum
    }

    fn derive_keypair(&self, seed: &[u8], path: &DerivationPath) -> VaultResult<DerivedKeypair> {
        let key = Secp256k1Curve::derive_private_key(seed, path)?;

        Ok(DerivedKeypair {
            public_key: Secp256k1Curve::ethereum_address(&key)?,
            private_key: Zeroizing::new(format!("0x{}", hex::encode(key.as_slice()))),
        })
    }
}

static SOLANA_STRATEGY: SolanaStrategy = SolanaStrategy;
static ETHEREUM_STRATEGY: EthereumStrategy = EthereumStrategy;

/// Strategy table lookup
pub fn strategy_for(chain: Blockchain) -> &'static dyn ChainStrategy {
    match chain {
        Blockchain::Solana => &SOLANA_STRATEGY,
        Blockchain::Ethereum => &ETHEREUM_STRATEGY,
    }
}

/// Path string wallet `index` is derived at on `chain`
pub fn derivation_path(chain: Blockchain, index: u32) -> VaultResult<String> {
    Ok(strategy_for(chain).path(index)?.to_string())
}

/// Derive the wallet at `index`. The phrase is validated before any key
/// material is computed.
pub fn derive_wallet(seed_phrase: &str, chain: Blockchain, index: u32) -> VaultResult<Wallet> {
    let seed = seed_from_phrase(seed_phrase)?;
    derive_wallet_from_seed(seed.as_slice(), chain, index)
}

/// Derive `count` consecutive wallets starting at `start_index`
pub fn derive_wallets(
    seed_phrase: &str,
    chain: Blockchain,
    count: u32,
    start_index: u32,
) -> VaultResult<Vec<Wallet>> {
    let seed = seed_from_phrase(seed_phrase)?;

    (0..count)
        .map(|offset| {
            let index = start_index.checked_add(offset).ok_or_else(|| {
                VaultError::validation("Wallet index range overflows")
            })?;
            derive_wallet_from_seed(seed.as_slice(), chain, index)
        })
        .collect()
}

fn derive_wallet_from_seed(seed: &[u8], chain: Blockchain, index: u32) -> VaultResult<Wallet> {
    let strategy = strategy_for(chain);
    let path = strategy.path(index)?;
    let keypair = strategy.derive_keypair(seed, &path)?;

    crate::log_debug!(
        "derivation",
        "Derived wallet",
        chain = chain,
        path = path,
        public_key = keypair.public_key
    );

    Ok(Wallet {
        id: index + 1,
        public_key: keypair.public_key,
        private_key: keypair.private_key.to_string(),
        created_at: now_millis(),
    })
}

// MARK: - Signer reconstruction

/// Key material rebuilt from a stored wallet, for collaborators that sign
pub enum WalletSigner {
    Solana(SigningKey),
    Ethereum(SecretKey),
}

impl WalletSigner {
    pub fn chain(&self) -> Blockchain {
        match self {
            WalletSigner::Solana(_) => Blockchain::Solana,
            WalletSigner::Ethereum(_) => Blockchain::Ethereum,
        }
    }

    /// Chain-native public key / address
    pub fn public_key(&self) -> VaultResult<String> {
        match self {
            WalletSigner::Solana(key) => Ok(Ed25519Curve::to_solana_address(
                &key.verifying_key().to_bytes(),
            )),
            WalletSigner::Ethereum(key) => {
                Ok(Secp256k1Curve::ethereum_address(&key.secret_bytes())?)
            }
        }
    }

    /// Solana: 64-byte ed25519 signature over `message`.
    /// Ethereum: 64-byte compact ECDSA signature over `keccak256(message)`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            WalletSigner::Solana(key) => key.sign(message).to_bytes().to_vec(),
            WalletSigner::Ethereum(key) => {
                let secp = Secp256k1::new();
                let digest = Message::from_digest(keccak256(message));
                secp.sign_ecdsa(&digest, key).serialize_compact().to_vec()
            }
        }
    }

    /// Check a signature produced by [`WalletSigner::sign`]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            WalletSigner::Solana(key) => {
                let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
                    return false;
                };
                let signature = ed25519_dalek::Signature::from_bytes(&bytes);
                key.verifying_key().verify_strict(message, &signature).is_ok()
            }
            WalletSigner::Ethereum(key) => {
                let secp = Secp256k1::new();
                let Ok(signature) = Signature::from_compact(signature) else {
                    return false;
                };
                let digest = Message::from_digest(keccak256(message));
                let public_key = PublicKey::from_secret_key(&secp, key);
                secp.verify_ecdsa(&digest, &signature, &public_key).is_ok()
            }
        }
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletSigner({}, [REDACTED])", self.chain())
    }
}

/// Rebuild signing material from a wallet's hex private key, checking that it
/// still produces the stored public key.
pub fn signer_from_wallet(wallet: &Wallet, chain: Blockchain) -> VaultResult<WalletSigner> {
    let signer = match chain {
        Blockchain::Solana => {
            let bytes = Zeroizing::new(hex::decode(&wallet.private_key)?);
            WalletSigner::Solana(Ed25519Curve::signing_key_from_keypair(&bytes)?)
        }
        Blockchain::Ethereum => {
            WalletSigner::Ethereum(Secp256k1Curve::secret_key_from_hex(&wallet.private_key)?)
        }
    };

    if signer.public_key()? != wallet.public_key {
        return Err(VaultError::crypto_error(format!(
            "Private key of wallet {} does not match its public key",
            wallet.id
        )));
    }

    Ok(signer)
}
