//! Vault Session Manager
//!
//! In-memory session over one [`VaultStorage`] slot:
//!
//! ```text
//!            create_vault / unlock
//!   Locked ───────────────────────▶ Unlocked(vault, password)
//!     ▲                                  │
//!     └──────── lock / delete_vault ─────┘
//! ```
//!
//! The decrypted vault and the password are held together or not at all.
//! Every mutation re-encrypts the whole vault with the held password and
//! persists it before the in-memory copy changes, so a failed write leaves
//! memory and storage in agreement. Mutations take `&mut self`, which keeps
//! them strictly sequential for one session.

use zeroize::Zeroizing;

use super::storage::{self, VaultStorage};
use crate::config::VaultSettings;
use crate::error::{VaultError, VaultResult};
use crate::types::{Blockchain, VaultData, Wallet};
use crate::wallet::{
    self, validate_address, validate_password_length, validate_password_present,
};

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked,
}

struct UnlockedVault {
    vault: VaultData,
    password: Zeroizing<String>,
}

/// Lifecycle of the single vault behind `S`
pub struct VaultSession<S: VaultStorage> {
    storage: S,
    unlocked: Option<UnlockedVault>,
    min_password_length: usize,
}

impl<S: VaultStorage> VaultSession<S> {
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, &VaultSettings::default())
    }

    pub fn with_settings(storage: S, settings: &VaultSettings) -> Self {
        Self {
            storage,
            unlocked: None,
            min_password_length: settings.min_password_length,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn has_stored_vault(&self) -> VaultResult<bool> {
        storage::has_stored_vault(&self.storage)
    }

    pub fn state(&self) -> SessionState {
        if self.unlocked.is_some() {
            SessionState::Unlocked
        } else {
            SessionState::Locked
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.is_some()
    }

    /// Decrypted vault, `None` while locked
    pub fn vault(&self) -> Option<&VaultData> {
        self.unlocked.as_ref().map(|u| &u.vault)
    }

    /// Wallets of the unlocked vault, empty while locked
    pub fn wallets(&self) -> &[Wallet] {
        self.vault().map(|v| v.wallets.as_slice()).unwrap_or_default()
    }

    /// Create and persist a new empty vault, replacing any stored one, and
    /// unlock it. Input is checked before any cryptographic work.
    pub async fn create_vault(
        &mut self,
        password: &str,
        seed_phrase: &str,
        blockchain: Blockchain,
    ) -> VaultResult<&VaultData> {
        validate_password_length(password, self.min_password_length)?;
        wallet::parse_seed_phrase(seed_phrase)?;
        let normalized = Zeroizing::new(wallet::normalize_seed_phrase(seed_phrase));

        let password = Zeroizing::new(password.to_string());
        let vault =
            storage::create_new_vault(&self.storage, &password, &normalized, blockchain).await?;

        crate::log_info!("session", "Vault created", chain = blockchain);
        Ok(&self.unlocked.insert(UnlockedVault { vault, password }).vault)
    }

    /// Decrypt the stored vault. On any failure the session stays locked.
    pub async fn unlock(&mut self, password: &str) -> VaultResult<&VaultData> {
        self.unlocked = None;
        validate_password_present(password)?;

        let password = Zeroizing::new(password.to_string());
        let vault = match storage::load_vault(&self.storage, &password).await {
            Ok(vault) => vault,
            Err(e) => {
                crate::log_warn!("session", "Unlock failed", reason = e.code.user_message());
                return Err(e);
            }
        };

        crate::log_info!(
            "session",
            "Vault unlocked",
            chain = vault.blockchain,
            wallet_count = vault.wallets.len()
        );
        Ok(&self.unlocked.insert(UnlockedVault { vault, password }).vault)
    }

    /// Drop the vault and password from memory. Storage is untouched.
    pub fn lock(&mut self) {
        if self.unlocked.take().is_some() {
            crate::log_info!("session", "Vault locked");
        }
    }

    /// Append `wallet`, which must carry the next id and an address of the
    /// vault's chain.
    pub async fn add_wallet(&mut self, wallet: Wallet) -> VaultResult<&VaultData> {
        let current = self.unlocked.as_ref().ok_or_else(VaultError::session_expired)?;

        let chain = current.vault.blockchain;
        if !validate_address(&wallet.public_key, chain).0 {
            return Err(VaultError::validation(format!(
                "Wallet {} is not a {} wallet",
                wallet.id,
                chain.config().name
            )));
        }

        let wallet_id = wallet.id;
        let updated = current.vault.with_wallet(wallet)?;
        self.commit(updated).await?;

        crate::log_info!("session", "Wallet added", wallet_id = wallet_id);
        self.current_vault()
    }

    /// Derive the next wallet from the vault's own seed phrase and add it
    pub async fn generate_next_wallet(&mut self) -> VaultResult<Wallet> {
        let current = self.unlocked.as_ref().ok_or_else(VaultError::session_expired)?;

        let seed_phrase = Zeroizing::new(current.vault.seed_phrase.clone());
        let chain = current.vault.blockchain;
        let index = current.vault.next_wallet_index();

        let wallet = tokio::task::spawn_blocking(move || {
            wallet::derive_wallet(&seed_phrase, chain, index)
        })
        .await??;

        self.add_wallet(wallet.clone()).await?;
        Ok(wallet)
    }

    /// Remove every wallet, keeping seed phrase and chain
    pub async fn clear_wallets(&mut self) -> VaultResult<&VaultData> {
        let current = self.unlocked.as_ref().ok_or_else(VaultError::session_expired)?;

        let updated = current.vault.without_wallets();
        self.commit(updated).await?;

        crate::log_info!("session", "Wallets cleared");
        self.current_vault()
    }

    /// Remove the stored vault and lock, whatever the current state
    pub fn delete_vault(&mut self) -> VaultResult<()> {
        self.unlocked = None;
        storage::delete_stored_vault(&self.storage)?;
        crate::log_info!("session", "Vault deleted");
        Ok(())
    }

    /// Persist `updated`, then make it the in-memory vault
    async fn commit(&mut self, updated: VaultData) -> VaultResult<()> {
        let current = self.unlocked.as_mut().ok_or_else(VaultError::session_expired)?;

        if let Err(e) = storage::save_vault(&self.storage, &updated, &current.password).await {
            crate::log_error!("session", "Failed to persist vault", error = e);
            return Err(e);
        }

        current.vault = updated;
        Ok(())
    }

    fn current_vault(&self) -> VaultResult<&VaultData> {
        self.vault().ok_or_else(VaultError::session_expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_PASSWORD_LENGTH;
    use crate::error::ErrorCode;
    use crate::vault::MemoryStorage;
    use std::sync::atomic::{AtomicBool, Ordering};

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";
    const PASSWORD: &str = "correcthorsebattery";

    /// Memory slot whose writes can be made to fail
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: AtomicBool,
    }

    impl VaultStorage for FlakyStorage {
        fn read(&self) -> VaultResult<Option<String>> {
            self.inner.read()
        }

        fn write(&self, contents: &str) -> VaultResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(VaultError::storage_error("disk full"));
            }
            self.inner.write(contents)
        }

        fn remove(&self) -> VaultResult<()> {
            self.inner.remove()
        }
    }

    async fn unlocked_session(chain: Blockchain) -> VaultSession<MemoryStorage> {
        let mut session = VaultSession::new(MemoryStorage::new());
        session.create_vault(PASSWORD, ABANDON, chain).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_create_unlocks() {
        let session = unlocked_session(Blockchain::Solana).await;
        assert_eq!(session.state(), SessionState::Unlocked);
        assert!(session.has_stored_vault().unwrap());
        assert!(session.wallets().is_empty());
        assert_eq!(session.vault().unwrap().blockchain, Blockchain::Solana);
    }

    #[tokio::test]
    async fn test_create_validates_before_crypto() {
        let mut session = VaultSession::new(MemoryStorage::new());

        let err = session.create_vault("short", ABANDON, Blockchain::Solana).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(
            err,
            wallet::validate_new_password("short", "short", MIN_PASSWORD_LENGTH).unwrap_err()
        );
        assert_eq!(
            session.create_vault("", ABANDON, Blockchain::Solana).await.unwrap_err().message,
            "Password is required"
        );

        let err = session
            .create_vault(PASSWORD, "not a real mnemonic phrase at all", Blockchain::Solana)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMnemonic);

        assert!(!session.has_stored_vault().unwrap());
        assert!(!session.is_unlocked());
    }

    #[tokio::test]
    async fn test_create_normalizes_seed_phrase() {
        let mut session = VaultSession::new(MemoryStorage::new());
        let messy = format!("  {}  ", ABANDON.to_uppercase());
        let vault = session.create_vault(PASSWORD, &messy, Blockchain::Ethereum).await.unwrap();
        assert_eq!(vault.seed_phrase, ABANDON);
    }

    #[tokio::test]
    async fn test_lock_then_unlock() {
        let mut session = unlocked_session(Blockchain::Ethereum).await;
        session.generate_next_wallet().await.unwrap();

        session.lock();
        assert_eq!(session.state(), SessionState::Locked);
        assert!(session.vault().is_none());

        let vault = session.unlock(PASSWORD).await.unwrap();
        assert_eq!(vault.wallets.len(), 1);
        assert_eq!(vault.wallets[0].public_key, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    }

    #[tokio::test]
    async fn test_failed_unlock_stays_locked() {
        let mut session = unlocked_session(Blockchain::Solana).await;

        let err = session.unlock("wrongpassword").await.unwrap_err();
        assert!(err.is_decryption());
        assert_eq!(session.state(), SessionState::Locked);

        assert!(session.unlock("").await.unwrap_err().is_validation());
        assert!(session.unlock(PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_mutations_require_unlock() {
        let mut session = unlocked_session(Blockchain::Solana).await;
        session.lock();

        let wallet = wallet::derive_wallet(ABANDON, Blockchain::Solana, 0).unwrap();
        assert!(session.add_wallet(wallet).await.unwrap_err().is_session_expired());
        assert!(session.generate_next_wallet().await.unwrap_err().is_session_expired());
        assert!(session.clear_wallets().await.unwrap_err().is_session_expired());
    }

    #[tokio::test]
    async fn test_append_only_ids() {
        let mut session = unlocked_session(Blockchain::Solana).await;
        for expected in 1..=3u32 {
            let wallet = session.generate_next_wallet().await.unwrap();
            assert_eq!(wallet.id, expected);
        }

        let ids: Vec<u32> = session.wallets().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // Out-of-sequence wallet rejected without touching memory
        let stray = wallet::derive_wallet(ABANDON, Blockchain::Solana, 7).unwrap();
        assert!(session.add_wallet(stray).await.unwrap_err().is_validation());
        assert_eq!(session.wallets().len(), 3);
    }

    #[tokio::test]
    async fn test_add_wallet_rejects_other_chain() {
        let mut session = unlocked_session(Blockchain::Solana).await;
        let eth = wallet::derive_wallet(ABANDON, Blockchain::Ethereum, 0).unwrap();
        assert!(session.add_wallet(eth).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let mut session = unlocked_session(Blockchain::Ethereum).await;
        session.generate_next_wallet().await.unwrap();
        session.generate_next_wallet().await.unwrap();

        let vault = session.clear_wallets().await.unwrap();
        assert!(vault.wallets.is_empty());

        let wallet = session.generate_next_wallet().await.unwrap();
        assert_eq!(wallet.id, 1);

        session.lock();
        assert_eq!(session.unlock(PASSWORD).await.unwrap().wallets.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let mut session = VaultSession::new(FlakyStorage::default());
        session.create_vault(PASSWORD, ABANDON, Blockchain::Solana).await.unwrap();
        session.generate_next_wallet().await.unwrap();

        session.storage().fail_writes.store(true, Ordering::SeqCst);
        let err = session.generate_next_wallet().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(session.wallets().len(), 1);

        assert!(session.clear_wallets().await.is_err());
        assert_eq!(session.wallets().len(), 1);

        // Storage still agrees with memory
        session.storage().fail_writes.store(false, Ordering::SeqCst);
        session.lock();
        assert_eq!(session.unlock(PASSWORD).await.unwrap().wallets.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_vault() {
        let mut session = unlocked_session(Blockchain::Solana).await;
        session.delete_vault().unwrap();

        assert_eq!(session.state(), SessionState::Locked);
        assert!(!session.has_stored_vault().unwrap());

        let err = session.unlock(PASSWORD).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VaultNotFound);

        // Deleting again is fine
        session.delete_vault().unwrap();
    }
}
