//! Vault Store
//!
//! One encrypted vault per installation, kept in a single storage slot as
//! the JSON form of [`EncryptedVault`]. [`VaultStorage`] abstracts the slot so
//! the session can run against a file ([`FileStorage`]) or memory
//! ([`MemoryStorage`]).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zeroize::Zeroizing;

use super::encryption::{decrypt_async, encrypt_async};
use crate::config::VAULT_SCHEMA_VERSION;
use crate::error::{VaultError, VaultResult};
use crate::types::{Blockchain, EncryptedVault, VaultData};

/// A single persisted slot holding the serialized encrypted vault
pub trait VaultStorage: Send + Sync {
    /// Slot contents, `None` when nothing has been written
    fn read(&self) -> VaultResult<Option<String>>;

    /// Replace the slot contents
    fn write(&self, contents: &str) -> VaultResult<()>;

    /// Empty the slot. Removing an empty slot is not an error.
    fn remove(&self) -> VaultResult<()>;

    /// Whether the slot holds anything besides whitespace
    fn exists(&self) -> VaultResult<bool> {
        Ok(self
            .read()?
            .is_some_and(|contents| !contents.trim().is_empty()))
    }
}

// MARK: - File storage

/// Slot backed by one JSON file, replaced atomically on every write
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl VaultStorage for FileStorage {
    fn read(&self) -> VaultResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::storage_error(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, contents: &str) -> VaultResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let result = write_synced(&temp, contents).and_then(|()| fs::rename(&temp, &self.path));
        result.map_err(|e| {
            let _ = fs::remove_file(&temp);
            VaultError::storage_error(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn remove(&self) -> VaultResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to a fresh owner-only file and flush it to disk
fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

// MARK: - Memory storage

/// In-process slot, for tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }

    fn lock(&self) -> VaultResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| VaultError::internal("Memory storage lock poisoned"))
    }
}

impl VaultStorage for MemoryStorage {
    fn read(&self) -> VaultResult<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, contents: &str) -> VaultResult<()> {
        *self.lock()? = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> VaultResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

// MARK: - Vault persistence

/// Whether a vault has been persisted; never touches session state
pub fn has_stored_vault(storage: &dyn VaultStorage) -> VaultResult<bool> {
    storage.exists()
}

/// Read and parse the persisted envelope. A blank slot counts as missing.
pub fn read_encrypted_vault(storage: &dyn VaultStorage) -> VaultResult<EncryptedVault> {
    let contents = storage
        .read()?
        .filter(|contents| !contents.trim().is_empty())
        .ok_or_else(VaultError::vault_not_found)?;

    serde_json::from_str(&contents).map_err(|e| {
        VaultError::storage_corrupted("Corrupted vault data in storage").with_details(e.to_string())
    })
}

pub fn write_encrypted_vault(storage: &dyn VaultStorage, encrypted: &EncryptedVault) -> VaultResult<()> {
    let json = serde_json::to_string(encrypted)?;
    storage.write(&json)
}

/// Parse decrypted plaintext, checking the wallet id sequence
pub fn parse_vault_data(plaintext: &str) -> VaultResult<VaultData> {
    let vault: VaultData = serde_json::from_str(plaintext).map_err(|e| {
        VaultError::storage_corrupted("Corrupted vault data in storage").with_details(e.to_string())
    })?;
    vault.check_integrity()?;
    Ok(vault)
}

/// Serialize, encrypt under `password` and replace the stored vault
pub async fn save_vault(
    storage: &dyn VaultStorage,
    vault: &VaultData,
    password: &Zeroizing<String>,
) -> VaultResult<()> {
    let plaintext = Zeroizing::new(serde_json::to_string(vault)?);
    let encrypted = encrypt_async(plaintext, password.clone(), VAULT_SCHEMA_VERSION).await?;
    write_encrypted_vault(storage, &encrypted)
}

/// Decrypt and parse the stored vault
pub async fn load_vault(
    storage: &dyn VaultStorage,
    password: &Zeroizing<String>,
) -> VaultResult<VaultData> {
    let encrypted = read_encrypted_vault(storage)?;
    let plaintext = decrypt_async(encrypted, password.clone()).await?;
    parse_vault_data(&plaintext)
}

/// Build an empty vault for `seed_phrase` and persist it, overwriting any
/// existing one
pub async fn create_new_vault(
    storage: &dyn VaultStorage,
    password: &Zeroizing<String>,
    seed_phrase: &str,
    blockchain: Blockchain,
) -> VaultResult<VaultData> {
    let vault = VaultData::new(seed_phrase, blockchain);
    save_vault(storage, &vault, password).await?;
    Ok(vault)
}

pub fn delete_stored_vault(storage: &dyn VaultStorage) -> VaultResult<()> {
    storage.remove()
}
