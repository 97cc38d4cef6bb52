//! Vault Module
//!
//! Password-encrypted persistence of the seed phrase and derived wallets,
//! plus the lock/unlock session that mutates it.

pub mod encryption;
pub mod session;
pub mod storage;

pub use encryption::{decrypt, decrypt_async, encrypt, encrypt_async};
pub use session::{SessionState, VaultSession};
pub use storage::{
    create_new_vault, delete_stored_vault, has_stored_vault, load_vault, parse_vault_data,
    read_encrypted_vault, save_vault, write_encrypted_vault, FileStorage, MemoryStorage,
    VaultStorage,
};

use crate::config::VaultSettings;
use crate::error::VaultResult;

/// Session over the file slot named by `settings`
pub fn open_file_session(settings: &VaultSettings) -> VaultResult<VaultSession<FileStorage>> {
    settings.validate()?;
    Ok(VaultSession::with_settings(
        FileStorage::new(&settings.vault_path),
        settings,
    ))
}
