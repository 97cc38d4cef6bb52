//! Vault Encryption with Authenticated Encryption
//!
//! Protects the serialized vault using:
//! - PBKDF2-HMAC-SHA256 (100,000 rounds) for key derivation from password
//! - AES-256-GCM for authenticated encryption, tag appended to the ciphertext
//! - Fresh random salt and nonce on every call, so no nonce is ever reused
//!
//! Any failure to open a vault (bad base64, wrong lengths, wrong password,
//! tampered bytes) is reported as the same `DecryptionFailed` error.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::config::{AES_KEY_LENGTH, IV_LENGTH, PBKDF2_ITERATIONS, SALT_LENGTH, VAULT_SCHEMA_VERSION};
use crate::error::{VaultError, VaultResult};
use crate::types::EncryptedVault;
use crate::utils::crypto::{base64_decode, base64_encode, random_bytes};

/// Encrypt `plaintext` under `password`, tagging the result with `version`
pub fn encrypt(plaintext: &str, password: &str, version: u32) -> VaultResult<EncryptedVault> {
    let salt: [u8; SALT_LENGTH] = random_bytes()?;
    let nonce_bytes: [u8; IV_LENGTH] = random_bytes()?;

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| VaultError::crypto_error(format!("Failed to create cipher: {}", e)))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| VaultError::crypto_error(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedVault {
        ciphertext: base64_encode(&ciphertext),
        salt: base64_encode(&salt),
        iv: base64_encode(&nonce_bytes),
        version,
    })
}

/// Decrypt a stored vault back to its UTF-8 plaintext
pub fn decrypt(encrypted: &EncryptedVault, password: &str) -> VaultResult<Zeroizing<String>> {
    check_version(encrypted.version)?;

    let salt = base64_decode(&encrypted.salt).map_err(|_| VaultError::decryption_failed())?;
    let nonce_bytes = base64_decode(&encrypted.iv).map_err(|_| VaultError::decryption_failed())?;
    let ciphertext =
        base64_decode(&encrypted.ciphertext).map_err(|_| VaultError::decryption_failed())?;

    if salt.len() != SALT_LENGTH || nonce_bytes.len() != IV_LENGTH {
        return Err(VaultError::decryption_failed());
    }

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| VaultError::crypto_error(format!("Failed to create cipher: {}", e)))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| VaultError::decryption_failed())?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::decryption_failed())
}

/// [`encrypt`] on the blocking pool so PBKDF2 does not stall the runtime
pub async fn encrypt_async(
    plaintext: Zeroizing<String>,
    password: Zeroizing<String>,
    version: u32,
) -> VaultResult<EncryptedVault> {
    tokio::task::spawn_blocking(move || encrypt(&plaintext, &password, version)).await?
}

/// [`decrypt`] on the blocking pool
pub async fn decrypt_async(
    encrypted: EncryptedVault,
    password: Zeroizing<String>,
) -> VaultResult<Zeroizing<String>> {
    tokio::task::spawn_blocking(move || decrypt(&encrypted, &password)).await?
}

/// Versions this build can open
fn check_version(version: u32) -> VaultResult<()> {
    if version == 0 || version > VAULT_SCHEMA_VERSION {
        return Err(VaultError::unsupported_version(version));
    }
    Ok(())
}

fn derive_key(password: &str, salt: &[u8]) -> VaultResult<Zeroizing<[u8; AES_KEY_LENGTH]>> {
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..])
        .map_err(|e| VaultError::crypto_error(format!("Key derivation failed: {}", e)))?;
    Ok(key)
}
