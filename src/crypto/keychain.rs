//! Keychain Encrypter Module
//!
//! AES-256-GCM encrypter with a master key persisted next to the
//! store. Each cache key gets its own subkey via HKDF-SHA256 over the
//! master key, and the cache key is additionally bound as AEAD
//! associated data, so ciphertext sealed for one entry cannot be
//! opened under another entry's id.

use std::fs;
use std::io;
use std::path::Path;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::hkdf::{Salt, HKDF_SHA256};
use ring::rand::{SecureRandom, SystemRandom};

use crate::crypto::{CryptoError, EncrypterDecrypter};

/// File the master key lives in, inside the cache directory.
const MASTER_KEY_FILE: &str = "cache.key";

/// Master key length in bytes (AES-256).
const MASTER_KEY_LEN: usize = 32;

/// Domain-separation salt for subkey derivation.
const KEY_DERIVATION_SALT: &[u8] = b"expirable-cache/entry-key/v1";

// == Keychain Encrypter ==
/// Keychain-backed [`EncrypterDecrypter`].
///
/// The master key is created on first use and reloaded on every
/// subsequent open, so encrypted entries survive process restarts.
/// A missing, unreadable, or wrong-length key file fails construction
/// rather than silently degrading to a passthrough.
pub struct KeychainEncrypter {
    master_key: [u8; MASTER_KEY_LEN],
    rng: SystemRandom,
}

impl KeychainEncrypter {
    // == Constructor ==
    /// Loads the master key from `key_dir`, generating and persisting
    /// a fresh one if none exists yet.
    pub fn new(key_dir: &Path) -> Result<Self, CryptoError> {
        fs::create_dir_all(key_dir)
            .map_err(|err| CryptoError::Unavailable(format!("cannot create key dir: {err}")))?;

        let rng = SystemRandom::new();
        let key_path = key_dir.join(MASTER_KEY_FILE);

        let master_key = match fs::read(&key_path) {
            Ok(bytes) => {
                let mut key = [0u8; MASTER_KEY_LEN];
                if bytes.len() != MASTER_KEY_LEN {
                    return Err(CryptoError::Unavailable(format!(
                        "master key file holds {} bytes, expected {MASTER_KEY_LEN}",
                        bytes.len()
                    )));
                }
                key.copy_from_slice(&bytes);
                key
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let mut key = [0u8; MASTER_KEY_LEN];
                rng.fill(&mut key)
                    .map_err(|_| CryptoError::Unavailable("system RNG failed".to_string()))?;
                write_key_file(&key_path, &key)
                    .map_err(|err| CryptoError::Unavailable(format!("cannot persist master key: {err}")))?;
                key
            }
            Err(err) => {
                return Err(CryptoError::Unavailable(format!(
                    "cannot read master key: {err}"
                )))
            }
        };

        Ok(Self { master_key, rng })
    }

    /// Derives the per-id AEAD subkey.
    fn derive_key(&self, id: &str) -> Result<LessSafeKey, CryptoError> {
        let salt = Salt::new(HKDF_SHA256, KEY_DERIVATION_SALT);
        let prk = salt.extract(&self.master_key);
        let info = [id.as_bytes()];
        let okm = prk
            .expand(&info, HKDF_SHA256)
            .map_err(|_| CryptoError::Unavailable("subkey derivation failed".to_string()))?;

        let mut key_bytes = [0u8; MASTER_KEY_LEN];
        okm.fill(&mut key_bytes)
            .map_err(|_| CryptoError::Unavailable("subkey derivation failed".to_string()))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| CryptoError::Unavailable("subkey rejected by cipher".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl EncrypterDecrypter for KeychainEncrypter {
    /// Seals `data` under the subkey for `id`.
    ///
    /// Output layout: `nonce || ciphertext || tag`.
    fn encrypt(&self, data: &[u8], id: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self.derive_key(id)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::Encrypt("system RNG failed".to_string()))?;

        let mut in_out = data.to_vec();
        key.seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(id.as_bytes()),
            &mut in_out,
        )
        .map_err(|_| CryptoError::Encrypt("AEAD seal failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    fn decrypt(&self, data: &[u8], id: &str) -> Result<Vec<u8>, CryptoError> {
        if data.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(CryptoError::Decrypt("ciphertext too short".to_string()));
        }
        let key = self.derive_key(id)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(&data[..NONCE_LEN]);

        let mut in_out = data[NONCE_LEN..].to_vec();
        let plaintext = key
            .open_in_place(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(id.as_bytes()),
                &mut in_out,
            )
            .map_err(|_| CryptoError::Decrypt("AEAD open failed".to_string()))?;

        Ok(plaintext.to_vec())
    }
}

/// Writes the key file, owner-readable only on unix.
fn write_key_file(path: &Path, key: &[u8]) -> io::Result<()> {
    fs::write(path, key)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
