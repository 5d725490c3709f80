use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::ConfigError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const SALT_LEN: usize = 16;

/// Derive the 256-bit payload key from the passphrase.
///
/// Salt and iteration count travel with the payload; the passphrase is a
/// build-time secret supplied by the embedder and must never be logged or
/// persisted. Key material is zeroized on drop.
pub fn derive_key(
    passphrase: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
    if iterations == 0 {
        return Err(ConfigError::Derivation(
            "iteration count must be positive".into(),
        ));
    }
    if salt.is_empty() {
        return Err(ConfigError::Derivation("salt must not be empty".into()));
    }
    let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key);
    Ok(key)
}

/// Decrypt combined ciphertext+tag with AES-256-GCM.
///
/// The nonce length is checked before any decryption is attempted; a tag
/// mismatch (wrong key, wrong nonce, tampered bytes) is reported as
/// `Authentication`, never as silently corrupted plaintext.
pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, ConfigError> {
    if nonce.len() != NONCE_LEN {
        return Err(ConfigError::InvalidNonce {
            expected: NONCE_LEN,
            got: nonce.len(),
        });
    }
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| ConfigError::Derivation(format!("key must be {KEY_LEN} bytes")))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| ConfigError::Authentication)
}

/// Encrypt plaintext, returning combined ciphertext+tag.
///
/// Sealing counterpart of [`decrypt`]; used by the operator CLI and test
/// fixtures, never on the bootstrap path.
pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, ConfigError> {
    if nonce.len() != NONCE_LEN {
        return Err(ConfigError::InvalidNonce {
            expected: NONCE_LEN,
            got: nonce.len(),
        });
    }
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| ConfigError::Seal(format!("key must be {KEY_LEN} bytes")))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| ConfigError::Seal(e.to_string()))
}

pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
