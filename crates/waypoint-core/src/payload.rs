use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::codec;
use crate::crypto;
use crate::error::ConfigError;

/// Sealed configuration payload as published at the config endpoint.
///
/// All binary fields are base64 (standard alphabet, padded). The ciphertext
/// carries the GCM tag appended to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedConfig {
    /// Key derivation salt.
    pub s: String,
    /// Key derivation iteration count.
    pub it: u32,
    /// AES-GCM nonce, 12 bytes once decoded.
    pub n: String,
    /// Ciphertext with the 16-byte authentication tag appended.
    pub c: String,
}

/// Parse a fetched response body into a [`SealedConfig`].
///
/// Hosting setups differ in how they serve the payload: some return the
/// object directly, others return it as a JSON string containing the object.
/// Both forms are accepted; anything else is a format error.
pub fn parse_sealed_response(body: &str) -> Result<SealedConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ConfigError::Format(format!("payload is not json: {e}")))?;
    let sealed: SealedConfig = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| ConfigError::Format(format!("inner payload is not json: {e}")))?,
        other => serde_json::from_value(other)
            .map_err(|e| ConfigError::Format(format!("payload shape mismatch: {e}")))?,
    };
    if sealed.s.is_empty() || sealed.n.is_empty() || sealed.c.is_empty() {
        return Err(ConfigError::Format(
            "payload has empty salt, nonce or ciphertext".into(),
        ));
    }
    Ok(sealed)
}

/// Decrypted remote configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConf {
    /// Base URL of the API the client should talk to.
    pub api: String,
}

impl RemoteConf {
    pub fn parse(plaintext: &str) -> Result<Self, ConfigError> {
        let conf: RemoteConf = serde_json::from_str(plaintext)
            .map_err(|e| ConfigError::Format(format!("decrypted config: {e}")))?;
        conf.validate()?;
        Ok(conf)
    }

    /// The api field must be a non-empty absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.is_empty() {
            return Err(ConfigError::Format("api url is empty".into()));
        }
        reqwest::Url::parse(&self.api)
            .map_err(|e| ConfigError::Format(format!("api url invalid: {e}")))?;
        Ok(())
    }
}

/// Open a sealed payload with the given passphrase.
///
/// Decodes the wire fields, re-derives the key and authenticates the
/// ciphertext before any of the plaintext is interpreted.
pub fn open_sealed(sealed: &SealedConfig, passphrase: &str) -> Result<RemoteConf, ConfigError> {
    let salt = codec::decode(&sealed.s)?;
    let nonce = codec::decode(&sealed.n)?;
    let ciphertext = codec::decode(&sealed.c)?;
    let key = crypto::derive_key(passphrase, &salt, sealed.it)?;
    let plaintext = Zeroizing::new(crypto::decrypt(&key, &nonce, &ciphertext)?);
    let text = std::str::from_utf8(&plaintext)
        .map_err(|e| ConfigError::Decode(format!("plaintext utf-8: {e}")))?;
    RemoteConf::parse(text)
}

/// Seal a configuration document for publication.
///
/// Generates a fresh salt and nonce per call; two seals of the same document
/// never produce the same payload.
pub fn seal_conf(
    conf: &RemoteConf,
    passphrase: &str,
    iterations: u32,
) -> Result<SealedConfig, ConfigError> {
    conf.validate()?;
    let salt = crypto::generate_salt();
    let nonce = crypto::generate_nonce();
    let key = crypto::derive_key(passphrase, &salt, iterations)?;
    let plaintext = serde_json::to_vec(conf).map_err(|e| ConfigError::Seal(e.to_string()))?;
    let ciphertext = crypto::encrypt(&key, &nonce, &plaintext)?;
    Ok(SealedConfig {
        s: codec::encode(&salt),
        it: iterations,
        n: codec::encode(&nonce),
        c: codec::encode(&ciphertext),
    })
}
