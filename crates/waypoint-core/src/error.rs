use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config fetch returned status {status}")]
    Fetch { status: u16 },

    #[error("Config fetch failed: {0}")]
    FetchFailed(String),

    #[error("Config payload malformed: {0}")]
    Format(String),

    #[error("Key derivation rejected: {0}")]
    Derivation(String),

    #[error("Invalid nonce length: expected {expected} bytes, got {got}")]
    InvalidNonce { expected: usize, got: usize },

    #[error("Decryption failed (wrong passphrase or tampered payload)")]
    Authentication,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Sealing failed: {0}")]
    Seal(String),

    #[error("No usable config: remote fetch failed and no cached api exists")]
    NoConfig(#[source] Box<ConfigError>),

    #[error("No api available (remote and cache both unavailable)")]
    NoApiAvailable,

    #[error("Cache backend error: {0}")]
    Cache(String),

    #[error("Settings error: {0}")]
    Settings(String),
}
