use base64::{engine::general_purpose, Engine as _};

use crate::error::ConfigError;

/// Encode bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64 into an owned, contiguous byte buffer.
pub fn decode(text: &str) -> Result<Vec<u8>, ConfigError> {
    general_purpose::STANDARD
        .decode(text)
        .map_err(|e| ConfigError::Decode(format!("base64: {e}")))
}
