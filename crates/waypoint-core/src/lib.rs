//! waypoint-core — encrypted remote-config bootstrap
//!
//! A client resolves its API base url from a remotely hosted, passphrase-
//! sealed JSON blob: fetch the payload, derive the key (PBKDF2-HMAC-SHA256
//! with per-payload salt and iteration count), decrypt it (AES-256-GCM),
//! then reconcile the contained url against a durable local cache so a dead
//! endpoint never blocks startup once a value has been seen.
//!
//! # Module layout
//! - `codec`     — base64 <-> bytes
//! - `crypto`    — key derivation + AEAD seal/open primitives
//! - `payload`   — wire shapes, response parsing, seal/open pipelines
//! - `fetch`     — transport trait, reqwest transport, config fetcher
//! - `cache`     — change-detection cache (memory + file backends)
//! - `bootstrap` — startup orchestration
//! - `settings`  — endpoint / passphrase / timeout configuration
//! - `paths`     — default cache location
//! - `error`     — unified error type

pub mod bootstrap;
pub mod cache;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod fetch;
pub mod paths;
pub mod payload;
pub mod settings;

#[cfg(test)]
mod testenv;

pub use bootstrap::{Bootstrapper, ResolvedApi};
pub use cache::{ConfigCache, FileCache, MemoryCache};
pub use error::ConfigError;
pub use fetch::{ConfigFetcher, ConfigTransport, HttpTransport};
pub use payload::{RemoteConf, SealedConfig};
pub use settings::BootstrapSettings;
