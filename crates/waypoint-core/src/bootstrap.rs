use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cache::{ConfigCache, FileCache};
use crate::error::ConfigError;
use crate::fetch::{ConfigFetcher, ConfigTransport, HttpTransport};
use crate::payload::{self, RemoteConf};
use crate::settings::BootstrapSettings;

/// Outcome of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedApi {
    /// Base URL the embedder should direct API traffic to.
    pub api: String,
    /// True when the URL differs from what the cache held before this run.
    /// Embedders holding per-endpoint state (sessions, tokens) should reset
    /// it when this is set.
    pub changed: bool,
}

/// Resolves the API base URL from the sealed remote config, falling back to
/// the cache when the remote side is unreachable.
pub struct Bootstrapper<T: ConfigTransport, C: ConfigCache> {
    fetcher: ConfigFetcher<T>,
    cache: C,
    passphrase: Zeroizing<String>,
}

impl Bootstrapper<HttpTransport, FileCache> {
    /// Production wiring: HTTPS transport plus the per-user file cache.
    pub fn from_settings(settings: BootstrapSettings) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(settings.fetch_timeout)?;
        let cache = FileCache::open_default()?;
        Ok(Self::new(transport, cache, settings))
    }
}

impl<T: ConfigTransport, C: ConfigCache> Bootstrapper<T, C> {
    pub fn new(transport: T, cache: C, settings: BootstrapSettings) -> Self {
        Self {
            fetcher: ConfigFetcher::new(transport, settings.conf_url),
            cache,
            passphrase: settings.passphrase,
        }
    }

    /// Last URL persisted by a previous run, if any.
    pub fn cached_api(&self) -> Option<String> {
        self.cache.cached_api()
    }

    /// Fetch, authenticate and parse the remote config without touching the
    /// cache.
    pub async fn fetch_remote(&self) -> Result<RemoteConf, ConfigError> {
        let sealed = self.fetcher.fetch().await?;
        payload::open_sealed(&sealed, &self.passphrase)
    }

    /// Resolve the API base URL for this run.
    ///
    /// Fresh config wins over the cache. When the fresh URL is new it is
    /// persisted before this returns, so a crash right after still leaves the
    /// next run warm; a failed cache write is logged and does not discard the
    /// fresh URL. When the fetch or decryption fails and a cached URL exists,
    /// that URL is returned with `changed = false`. With no cache to fall
    /// back on, the failure is terminal.
    ///
    /// Intended to run once at process start. Concurrent calls are not
    /// synchronized; they race as last-write-wins on the cache.
    pub async fn init_remote_api(&self) -> Result<ResolvedApi, ConfigError> {
        let cached = self.cache.cached_api();
        let mut base = cached.clone();
        let mut changed = false;

        match self.fetch_remote().await {
            Ok(conf) => {
                if cached.is_none() || self.cache.is_different(&conf.api) {
                    if let Err(err) = self.cache.save_api(&conf.api) {
                        warn!(error = %err, "failed to persist api url to cache");
                    }
                    changed = true;
                } else {
                    debug!("remote api matches cache");
                }
                base = Some(conf.api);
            }
            Err(err) => {
                if cached.is_some() {
                    warn!(error = %err, "remote config fetch failed, using cached api");
                } else {
                    return Err(ConfigError::NoConfig(Box::new(err)));
                }
            }
        }

        match base {
            Some(api) if !api.is_empty() => {
                info!(api = %api, changed, "api base url resolved");
                Ok(ResolvedApi { api, changed })
            }
            _ => Err(ConfigError::NoApiAvailable),
        }
    }
}
