use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Environment variable naming the sealed-config endpoint.
pub const ENV_CONF_URL: &str = "WAYPOINT_CONF_URL";
/// Environment variable carrying the payload passphrase.
pub const ENV_PASSPHRASE: &str = "WAYPOINT_CONF_PASSPHRASE";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one bootstrap run.
///
/// The passphrase is held zeroized and excluded from `Debug` output; it must
/// never reach logs or durable storage.
#[derive(Clone)]
pub struct BootstrapSettings {
    pub conf_url: String,
    pub passphrase: Zeroizing<String>,
    pub fetch_timeout: Duration,
}

impl BootstrapSettings {
    pub fn new(conf_url: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            conf_url: conf_url.into(),
            passphrase: Zeroizing::new(passphrase.into()),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Read endpoint and passphrase from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let conf_url = require_env(ENV_CONF_URL)?;
        let passphrase = require_env(ENV_PASSPHRASE)?;
        Ok(Self::new(conf_url, passphrase))
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("conf_url", &self.conf_url)
            .field("passphrase", &"<redacted>")
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Settings(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testenv::EnvGuard;

    #[test]
    fn from_env_requires_both_variables() {
        {
            let _env = EnvGuard::set(&[(ENV_CONF_URL, None), (ENV_PASSPHRASE, None)]);
            let err = BootstrapSettings::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Settings(_)));
        }
        {
            let _env = EnvGuard::set(&[
                (ENV_CONF_URL, Some("https://conf.example.com/c.json")),
                (ENV_PASSPHRASE, None),
            ]);
            let err = BootstrapSettings::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Settings(_)));
        }
    }

    #[test]
    fn from_env_treats_empty_values_as_missing() {
        let _env = EnvGuard::set(&[
            (ENV_CONF_URL, Some("https://conf.example.com/c.json")),
            (ENV_PASSPHRASE, Some("")),
        ]);
        let err = BootstrapSettings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn from_env_reads_the_configuration() {
        let _env = EnvGuard::set(&[
            (ENV_CONF_URL, Some("https://conf.example.com/c.json")),
            (ENV_PASSPHRASE, Some("sesame")),
        ]);
        let settings = BootstrapSettings::from_env().unwrap();
        assert_eq!(settings.conf_url, "https://conf.example.com/c.json");
        assert_eq!(settings.passphrase.as_str(), "sesame");
        assert_eq!(settings.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn debug_output_redacts_the_passphrase() {
        let settings = BootstrapSettings::new("https://conf.example.com/c.json", "hunter2");
        let rendered = format!("{settings:?}");
        assert!(rendered.contains("https://conf.example.com/c.json"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn builder_overrides_the_timeout() {
        let settings = BootstrapSettings::new("https://conf.example.com/c.json", "p")
            .with_fetch_timeout(Duration::from_secs(3));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
        let default = BootstrapSettings::new("https://conf.example.com/c.json", "p");
        assert_eq!(default.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }
}
