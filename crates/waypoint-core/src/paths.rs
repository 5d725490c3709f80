use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ConfigError;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "waypoint";
const APP_NAME: &str = "waypoint";

/// Environment override for the data directory, mainly for tests and
/// containerized deployments.
pub const ENV_DATA_DIR: &str = "WAYPOINT_DATA_DIR";

/// Per-user data directory for durable bootstrap state.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Cache("cannot determine data directory".into()))
}

/// Default location of the resolved-api cache file.
pub fn cache_file_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("remote-api.json"))
}
