pub mod types;

use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub use types::{Config, DiscoveryConfig, SandboxConfig, ToolConfig};

const CONFIG_FILE_NAME: &str = ".shellcheck-gate.toml";

/// Get the global config file path (~/.shellcheck-gate.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (repo/.shellcheck-gate.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration.
///
/// An explicit `--config` file wins and must parse. Otherwise the repository's
/// own file is used (and must parse), then the global one (skipped with a
/// warning if broken), then the compiled defaults.
pub fn load_config(explicit: Option<&Path>, project_path: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let local = local_config_path(project_path);
    if local.exists() {
        return read_config(&local);
    }

    if let Some(global) = global_config_path()
        && global.exists()
    {
        match read_config(&global) {
            Ok(config) => return Ok(config),
            Err(e) => warn!("Ignoring global config: {}", e),
        }
    }

    debug!("No config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    debug!("Loading config from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(config)
}
