//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GOLF_COMP_BACK_CONFIG_PATH";

const DEFAULT_PAR: i32 = 4;
const DEFAULT_STATE_FILE: &str = "data/competition.json";
const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 250;
const DEFAULT_SSE_CAPACITY: usize = 16;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Par applied to score entries that do not carry one.
    pub default_par: i32,
    /// Where the file store keeps the competition document.
    pub state_file: PathBuf,
    /// Quiet period the persistence worker waits for before saving.
    pub persist_debounce: Duration,
    /// Buffered events per SSE subscriber before it starts lagging.
    pub sse_capacity: usize,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration from `path`; any missing key keeps its default.
    pub fn load_from(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config = Self::from(raw);
                    info!(
                        path = %path.display(),
                        default_par = config.default_par,
                        state_file = %config.state_file.display(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from(RawConfig::default())
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    default_par: i32,
    state_file: PathBuf,
    persist_debounce_ms: u64,
    sse_capacity: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            default_par: DEFAULT_PAR,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            sse_capacity: DEFAULT_SSE_CAPACITY,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            default_par: raw.default_par,
            state_file: raw.state_file,
            persist_debounce: Duration::from_millis(raw.persist_debounce_ms),
            sse_capacity: raw.sse_capacity.max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_par, 4);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_par": 3, "persist_debounce_ms": 10}}"#).unwrap();

        let config = AppConfig::load_from(file.path());
        assert_eq!(config.default_par, 3);
        assert_eq!(config.persist_debounce, Duration::from_millis(10));
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.sse_capacity, DEFAULT_SSE_CAPACITY);
    }

    #[test]
    fn invalid_json_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(AppConfig::load_from(file.path()), AppConfig::default());
    }
}
