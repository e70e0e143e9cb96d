//! Runtime configuration.
//!
//! Layering: built-in defaults, then an optional JSON file, then `PULSE_*`
//! environment variables. A missing default config file is not an error;
//! an explicitly requested one is.

use crate::panels::notifications::store::StoreCapacity;
use crate::services::generator::SelectionMode;
use crate::services::templates::Dashboard;
use log::{debug, info};
use pulse_clock::DEFAULT_TICK_PERIOD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = "delegate-pulse";
const CONFIG_FILE: &str = "config.json";

pub const ENV_SOCKET_URL: &str = "PULSE_SOCKET_URL";
pub const ENV_WEBSOCKET_URL: &str = "PULSE_WEBSOCKET_URL";
pub const ENV_TICK_MS: &str = "PULSE_TICK_MS";
pub const ENV_CAPACITY: &str = "PULSE_CAPACITY";
pub const ENV_DASHBOARD: &str = "PULSE_DASHBOARD";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid socket url: {0}")]
    InvalidUrl(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dashboard: Dashboard,
    pub tick_interval_ms: u64,
    pub poll_interval_ms: u64,
    /// 0 keeps every notification (panel windowing still applies).
    pub capacity: usize,
    pub panel_window: usize,
    pub toast_limit: usize,
    pub selection: SelectionMode,
    pub seed: Option<u64>,
    pub socket_url: Option<String>,
    pub log_level: String,
    /// Stop the demo after this many generator ticks.
    pub max_ticks: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard: Dashboard::Delegate,
            tick_interval_ms: DEFAULT_TICK_PERIOD.as_millis() as u64,
            poll_interval_ms: 50,
            capacity: 10,
            panel_window: 20,
            toast_limit: 3,
            selection: SelectionMode::RoundRobin,
            seed: None,
            socket_url: None,
            log_level: "info".to_string(),
            max_ticks: None,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/delegate-pulse/config.json`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load defaults + file + process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!(
            "Config: dashboard={} tick={}ms capacity={} socket={}",
            config.dashboard.as_str(),
            config.tick_interval_ms,
            config.capacity,
            config.socket_url.as_deref().unwrap_or("<mock>")
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment values. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_SOCKET_URL).or_else(|| non_empty(ENV_WEBSOCKET_URL)) {
            self.socket_url = Some(url.trim().to_string());
        }
        if let Some(raw) = non_empty(ENV_TICK_MS) {
            self.tick_interval_ms = parse_number(ENV_TICK_MS, &raw)?;
        }
        if let Some(raw) = non_empty(ENV_CAPACITY) {
            self.capacity = parse_number(ENV_CAPACITY, &raw)?;
        }
        if let Some(raw) = non_empty(ENV_DASHBOARD) {
            self.dashboard = Dashboard::from_name(raw.trim()).ok_or(ConfigError::InvalidValue {
                key: ENV_DASHBOARD,
                value: raw,
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_interval_ms",
                value: "0".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_ms",
                value: "0".to_string(),
            });
        }
        if self.panel_window == 0 {
            return Err(ConfigError::InvalidValue {
                key: "panel_window",
                value: "0".to_string(),
            });
        }
        if let Some(url) = &self.socket_url {
            let known_scheme = ["ws://", "wss://", "http://", "https://"]
                .iter()
                .any(|scheme| url.starts_with(scheme));
            if !known_scheme {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    pub fn store_capacity(&self) -> StoreCapacity {
        match NonZeroUsize::new(self.capacity) {
            Some(n) => StoreCapacity::Bounded(n),
            None => StoreCapacity::Unbounded,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;
    use std::sync::Mutex;

    // Use a mutex to ensure tests that modify env vars don't race
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "delegate-pulse-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.store_capacity(),
            StoreCapacity::Bounded(NonZeroUsize::new(10).unwrap())
        );
        assert_eq!(config.tick_period(), DEFAULT_TICK_PERIOD);
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert_eq!(config.store_capacity(), StoreCapacity::Unbounded);
    }

    #[test]
    fn test_file_overrides_defaults_partially() {
        let path = temp_file(
            "partial",
            r#"{ "dashboard": "meeting_assassin", "capacity": 3, "selection": "random", "seed": 7 }"#,
        );
        let config = Config::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.dashboard, Dashboard::MeetingAssassin);
        assert_eq!(config.capacity, 3);
        assert_eq!(config.selection, SelectionMode::Random);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tick_interval_ms, 4000);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_file("broken", "{ not json");
        let result = Config::from_file(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_explicit_missing_file_is_read_error() {
        let missing = env::temp_dir().join("delegate-pulse-does-not-exist.json");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overlay() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[
                (ENV_WEBSOCKET_URL, "ws://localhost:8000/ws"),
                (ENV_TICK_MS, "3000"),
                (ENV_CAPACITY, "0"),
                (ENV_DASHBOARD, "meeting_assassin"),
            ]))
            .unwrap();

        assert_eq!(config.socket_url.as_deref(), Some("ws://localhost:8000/ws"));
        assert_eq!(config.tick_interval_ms, 3000);
        assert_eq!(config.store_capacity(), StoreCapacity::Unbounded);
        assert_eq!(config.dashboard, Dashboard::MeetingAssassin);
    }

    #[test]
    fn test_socket_url_wins_over_websocket_url() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[
                (ENV_SOCKET_URL, "http://localhost:3001"),
                (ENV_WEBSOCKET_URL, "ws://localhost:8000/ws"),
            ]))
            .unwrap();
        assert_eq!(config.socket_url.as_deref(), Some("http://localhost:3001"));
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env(lookup(&[(ENV_TICK_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_TICK_MS, .. }));

        let err = config
            .apply_env(lookup(&[(ENV_DASHBOARD, "crm")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_DASHBOARD, .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_tick = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert!(zero_tick.validate().is_err());

        let bad_url = Config {
            socket_url: Some("localhost:8000".to_string()),
            ..Config::default()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_load_reads_process_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let path = temp_file("load", "{}");

        unsafe {
            env::set_var(ENV_CAPACITY, "5");
            env::remove_var(ENV_SOCKET_URL);
            env::remove_var(ENV_WEBSOCKET_URL);
        }
        let config = Config::load(Some(&path));
        unsafe {
            env::remove_var(ENV_CAPACITY);
        }
        fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.socket_url, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_without_default_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config_home = env::temp_dir().join(format!(
            "delegate-pulse-empty-home-{}",
            std::process::id()
        ));
        fs::create_dir_all(&config_home).unwrap();

        let saved = env::var_os("XDG_CONFIG_HOME");
        unsafe {
            env::set_var("XDG_CONFIG_HOME", &config_home);
            for key in [
                ENV_SOCKET_URL,
                ENV_WEBSOCKET_URL,
                ENV_TICK_MS,
                ENV_CAPACITY,
                ENV_DASHBOARD,
            ] {
                env::remove_var(key);
            }
        }
        let default_path = Config::default_path();
        let config = Config::load(None);
        unsafe {
            match saved {
                Some(value) => env::set_var("XDG_CONFIG_HOME", value),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        fs::remove_dir_all(&config_home).ok();

        assert_eq!(
            default_path,
            Some(config_home.join(CONFIG_DIR).join(CONFIG_FILE))
        );
        assert_eq!(config.unwrap(), Config::default());
    }
}
