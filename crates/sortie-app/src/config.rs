//! Runtime configuration for the host process.
//!
//! [`AppConfig`] is read from an optional TOML file (`SORTIE_CONFIG`, default
//! `sortie.toml`). Missing keys fall back to defaults and a missing file is
//! not an error. A handful of environment variables override file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use sortie_core::constants::DEFAULT_FRAME_RATE;
use sortie_core::types::Viewport;
use sortie_sim::SimConfig;

pub const CONFIG_PATH_VAR: &str = "SORTIE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "sortie.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Decision service endpoint. `None` keeps the wingman on local steering.
    pub decision_url: Option<String>,
    pub decision_timeout_ms: u64,
    pub frame_rate: u32,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub seed: u64,
    /// Write a full snapshot line per frame, not only events.
    pub emit_snapshots: bool,
    pub wingman_prompt: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            decision_url: None,
            decision_timeout_ms: 1500,
            frame_rate: DEFAULT_FRAME_RATE,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            seed: 42,
            emit_snapshots: false,
            wingman_prompt: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid {
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl AppConfig {
    /// File (if any) plus process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::from_path(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `DECISION_SERVICE_URL`, `DECISION_TIMEOUT_MS`,
    /// `SORTIE_FRAME_RATE` and `SORTIE_SEED` from `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DECISION_SERVICE_URL") {
            let url = url.trim();
            self.decision_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(v) = lookup("DECISION_TIMEOUT_MS") {
            self.decision_timeout_ms = parse_var("DECISION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SORTIE_FRAME_RATE") {
            self.frame_rate = parse_var("SORTIE_FRAME_RATE", &v)?;
        }
        if let Some(v) = lookup("SORTIE_SEED") {
            self.seed = parse_var("SORTIE_SEED", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 || self.frame_rate > 240 {
            return Err(ConfigError::Invalid {
                key: "frame_rate",
                value: self.frame_rate.to_string(),
            });
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.viewport_width) || !positive(self.viewport_height) {
            return Err(ConfigError::Invalid {
                key: "viewport",
                value: format!("{}x{}", self.viewport_width, self.viewport_height),
            });
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.frame_rate.max(1)))
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            viewport: self.viewport(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            decision_url = "http://127.0.0.1:8787/api/wingman"
            emit_snapshots = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config.decision_url.as_deref(),
            Some("http://127.0.0.1:8787/api/wingman")
        );
        assert!(config.emit_snapshots);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.decision_timeout_ms, 1500);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = AppConfig::from_path(Path::new("/nonexistent/sortie.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("sortie-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "frame_rate = \"fast\"").unwrap();

        let err = AppConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("DECISION_SERVICE_URL", " http://localhost:9000/decide "),
                ("DECISION_TIMEOUT_MS", "250"),
                ("SORTIE_FRAME_RATE", "30"),
                ("SORTIE_SEED", "7"),
            ]))
            .unwrap();
        assert_eq!(
            config.decision_url.as_deref(),
            Some("http://localhost:9000/decide")
        );
        assert_eq!(config.decision_timeout(), Duration::from_millis(250));
        assert_eq!(config.frame_interval(), Duration::from_nanos(33_333_333));
        assert_eq!(config.sim_config().seed, 7);
    }

    #[test]
    fn test_blank_url_disables_service() {
        let mut config = AppConfig {
            decision_url: Some("http://x".into()),
            ..Default::default()
        };
        config
            .apply_env(env(&[("DECISION_SERVICE_URL", "  ")]))
            .unwrap();
        assert!(config.decision_url.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[("SORTIE_SEED", "forty-two")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SORTIE_SEED", .. }));

        let config = AppConfig {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            viewport_width: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
