//! Application configuration
//!
//! One load point at startup: built-in defaults, overlaid by an optional TOML
//! file, overlaid by CLI flags. The resulting `AppConfig` is immutable and
//! passed explicitly (`Arc<AppConfig>`) to every component that needs it.
//! The operator-mutable repository URL is deliberately not part of this
//! struct; it lives in its own persisted store (`update::repository`).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked for in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "plugdepot.toml";

/// Default listen address for the HTTP surface.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8090";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Immutable application configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub listen: String,
    /// Directory holding one artifact file per installed plugin.
    pub plugins_dir: PathBuf,
    /// Root for service-owned state: repository config, per-plugin storage
    /// and logs.
    pub data_dir: PathBuf,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Values carried from the command line into `AppConfig::load`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub listen: Option<String>,
    pub plugins_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// On-disk representation; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileConfig {
    listen: Option<String>,
    plugins_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve the effective configuration.
    ///
    /// Precedence, lowest to highest: built-in defaults, TOML file, CLI
    /// flags. An explicitly named config file must exist and parse; the
    /// implicit `plugdepot.toml` is skipped silently when absent. Default
    /// data dir is the platform-local data dir (`<data>/plugdepot`), falling
    /// back to `./data`; default plugins dir is `<data_dir>/plugins`.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config {
            Some(path) => Some(Self::read_file(path)?),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Some(Self::read_file(implicit)?)
                } else {
                    None
                }
            }
        };
        let file = file.unwrap_or_default();

        let data_dir = overrides
            .data_dir
            .or(file.data_dir)
            .unwrap_or_else(default_data_dir);

        let plugins_dir = overrides
            .plugins_dir
            .or(file.plugins_dir)
            .unwrap_or_else(|| data_dir.join("plugins"));

        Ok(Self {
            listen: overrides
                .listen
                .or(file.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
            plugins_dir,
            data_dir,
            log_level: overrides.log_level.or(file.log_level),
            log_file: overrides.log_file.or(file.log_file),
        })
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("plugdepot"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = AppConfig::load(ConfigOverrides::default()).unwrap();

        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.plugins_dir, config.data_dir.join("plugins"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugdepot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "listen = \"0.0.0.0:9000\"\nplugins-dir = \"/opt/plugins\"\nlog-level = \"debug\""
        )
        .unwrap();

        let config = AppConfig::load(ConfigOverrides {
            config: Some(path),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.plugins_dir, PathBuf::from("/opt/plugins"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugdepot.toml");
        std::fs::write(&path, "listen = \"0.0.0.0:9000\"\n").unwrap();

        let config = AppConfig::load(ConfigOverrides {
            config: Some(path),
            listen: Some("127.0.0.1:7777".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:7777");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(ConfigOverrides {
            config: Some(PathBuf::from("/nonexistent/plugdepot.toml")),
            ..Default::default()
        });

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugdepot.toml");
        std::fs::write(&path, "listne = \"oops\"\n").unwrap();

        let result = AppConfig::load(ConfigOverrides {
            config: Some(path),
            ..Default::default()
        });

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
