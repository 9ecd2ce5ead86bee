use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::coordinate::Coordinate;

const DEFAULT_CONFIG_FILE: &str = "farmlink.toml";
const ENV_PREFIX: &str = "FARMLINK_";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogConfig {
    /// Products per catalog page. Callers use 50 as the baseline.
    pub page_size: u32,
    /// Fallback buyer position when no device location is available.
    pub default_longitude: f64,
    pub default_latitude: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://farmlink.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            catalog: CatalogConfig {
                page_size: 50,
                default_longitude: 78.96,
                default_latitude: 20.59,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<FileDatabase>,
    catalog: Option<FileCatalog>,
    logging: Option<FileLogging>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabase {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FileCatalog {
    page_size: Option<u32>,
    default_longitude: Option<f64>,
    default_latitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Loads configuration in layers: built-in defaults, then the TOML file,
    /// then `FARMLINK_*` environment variables, then explicit overrides, and
    /// validates the result.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        Self::load_with_env(options, |key| env::var(key).ok())
    }

    fn load_with_env<E>(options: LoadOptions, env_lookup: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let path = options
            .config_path
            .clone()
            .or_else(|| env_lookup(&format!("{ENV_PREFIX}CONFIG")).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            let file: FileConfig = toml::from_str(&raw)
                .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
            config.apply_file(file);
        } else if options.require_file || options.config_path.is_some() {
            return Err(ConfigError::MissingConfigFile(path));
        }

        config.apply_env(&env_lookup)?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(database) = file.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }
        if let Some(catalog) = file.catalog {
            if let Some(page_size) = catalog.page_size {
                self.catalog.page_size = page_size;
            }
            if let Some(longitude) = catalog.default_longitude {
                self.catalog.default_longitude = longitude;
            }
            if let Some(latitude) = catalog.default_latitude {
                self.catalog.default_latitude = latitude;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env<E>(&mut self, env_lookup: &E) -> Result<(), ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env_lookup(&format!("{ENV_PREFIX}DATABASE_URL")) {
            self.database.url = url;
        }
        if let Some(value) = env_lookup(&format!("{ENV_PREFIX}DB_MAX_CONNECTIONS")) {
            self.database.max_connections = parse_env("DB_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = env_lookup(&format!("{ENV_PREFIX}DB_TIMEOUT_SECS")) {
            self.database.timeout_secs = parse_env("DB_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = env_lookup(&format!("{ENV_PREFIX}PAGE_SIZE")) {
            self.catalog.page_size = parse_env("PAGE_SIZE", &value)?;
        }
        if let Some(level) = env_lookup(&format!("{ENV_PREFIX}LOG_LEVEL")) {
            self.logging.level = level;
        }
        if let Some(value) = env_lookup(&format!("{ENV_PREFIX}LOG_FORMAT")) {
            self.logging.format =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: format!("{ENV_PREFIX}LOG_FORMAT"),
                    value,
                })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(page_size) = overrides.page_size {
            self.catalog.page_size = page_size;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database max_connections must be at least 1".to_string(),
            ));
        }
        if self.catalog.page_size == 0 {
            return Err(ConfigError::Validation("catalog page_size must be positive".to_string()));
        }
        Coordinate::new(self.catalog.default_longitude, self.catalog.default_latitude)
            .map_err(|error| {
                ConfigError::Validation(format!("catalog default location invalid: {error}"))
            })?;
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level `{}`",
                self.logging.level
            )));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: format!("{ENV_PREFIX}{key}"),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_valid() {
        let config =
            AppConfig::load_with_env(LoadOptions::default(), no_env).expect("load defaults");
        assert_eq!(config.catalog.page_size, 50);
        assert_eq!(config.catalog.default_longitude, 78.96);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[database]\nurl = \"sqlite://test.db\"\n\n[catalog]\npage_size = 25\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n"
        )
        .expect("write config");

        let options = LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..LoadOptions::default()
        };
        let config = AppConfig::load_with_env(options, no_env).expect("load file config");

        assert_eq!(config.database.url, "sqlite://test.db");
        assert_eq!(config.catalog.page_size, 25);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn env_values_override_file_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[catalog]\npage_size = 25\n").expect("write config");

        let env: HashMap<String, String> = HashMap::from([
            ("FARMLINK_PAGE_SIZE".to_string(), "10".to_string()),
            ("FARMLINK_LOG_FORMAT".to_string(), "pretty".to_string()),
        ]);
        let options = LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..LoadOptions::default()
        };
        let config = AppConfig::load_with_env(options, |key| env.get(key).cloned())
            .expect("load with env");

        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn explicit_overrides_win_over_everything() {
        let env: HashMap<String, String> =
            HashMap::from([("FARMLINK_PAGE_SIZE".to_string(), "10".to_string())]);
        let options = LoadOptions {
            overrides: ConfigOverrides { page_size: Some(5), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };

        let config = AppConfig::load_with_env(options, |key| env.get(key).cloned())
            .expect("load with overrides");
        assert_eq!(config.catalog.page_size, 5);
    }

    #[test]
    fn malformed_env_override_is_reported_with_its_key() {
        let env: HashMap<String, String> =
            HashMap::from([("FARMLINK_PAGE_SIZE".to_string(), "many".to_string())]);

        let error = AppConfig::load_with_env(LoadOptions::default(), |key| env.get(key).cloned())
            .expect_err("invalid page size");
        assert!(matches!(error, ConfigError::InvalidEnvOverride { ref key, .. }
            if key == "FARMLINK_PAGE_SIZE"));
    }

    #[test]
    fn missing_required_file_fails() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            require_file: true,
            ..LoadOptions::default()
        };

        let error = AppConfig::load_with_env(options, no_env).expect_err("missing file");
        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let options = LoadOptions {
            overrides: ConfigOverrides { page_size: Some(0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };

        let error = AppConfig::load_with_env(options, no_env).expect_err("zero page size");
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                log_level: Some("verbose".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };

        let error = AppConfig::load_with_env(options, no_env).expect_err("bad log level");
        assert!(matches!(error, ConfigError::Validation(_)));
    }
}
