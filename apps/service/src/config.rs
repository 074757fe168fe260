use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: std::io::Error },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: std::io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("No config path available: neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigPathUnavailable,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub checker: CheckerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// Which storage backend to use, selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; nothing survives a restart
    #[default]
    Memory,
    /// Local libsql (SQLite) database file
    Libsql,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "libsql" | "sqlite" => Ok(StorageBackend::Libsql),
            other => Err(ConfigError::Invalid(format!("unknown storage backend '{other}'"))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Libsql => write!(f, "libsql"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file, used by the libsql backend
    pub path: String,
    /// Maximum pooled connections, used by the libsql backend
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Hard limit on a single check, in milliseconds
    pub timeout_ms: u64,
    /// Identifying `User-Agent` sent with every check
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Memory, path: "webpulse.db".into(), pool_size: 8 }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000, user_agent: "WebPulse-Analytics/1.0".into() }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/webpulse/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("webpulse/config.toml"))
}

/// Parse an environment variable if set; unset leaves the value untouched.
fn env_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} has an invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Storage")?;
        write_1(f, "Backend", &self.storage.backend)?;
        write_1(f, "Database Path", &self.storage.path)?;
        write_1(f, "Pool Size", &self.storage.pool_size)?;
        write_title_1(f, "Checker")?;
        write_1(f, "Timeout (ms)", &self.checker.timeout_ms)?;
        write_1(f, "User Agent", &self.checker.user_agent)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/webpulse/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| ConfigError::ParseFailed { path: config_path, source })
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Apply `WEBPULSE_*` environment overrides on top of the file values
    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(bind) = env_override::<String>("WEBPULSE_BIND")? {
            self.server.bind = bind;
        }
        if let Some(port) = env_override("WEBPULSE_PORT")? {
            self.server.port = port;
        }
        if let Some(backend) = env_override("WEBPULSE_STORAGE")? {
            self.storage.backend = backend;
        }
        if let Some(path) = env_override::<String>("WEBPULSE_DATABASE_PATH")? {
            self.storage.path = path;
        }
        if let Some(timeout_ms) = env_override("WEBPULSE_CHECK_TIMEOUT_MS")? {
            self.checker.timeout_ms = timeout_ms;
        }

        Ok(self)
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind cannot be empty".into()));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be greater than 0".into()));
        }

        if self.storage.pool_size == 0 {
            return Err(ConfigError::Invalid("storage.pool_size must be greater than 0".into()));
        }

        if self.storage.backend == StorageBackend::Libsql && self.storage.path.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.path is required for the libsql backend".into()));
        }

        if self.checker.timeout_ms == 0 {
            return Err(ConfigError::Invalid("checker.timeout_ms must be greater than 0".into()));
        }

        Ok(())
    }
}
