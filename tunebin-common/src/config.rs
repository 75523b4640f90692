//! Configuration loading and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file never stops startup; it only produces a warning and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default upload size limit: 100 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Label assigned by the genre stub
pub const DEFAULT_GENRE_LABEL: &str = "Jazz";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TUNEBIN_ROOT_FOLDER";

/// Catalog database file name inside the root folder
pub const DATABASE_FILE: &str = "catalog.db";

/// Upload directory name inside the root folder, also the URL prefix
pub const UPLOADS_DIR: &str = "uploads";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database and the uploads directory
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    pub port: Option<u16>,

    /// HTTP bind host
    pub host: Option<String>,

    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,

    /// Genre assigned to every upload by the stub classifier
    pub genre_label: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: None,
            host: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            genre_label: DEFAULT_GENRE_LABEL.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where [`TomlConfig::load`] got its values from
///
/// Loading happens before the tracing subscriber exists, so the outcome is
/// returned and logged by the caller once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file at this path; defaults used
    Missing(PathBuf),
    /// No platform config directory; defaults used
    NoConfigDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::NoConfigDir => warn!("No platform config directory, using defaults"),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from `explicit` or the platform config path
    ///
    /// Missing files fall back to defaults. A file that exists but does not
    /// parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            return Ok((Self::default(), ConfigSource::NoConfigDir));
        };

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Missing(path)));
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok((config, ConfigSource::File(path)))
    }
}

/// Platform config file location: `<config_dir>/tunebin/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunebin").join("config.toml"))
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunebin"))
        .unwrap_or_else(|| PathBuf::from("./tunebin_data"))
}

/// Resolve the root folder: CLI argument, then environment, then TOML, then default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Resolved root folder and the paths derived from it
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the root folder and uploads directory if missing
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating root folder: {}", self.path.display());
        }
        std::fs::create_dir_all(&self.path)?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.path.join(UPLOADS_DIR)
    }
}

/// Values supplied on the command line (or through clap's env bindings)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root_folder: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root: RootFolder,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub genre_label: String,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge command-line overrides over the TOML file and compiled defaults
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Self {
        let root = RootFolder::new(resolve_root_folder(overrides.root_folder.as_deref(), &toml));
        let host = overrides
            .host
            .or(toml.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT);

        Self {
            root,
            host,
            port,
            max_upload_bytes: toml.max_upload_bytes,
            genre_label: toml.genre_label,
            log_level: toml.logging.level,
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
