use std::collections::BTreeMap;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::metadata::ConnectionMetadata;

pub const DEFAULT_APP_NAME: &str = "GeoEcho";
pub const DEFAULT_ASSETS_BINDING: &str = "ASSETS";
pub const DEFAULT_ASSETS_DIR: &str = "public";
pub const DEFAULT_INDEX_FILE: &str = "index.html";
pub const DEFAULT_DEV_ADDR: &str = "127.0.0.1:8787";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("manifest failed validation: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error("invalid [dev] addr `{addr}`: {source}")]
    DevAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}

pub struct ManifestLoader {
    manifest: Arc<Manifest>,
}

impl ManifestLoader {
    pub fn load_from_str(contents: &str) -> Result<Self, ManifestError> {
        let manifest = Manifest::parse(contents, None)?;
        Ok(Self {
            manifest: Arc::new(manifest),
        })
    }

    /// Load `path`. Relative directories in the manifest resolve against the file's parent.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cwd = std::env::current_dir().map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Manifest::parse(&contents, Some(resolve_root_path(path, &cwd)))?;
        Ok(Self {
            manifest: Arc::new(manifest),
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn shared(&self) -> Arc<Manifest> {
        Arc::clone(&self.manifest)
    }
}

fn resolve_root_path(path: &Path, cwd: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => cwd.to_path_buf(),
        Some(parent) if parent.is_relative() => cwd.join(parent),
        Some(parent) => parent.to_path_buf(),
        None => cwd.to_path_buf(),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct Manifest {
    #[serde(default)]
    #[validate(nested)]
    pub app: ManifestApp,
    #[serde(default)]
    #[validate(nested)]
    pub assets: ManifestAssets,
    #[serde(default)]
    #[validate(nested)]
    pub dev: ManifestDev,
    #[serde(default)]
    pub logging: ManifestLogging,
    #[serde(skip)]
    root: Option<PathBuf>,
    #[serde(skip, default = "default_socket_addr")]
    dev_addr: SocketAddr,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            app: ManifestApp::default(),
            assets: ManifestAssets::default(),
            dev: ManifestDev::default(),
            logging: ManifestLogging::default(),
            root: None,
            dev_addr: default_socket_addr(),
        }
    }
}

impl Manifest {
    fn parse(contents: &str, root: Option<PathBuf>) -> Result<Self, ManifestError> {
        let mut manifest: Manifest = toml::from_str(contents)?;
        manifest.validate()?;
        manifest.root = root;
        manifest.dev_addr = match &manifest.dev.addr {
            Some(addr) => addr.parse().map_err(|source| ManifestError::DevAddr {
                addr: addr.clone(),
                source,
            })?,
            None => default_socket_addr(),
        };
        Ok(manifest)
    }

    /// Directory containing the manifest file, when loaded from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn app_name(&self) -> &str {
        self.app.name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    pub fn source_override(&self) -> Option<&str> {
        self.app.source.as_deref()
    }

    pub fn assets_dir(&self) -> PathBuf {
        let dir = Path::new(&self.assets.dir);
        match &self.root {
            Some(root) if dir.is_relative() => root.join(dir),
            _ => dir.to_path_buf(),
        }
    }

    pub fn dev_addr(&self) -> SocketAddr {
        self.dev_addr
    }

    pub fn dev_metadata(&self) -> &ConnectionMetadata {
        &self.dev.metadata
    }

    pub fn logging_for(&self, adapter: &str) -> Option<ResolvedLoggingConfig> {
        self.logging
            .adapters
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(adapter))
            .map(|(_, cfg)| ResolvedLoggingConfig::from_manifest(cfg))
    }

    pub fn logging_or_default(&self, adapter: &str) -> ResolvedLoggingConfig {
        self.logging_for(adapter).unwrap_or_default()
    }
}

fn default_socket_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManifestApp {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// Replaces the `source` label in `/api/location` responses.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManifestAssets {
    #[serde(default = "default_binding")]
    #[validate(length(min = 1))]
    pub binding: String,
    #[serde(default = "default_dir")]
    #[validate(length(min = 1))]
    pub dir: String,
    #[serde(default = "default_index")]
    #[validate(length(min = 1))]
    pub index: Vec<String>,
}

impl Default for ManifestAssets {
    fn default() -> Self {
        Self {
            binding: default_binding(),
            dir: default_dir(),
            index: default_index(),
        }
    }
}

fn default_binding() -> String {
    DEFAULT_ASSETS_BINDING.to_string()
}

fn default_dir() -> String {
    DEFAULT_ASSETS_DIR.to_string()
}

fn default_index() -> Vec<String> {
    vec![DEFAULT_INDEX_FILE.to_string()]
}

/// Settings used only by the local dev server.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManifestDev {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub addr: Option<String>,
    /// Stand-in for the metadata the edge platform would attach to each request.
    #[serde(default)]
    pub metadata: ConnectionMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManifestLogging {
    #[serde(flatten)]
    pub adapters: BTreeMap<String, ManifestLoggingConfig>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ManifestLoggingConfig {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub echo_stdout: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLoggingConfig {
    pub level: LogLevel,
    pub echo_stdout: bool,
}

impl Default for ResolvedLoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            echo_stdout: true,
        }
    }
}

impl ResolvedLoggingConfig {
    fn from_manifest(cfg: &ManifestLoggingConfig) -> Self {
        let defaults = Self::default();
        Self {
            level: cfg.level.unwrap_or(defaults.level),
            echo_stdout: cfg.echo_stdout.unwrap_or(defaults.echo_stdout),
        }
    }

    /// Effective filter: `Off` when stdout echo is disabled.
    pub fn level_filter(&self) -> LevelFilter {
        if self.echo_stdout {
            self.level.into()
        } else {
            LevelFilter::Off
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" => Ok(Self::Off),
            other => Err(serde::de::Error::custom(format!(
                "logging level must be trace, debug, info, warn, error, or off (got `{}`)",
                other
            ))),
        }
    }
}
