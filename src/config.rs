//! Settings the engine needs from its environment.
//!
//! Layers, lowest to highest priority: `key = value` config file,
//! `OPSCOPE_*` environment variables, command-line flags (applied by the
//! binary through `Config::apply`).

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use crate::domain::EndpointFilter;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/opscope.conf";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Loaded configuration. Server address and port stay optional until
/// `endpoint()` is asked for, so the CLI can fill them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_address: Option<Ipv4Addr>,
    pub server_port: Option<u16>,
    /// Capture device; the first suitable interface when unset
    pub device: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: None,
            server_port: None,
            device: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Values that override the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_address: Option<String>,
    pub server_port: Option<String>,
    pub device: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Read `OPSCOPE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            server_address: std::env::var("OPSCOPE_SERVER_ADDRESS").ok(),
            server_port: std::env::var("OPSCOPE_SERVER_PORT").ok(),
            device: std::env::var("OPSCOPE_DEVICE").ok(),
            log_level: std::env::var("OPSCOPE_LOG_LEVEL").ok(),
        }
    }
}

impl Config {
    /// Load from the config file and environment.
    ///
    /// `path` falls back to `OPSCOPE_CONFIG`, then the default path. A
    /// missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var("OPSCOPE_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
        });

        let mut config = Self::from_file(&path)?;
        config.apply(Overrides::from_env())?;
        Ok(config)
    }

    /// Read only the config file, without environment overrides. A missing
    /// file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse `key = value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys ignored.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut overrides = Overrides::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().to_string();
                match key.trim() {
                    "server_address" => overrides.server_address = Some(value),
                    "server_port" => overrides.server_port = Some(value),
                    "device" => overrides.device = Some(value),
                    "log_level" => overrides.log_level = Some(value),
                    _ => {}
                }
            }
        }

        let mut config = Self::default();
        config.apply(overrides)?;
        Ok(config)
    }

    /// Apply a layer of overrides on top of this configuration.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(value) = overrides.server_address {
            self.server_address = Some(parse_address(&value)?);
        }
        if let Some(value) = overrides.server_port {
            self.server_port = Some(parse_port(&value)?);
        }
        if let Some(value) = overrides.device.filter(|v| !v.is_empty()) {
            self.device = Some(value);
        }
        if let Some(value) = overrides.log_level.filter(|v| !v.is_empty()) {
            self.log_level = value;
        }
        Ok(())
    }

    /// The endpoint to capture, once address and port are both known.
    pub fn endpoint(&self) -> Result<EndpointFilter, ConfigError> {
        let address = self
            .server_address
            .ok_or(ConfigError::Missing("server_address"))?;
        let port = self.server_port.ok_or(ConfigError::Missing("server_port"))?;
        EndpointFilter::new(address, port)
    }
}

fn parse_address(value: &str) -> Result<Ipv4Addr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(value.to_string()))
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_string())),
    }
}
