use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced synchronously from `CaptureSession::start`.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("Insufficient permissions to open capture device. Try running as root or with CAP_NET_RAW.")]
    InsufficientPermissions,

    #[error("Failed to open capture device '{device}': {reason}")]
    DeviceOpen { device: String, reason: String },

    #[error("Capture filter rejected: {0}")]
    Filter(String),

    #[error("Failed to spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A frame that could not be parsed. Never escapes the decode pipeline.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{layer} header truncated: need {expected} bytes, have {actual}")]
    Truncated {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed {layer} header: {detail}")]
    Malformed {
        layer: &'static str,
        detail: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Invalid server port: {0} (expected 1-65535)")]
    InvalidPort(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}
