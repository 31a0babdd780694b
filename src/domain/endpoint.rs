//! The server endpoint a capture session is scoped to.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::ConfigError;

/// The remote game server whose traffic is captured.
///
/// Immutable for the lifetime of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointFilter {
    server_address: Ipv4Addr,
    server_port: u16,
}

impl EndpointFilter {
    /// Create a new endpoint filter.
    ///
    /// Port 0 can never appear on the wire as a TCP endpoint and is rejected.
    pub fn new(server_address: Ipv4Addr, server_port: u16) -> Result<Self, ConfigError> {
        if server_port == 0 {
            return Err(ConfigError::InvalidPort(server_port.to_string()));
        }

        Ok(Self {
            server_address,
            server_port,
        })
    }

    pub fn server_address(&self) -> Ipv4Addr {
        self.server_address
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.server_address, self.server_port)
    }

    /// Check whether an address/port pair is the server.
    pub fn is_server(&self, addr: SocketAddrV4) -> bool {
        addr == self.socket_addr()
    }

    /// The capture filter expression handed to the capture backend.
    pub fn filter_expression(&self) -> String {
        format!(
            "tcp and host {} and port {}",
            self.server_address, self.server_port
        )
    }
}

impl fmt::Display for EndpointFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.server_address, self.server_port)
    }
}
