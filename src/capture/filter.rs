//! Capture filter expressions.
//!
//! Backends without a kernel-side filter evaluate the expression in
//! userspace. The grammar is the subset of pcap filter syntax the engine
//! produces: `tcp`, `udp`, `host <ipv4>` and `port <n>` joined by `and`.

use std::fmt;
use std::net::Ipv4Addr;

use crate::decoder::{parse_segment, Segment, Transport};
use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    Tcp,
    Udp,
    Host(Ipv4Addr),
    Port(u16),
}

impl Primitive {
    fn matches(&self, segment: &Segment<'_>) -> bool {
        match self {
            Self::Tcp => segment.transport == Transport::Tcp,
            Self::Udp => segment.transport == Transport::Udp,
            Self::Host(addr) => {
                segment.source.ip() == addr || segment.destination.ip() == addr
            }
            Self::Port(port) => {
                matches!(segment.transport, Transport::Tcp | Transport::Udp)
                    && (segment.source.port() == *port || segment.destination.port() == *port)
            }
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
            Self::Host(addr) => write!(f, "host {addr}"),
            Self::Port(port) => write!(f, "port {port}"),
        }
    }
}

/// A parsed conjunction of filter primitives.
///
/// An empty expression accepts every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureFilter {
    primitives: Vec<Primitive>,
}

impl CaptureFilter {
    /// Parse a filter expression.
    pub fn parse(expression: &str) -> Result<Self, CaptureError> {
        let mut tokens = expression.split_whitespace().peekable();
        let mut primitives = Vec::new();

        while let Some(token) = tokens.next() {
            let primitive = match token.to_ascii_lowercase().as_str() {
                "tcp" => Primitive::Tcp,
                "udp" => Primitive::Udp,
                "host" => {
                    let value = tokens.next().ok_or_else(|| {
                        CaptureError::Filter("'host' requires an address".to_string())
                    })?;
                    let addr = value.parse::<Ipv4Addr>().map_err(|_| {
                        CaptureError::Filter(format!("invalid IPv4 address '{value}'"))
                    })?;
                    Primitive::Host(addr)
                }
                "port" => {
                    let value = tokens.next().ok_or_else(|| {
                        CaptureError::Filter("'port' requires a number".to_string())
                    })?;
                    match value.parse::<u16>() {
                        Ok(port) if port != 0 => Primitive::Port(port),
                        _ => {
                            return Err(CaptureError::Filter(format!(
                                "invalid port '{value}' (expected 1-65535)"
                            )))
                        }
                    }
                }
                other => {
                    return Err(CaptureError::Filter(format!("unknown primitive '{other}'")))
                }
            };
            primitives.push(primitive);

            match tokens.next() {
                None => break,
                Some(joiner) if joiner.eq_ignore_ascii_case("and") => {
                    if tokens.peek().is_none() {
                        return Err(CaptureError::Filter(
                            "expression ends with 'and'".to_string(),
                        ));
                    }
                }
                Some(other) => {
                    return Err(CaptureError::Filter(format!(
                        "expected 'and', found '{other}'"
                    )))
                }
            }
        }

        Ok(Self { primitives })
    }

    /// Check whether a raw Ethernet frame passes the filter.
    ///
    /// Frames that cannot be parsed only pass an empty filter.
    pub fn matches(&self, frame: &[u8]) -> bool {
        if self.primitives.is_empty() {
            return true;
        }

        match parse_segment(frame) {
            Ok(Some(segment)) => self.primitives.iter().all(|p| p.matches(&segment)),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl fmt::Display for CaptureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.primitives.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::frames as test_frames;
    use crate::domain::EndpointFilter;
    use std::net::SocketAddrV4;

    fn server() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 7), 7171)
    }

    fn client() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 10), 50123)
    }

    fn endpoint_filter() -> CaptureFilter {
        let endpoint = EndpointFilter::new(*server().ip(), server().port()).unwrap();
        CaptureFilter::parse(&endpoint.filter_expression()).unwrap()
    }

    #[test]
    fn test_parse_endpoint_expression() {
        let filter = endpoint_filter();
        assert_eq!(filter.to_string(), "tcp and host 203.0.113.7 and port 7171");
    }

    #[test]
    fn test_matches_both_directions() {
        let filter = endpoint_filter();

        assert!(filter.matches(&test_frames::tcp(client(), server(), &[1, 0])));
        assert!(filter.matches(&test_frames::tcp(server(), client(), &[1, 0])));
    }

    #[test]
    fn test_rejects_other_traffic() {
        let filter = endpoint_filter();
        let elsewhere = SocketAddrV4::new(Ipv4Addr::new(198, 51, 100, 1), 7171);
        let other_port = SocketAddrV4::new(*server().ip(), 443);

        assert!(!filter.matches(&test_frames::udp(client(), server(), &[1, 0])));
        assert!(!filter.matches(&test_frames::tcp(client(), elsewhere, &[1, 0])));
        assert!(!filter.matches(&test_frames::tcp(client(), other_port, &[1, 0])));
        assert!(!filter.matches(&test_frames::arp()));
        assert!(!filter.matches(&[0u8; 4]));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = CaptureFilter::parse("  ").unwrap();

        assert!(filter.is_empty());
        assert!(filter.matches(&test_frames::arp()));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let filter = CaptureFilter::parse("TCP AND port 80").unwrap();
        assert_eq!(filter.to_string(), "tcp and port 80");
    }

    #[test]
    fn test_invalid_expressions() {
        for expression in [
            "tcp and",
            "host",
            "host 999.1.1.1",
            "port 0",
            "port 70000",
            "tcp or udp",
            "icmp",
            "tcp udp",
        ] {
            assert!(
                matches!(CaptureFilter::parse(expression), Err(CaptureError::Filter(_))),
                "expected '{expression}' to be rejected"
            );
        }
    }
}
