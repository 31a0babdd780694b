//! Ethernet / IPv4 / transport header parsing.

use std::net::SocketAddrV4;

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

use crate::error::DecodeError;

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_MIN_HEADER_LEN: usize = 20;
const TCP_MIN_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;

/// Transport protocol carried by an IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
    Other(u8),
}

impl From<IpNextHeaderProtocol> for Transport {
    fn from(protocol: IpNextHeaderProtocol) -> Self {
        match protocol {
            IpNextHeaderProtocols::Tcp => Self::Tcp,
            IpNextHeaderProtocols::Udp => Self::Udp,
            other => Self::Other(other.0),
        }
    }
}

/// The parts of a frame the engine cares about, borrowed from the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub transport: Transport,
    /// Source address; port is 0 for transports without ports
    pub source: SocketAddrV4,
    /// Destination address; port is 0 for transports without ports
    pub destination: SocketAddrV4,
    /// Transport payload, empty for `Transport::Other`
    pub payload: &'a [u8],
}

/// Parse an Ethernet frame down to its transport segment.
///
/// Returns `Ok(None)` for frames that are well formed but carry no IPv4
/// transport header (other ethertypes, non-first fragments) and `Err` for
/// frames whose headers are truncated or inconsistent.
pub fn parse_segment(frame: &[u8]) -> Result<Option<Segment<'_>>, DecodeError> {
    let ethernet = EthernetPacket::new(frame).ok_or(DecodeError::Truncated {
        layer: "Ethernet",
        expected: ETHERNET_HEADER_LEN,
        actual: frame.len(),
    })?;

    // We only care about IPv4
    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return Ok(None);
    }

    let ip_bytes = &frame[ETHERNET_HEADER_LEN..];
    let ipv4 = Ipv4Packet::new(ip_bytes).ok_or(DecodeError::Truncated {
        layer: "IPv4",
        expected: IPV4_MIN_HEADER_LEN,
        actual: ip_bytes.len(),
    })?;

    if ipv4.get_version() != 4 {
        return Err(DecodeError::Malformed {
            layer: "IPv4",
            detail: format!("version {}", ipv4.get_version()),
        });
    }

    let header_len = usize::from(ipv4.get_header_length()) * 4;
    let total_len = usize::from(ipv4.get_total_length());

    if header_len < IPV4_MIN_HEADER_LEN || header_len > total_len {
        return Err(DecodeError::Malformed {
            layer: "IPv4",
            detail: format!("header length {header_len}, total length {total_len}"),
        });
    }

    // Total length bounds the datagram; anything past it is link-layer padding
    if total_len > ip_bytes.len() {
        return Err(DecodeError::Truncated {
            layer: "IPv4",
            expected: total_len,
            actual: ip_bytes.len(),
        });
    }

    // Only the first fragment carries the transport header
    if ipv4.get_fragment_offset() != 0 {
        return Ok(None);
    }

    let source_ip = ipv4.get_source();
    let destination_ip = ipv4.get_destination();
    let transport_bytes = &ip_bytes[header_len..total_len];

    match Transport::from(ipv4.get_next_level_protocol()) {
        Transport::Tcp => {
            let tcp = TcpPacket::new(transport_bytes).ok_or(DecodeError::Truncated {
                layer: "TCP",
                expected: TCP_MIN_HEADER_LEN,
                actual: transport_bytes.len(),
            })?;

            let data_offset = usize::from(tcp.get_data_offset()) * 4;
            if data_offset < TCP_MIN_HEADER_LEN || data_offset > transport_bytes.len() {
                return Err(DecodeError::Malformed {
                    layer: "TCP",
                    detail: format!(
                        "data offset {data_offset} in {} byte segment",
                        transport_bytes.len()
                    ),
                });
            }

            Ok(Some(Segment {
                transport: Transport::Tcp,
                source: SocketAddrV4::new(source_ip, tcp.get_source()),
                destination: SocketAddrV4::new(destination_ip, tcp.get_destination()),
                payload: &transport_bytes[data_offset..],
            }))
        }
        Transport::Udp => {
            let udp = UdpPacket::new(transport_bytes).ok_or(DecodeError::Truncated {
                layer: "UDP",
                expected: UDP_HEADER_LEN,
                actual: transport_bytes.len(),
            })?;

            Ok(Some(Segment {
                transport: Transport::Udp,
                source: SocketAddrV4::new(source_ip, udp.get_source()),
                destination: SocketAddrV4::new(destination_ip, udp.get_destination()),
                payload: &transport_bytes[UDP_HEADER_LEN..],
            }))
        }
        other => Ok(Some(Segment {
            transport: other,
            source: SocketAddrV4::new(source_ip, 0),
            destination: SocketAddrV4::new(destination_ip, 0),
            payload: &[],
        })),
    }
}
