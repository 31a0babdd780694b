//! Direction-aware frame decoding.

use crate::domain::{DecodedPacket, Direction, EndpointFilter};

use super::layers::{parse_segment, Segment, Transport};

/// Decodes raw frames for one direction of the server conversation.
///
/// Each qualifying TCP segment is treated as exactly one application
/// packet. Segments are not reassembled.
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    direction: Direction,
}

impl FrameDecoder {
    /// Create a decoder for the given direction.
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Decode a raw Ethernet frame.
    ///
    /// Returns `None` for frames that are not IPv4/TCP, that belong to the
    /// other direction or another endpoint, or whose payload is too short
    /// to carry an opcode. Malformed frames are logged and also yield `None`.
    pub fn decode(&self, frame: &[u8], endpoint: &EndpointFilter) -> Option<DecodedPacket> {
        let segment = match parse_segment(frame) {
            Ok(Some(segment)) => segment,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Dropping malformed frame ({} bytes): {}", frame.len(), e);
                return None;
            }
        };

        if segment.transport != Transport::Tcp || !self.matches(&segment, endpoint) {
            return None;
        }

        DecodedPacket::from_payload(segment.payload, self.direction)
    }

    /// Check the segment against the endpoint for this decoder's direction.
    fn matches(&self, segment: &Segment<'_>, endpoint: &EndpointFilter) -> bool {
        match self.direction {
            Direction::Received => endpoint.is_server(segment.source),
            Direction::Sent => endpoint.is_server(segment.destination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::frames as test_frames;
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn endpoint() -> EndpointFilter {
        EndpointFilter::new(Ipv4Addr::new(203, 0, 113, 7), 7171).unwrap()
    }

    fn client() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 10), 50123)
    }

    fn server() -> SocketAddrV4 {
        endpoint().socket_addr()
    }

    #[test]
    fn test_sent_decoder_accepts_client_to_server() {
        let decoder = FrameDecoder::new(Direction::Sent);
        let frame = test_frames::tcp(client(), server(), &[0x69, 0x00, 0xde, 0xad]);

        let packet = decoder.decode(&frame, &endpoint()).unwrap();
        assert_eq!(packet.opcode, 0x0069);
        assert_eq!(packet.payload, vec![0x69, 0x00, 0xde, 0xad]);
        assert_eq!(packet.direction, Direction::Sent);
    }

    #[test]
    fn test_received_decoder_accepts_server_to_client() {
        let decoder = FrameDecoder::new(Direction::Received);
        let frame = test_frames::tcp(server(), client(), &[0x78, 0x00]);

        let packet = decoder.decode(&frame, &endpoint()).unwrap();
        assert_eq!(packet.opcode, 0x0078);
        assert_eq!(packet.direction, Direction::Received);
    }

    #[test]
    fn test_direction_isolation() {
        let sent = FrameDecoder::new(Direction::Sent);
        let received = FrameDecoder::new(Direction::Received);

        let outbound = test_frames::tcp(client(), server(), &[0x01, 0x00]);
        let inbound = test_frames::tcp(server(), client(), &[0x02, 0x00]);

        assert!(sent.decode(&outbound, &endpoint()).is_some());
        assert!(received.decode(&outbound, &endpoint()).is_none());
        assert!(received.decode(&inbound, &endpoint()).is_some());
        assert!(sent.decode(&inbound, &endpoint()).is_none());
    }

    #[test]
    fn test_wrong_port_rejected() {
        let decoder = FrameDecoder::new(Direction::Sent);
        let other = SocketAddrV4::new(*server().ip(), 7172);
        let frame = test_frames::tcp(client(), other, &[0x01, 0x00]);

        assert!(decoder.decode(&frame, &endpoint()).is_none());
    }

    #[test]
    fn test_wrong_address_rejected() {
        let decoder = FrameDecoder::new(Direction::Received);
        let other = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 8), 7171);
        let frame = test_frames::tcp(other, client(), &[0x01, 0x00]);

        assert!(decoder.decode(&frame, &endpoint()).is_none());
    }

    #[test]
    fn test_short_payloads_dropped() {
        let decoder = FrameDecoder::new(Direction::Sent);

        let empty = test_frames::tcp(client(), server(), &[]);
        let one_byte = test_frames::tcp(client(), server(), &[0x69]);

        assert!(decoder.decode(&empty, &endpoint()).is_none());
        assert!(decoder.decode(&one_byte, &endpoint()).is_none());
    }

    #[test]
    fn test_udp_to_server_port_ignored() {
        let decoder = FrameDecoder::new(Direction::Sent);
        let frame = test_frames::udp(client(), server(), &[0x69, 0x00, 0x01]);

        assert!(decoder.decode(&frame, &endpoint()).is_none());
    }

    #[test]
    fn test_malformed_frame_yields_none() {
        let decoder = FrameDecoder::new(Direction::Sent);
        let frame = test_frames::tcp(client(), server(), &[0x69, 0x00, 0x01]);

        assert!(decoder.decode(&frame[..30], &endpoint()).is_none());
        assert!(decoder.decode(&[], &endpoint()).is_none());
    }
}
