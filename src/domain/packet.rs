//! Decoded application packets.

use std::fmt;
use std::time::SystemTime;

/// Which way a packet travelled relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Client to server: the destination is the server endpoint.
    Sent,
    /// Server to client: the source is the server endpoint.
    Received,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Sent, Direction::Received];

    /// Short tag used in log and console output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sent => "SEND",
            Self::Received => "RECV",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Received => write!(f, "received"),
        }
    }
}

/// One application packet extracted from a qualifying TCP segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    /// Little-endian opcode from the first two payload bytes
    pub opcode: u16,
    /// The full TCP payload, opcode included
    pub payload: Vec<u8>,
    /// Wall-clock time the packet was decoded
    pub timestamp: SystemTime,
    pub direction: Direction,
}

impl DecodedPacket {
    /// Build a packet from a TCP payload.
    ///
    /// Returns `None` when the payload is too short to hold an opcode.
    pub fn from_payload(payload: &[u8], direction: Direction) -> Option<Self> {
        let opcode = read_opcode(payload)?;

        Some(Self {
            opcode,
            payload: payload.to_vec(),
            timestamp: SystemTime::now(),
            direction,
        })
    }

    /// Payload length as tracked by the classifier.
    pub fn len(&self) -> u32 {
        u32::try_from(self.payload.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Read the opcode prefix. The target protocol is little-endian on the wire.
pub fn read_opcode(payload: &[u8]) -> Option<u16> {
    match payload {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}
