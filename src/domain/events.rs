//! Domain events raised by the capture engine.

use std::fmt;

use super::packet::DecodedPacket;

/// Running totals across both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Decoded packets across both directions
    pub frames_processed: u64,
    /// Distinct opcodes, summed over both direction tables
    pub unique_opcodes: usize,
    /// Variable-length opcodes, summed over both direction tables
    pub variable_opcodes: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames: {} | opcodes: {} | variable: {}",
            self.frames_processed, self.unique_opcodes, self.variable_opcodes
        )
    }
}

/// The two event shapes a presentation layer can subscribe to.
///
/// Events are raised on the capture thread. Consumers with thread-affine
/// state must marshal them onto their own thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PacketObserved(DecodedPacket),
    StatsChanged(Stats),
}

impl EngineEvent {
    pub fn is_packet(&self) -> bool {
        matches!(self, Self::PacketObserved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;

    #[test]
    fn test_stats_default_is_zero() {
        let stats = Stats::default();
        assert_eq!(stats.frames_processed, 0);
        assert_eq!(stats.unique_opcodes, 0);
        assert_eq!(stats.variable_opcodes, 0);
    }

    #[test]
    fn test_stats_display() {
        let stats = Stats {
            frames_processed: 12,
            unique_opcodes: 3,
            variable_opcodes: 1,
        };
        assert_eq!(stats.to_string(), "frames: 12 | opcodes: 3 | variable: 1");
    }

    #[test]
    fn test_is_packet() {
        let packet = DecodedPacket::from_payload(&[1, 0], Direction::Sent).unwrap();
        assert!(EngineEvent::PacketObserved(packet).is_packet());
        assert!(!EngineEvent::StatsChanged(Stats::default()).is_packet());
    }
}
