//! Incremental fixed/variable length classification.

use std::collections::BTreeMap;

use crate::domain::{Classification, ClassificationCounts, DecodedPacket, Direction, OpcodeRecord};

/// Result of observing one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting of the opcode, or its first transition to variable.
    ClassificationChanged,
    /// Only the occurrence count (and possibly the length set) moved.
    NoStructuralChange,
}

impl Observation {
    pub fn is_change(&self) -> bool {
        matches!(self, Self::ClassificationChanged)
    }
}

/// Opcode table for one direction.
///
/// Owned by a single pipeline and only touched from the capture thread,
/// so it carries no locking of its own.
#[derive(Debug)]
pub struct OpcodeClassifier {
    direction: Direction,
    records: BTreeMap<u16, OpcodeRecord>,
}

impl OpcodeClassifier {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            records: BTreeMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Record a packet and reclassify its opcode.
    pub fn observe(&mut self, packet: &DecodedPacket) -> Observation {
        debug_assert_eq!(packet.direction, self.direction);

        let record = self
            .records
            .entry(packet.opcode)
            .or_insert_with(|| OpcodeRecord::new(packet.opcode));

        match record.observe(packet.len()) {
            None => {
                tracing::debug!(
                    "New {} opcode {:#06x} ({})",
                    self.direction,
                    packet.opcode,
                    record.classification
                );
                Observation::ClassificationChanged
            }
            Some(Classification::Fixed(previous)) if record.classification.is_variable() => {
                tracing::debug!(
                    "{} opcode {:#06x} is variable (lengths {} and {})",
                    self.direction,
                    packet.opcode,
                    previous,
                    packet.len()
                );
                Observation::ClassificationChanged
            }
            Some(_) => Observation::NoStructuralChange,
        }
    }

    pub fn record(&self, opcode: u16) -> Option<&OpcodeRecord> {
        self.records.get(&opcode)
    }

    /// Point-in-time copy of every record, ascending by opcode.
    pub fn snapshot(&self) -> Vec<OpcodeRecord> {
        self.records.values().cloned().collect()
    }

    pub fn counts(&self) -> ClassificationCounts {
        ClassificationCounts::tally(self.records.values())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
