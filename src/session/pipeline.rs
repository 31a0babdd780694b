//! Per-frame fan-out into both direction lanes.

use std::sync::Arc;

use crate::classifier::OpcodeClassifier;
use crate::decoder::FrameDecoder;
use crate::domain::{Direction, EndpointFilter, EngineEvent, OpcodeRecord, Stats};
use crate::reporter::EventSink;
use crate::stats::StatsAggregator;

/// Decoder and classifier for one direction.
#[derive(Debug)]
struct Lane {
    decoder: FrameDecoder,
    classifier: OpcodeClassifier,
}

impl Lane {
    fn new(direction: Direction) -> Self {
        Self {
            decoder: FrameDecoder::new(direction),
            classifier: OpcodeClassifier::new(direction),
        }
    }
}

/// Decode, classify and publish pipeline for both directions.
///
/// Not thread-safe on its own; a session serialises access to it.
pub struct Pipeline {
    sent: Lane,
    received: Lane,
    stats: StatsAggregator,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sent: Lane::new(Direction::Sent),
            received: Lane::new(Direction::Received),
            stats: StatsAggregator::new(),
            sink,
        }
    }

    fn lane(&self, direction: Direction) -> &Lane {
        match direction {
            Direction::Sent => &self.sent,
            Direction::Received => &self.received,
        }
    }

    fn lane_mut(&mut self, direction: Direction) -> &mut Lane {
        match direction {
            Direction::Sent => &mut self.sent,
            Direction::Received => &mut self.received,
        }
    }

    /// Offer a raw frame to both lanes.
    ///
    /// Returns how many lanes decoded a packet from it. Each decoded packet
    /// raises `PacketObserved` followed by `StatsChanged`.
    pub fn process_frame(&mut self, frame: &[u8], endpoint: &EndpointFilter) -> usize {
        let mut decoded = 0;

        for direction in Direction::ALL {
            let Some(packet) = self.lane(direction).decoder.decode(frame, endpoint) else {
                continue;
            };

            let observation = self.lane_mut(direction).classifier.observe(&packet);

            let (sent, received) = (&self.sent.classifier, &self.received.classifier);
            let stats = self
                .stats
                .record(observation, || sent.counts() + received.counts());

            self.sink.publish(&EngineEvent::PacketObserved(packet));
            self.sink.publish(&EngineEvent::StatsChanged(stats));
            decoded += 1;
        }

        decoded
    }

    pub fn classifier(&self, direction: Direction) -> &OpcodeClassifier {
        &self.lane(direction).classifier
    }

    /// Point-in-time copy of one direction's opcode table.
    pub fn snapshot(&self, direction: Direction) -> Vec<OpcodeRecord> {
        self.classifier(direction).snapshot()
    }

    pub fn stats(&self) -> Stats {
        self.stats.stats()
    }

    /// Forget every opcode and counter, then announce the zeroed stats.
    pub fn reset(&mut self) {
        self.sent.classifier.clear();
        self.received.classifier.clear();
        self.stats.reset();
        self.sink.publish(&EngineEvent::StatsChanged(self.stats.stats()));
    }
}
