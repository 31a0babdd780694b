//! opscope - game-server opcode sniffer.
//!
//! Captures TCP traffic to and from one server endpoint, splits it into
//! sent and received streams, reads the little-endian opcode at the start
//! of every payload and classifies each opcode as fixed or variable length.
//!
//! The pieces follow the flow of a frame:
//! `capture` (raw frames) -> `decoder` (direction-filtered packets) ->
//! `classifier` (per-opcode length history) -> `stats` (totals) ->
//! `reporter` (event sinks). `session` wires them together on a capture
//! thread.

pub mod capture;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod domain;
pub mod error;
pub mod reporter;
pub mod session;
pub mod stats;

#[doc(hidden)]
pub mod testing;

pub use capture::{CaptureBackend, CaptureFilter, FrameRead, FrameReceiver, PcapReplay, PnetCapture};
pub use classifier::{Observation, OpcodeClassifier};
pub use config::Config;
pub use decoder::FrameDecoder;
pub use domain::{
    Classification, ClassificationCounts, DecodedPacket, Direction, EndpointFilter, EngineEvent,
    OpcodeRecord, Stats,
};
pub use error::{CaptureError, ConfigError, DecodeError};
pub use reporter::{ConsoleReporter, EventSink, NullSink};
pub use session::{CaptureSession, Pipeline, SessionState};
pub use stats::StatsAggregator;
