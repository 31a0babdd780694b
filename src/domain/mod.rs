//! Domain models for opcode capture and classification.
//!
//! This module contains the core domain types that are independent
//! of any infrastructure concerns (SRP, DIP).

mod endpoint;
mod events;
mod opcode;
mod packet;

pub use endpoint::EndpointFilter;
pub use events::{EngineEvent, Stats};
pub use opcode::{Classification, ClassificationCounts, OpcodeRecord};
pub use packet::{DecodedPacket, Direction};
