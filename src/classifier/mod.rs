//! Opcode classification module.
//!
//! This module is responsible for tracking payload lengths per opcode
//! and deciding whether each opcode is fixed or variable length (SRP).

mod opcode_classifier;

pub use opcode_classifier::{Observation, OpcodeClassifier};
