//! Frame decoding module.
//!
//! This module is responsible for turning raw link-layer frames into
//! domain packets (SRP). Header parsing lives in `layers` so that the
//! capture filter can share it.

mod frame_decoder;
mod layers;

pub use frame_decoder::FrameDecoder;
pub use layers::{parse_segment, Segment, Transport};
