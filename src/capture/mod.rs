//! Packet capture abstraction.
//!
//! This module defines the `CaptureBackend` and `FrameReceiver` traits
//! (DIP) and provides a live pnet-based implementation plus a pcap file
//! replay. This allows for easy testing and swapping implementations (OCP).

mod filter;
mod pcap_replay;
mod pnet_capture;

pub use filter::CaptureFilter;
pub use pcap_replay::PcapReplay;
pub use pnet_capture::PnetCapture;

use crate::error::CaptureError;

/// Read timeout for live devices; bounds how long `stop()` waits.
pub const READ_TIMEOUT_MS: u64 = 100;

/// Outcome of one read from a frame receiver.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameRead<'a> {
    /// A raw link-layer frame that passed the installed filter
    Frame(&'a [u8]),
    /// Nothing arrived within the read timeout
    Timeout,
    /// The source is exhausted or unusable; no more frames will arrive
    Closed,
}

/// An open capture device delivering raw frames.
pub trait FrameReceiver: Send {
    /// Block for at most the configured read timeout.
    fn next_frame(&mut self) -> FrameRead<'_>;
}

/// Trait for capture backends (Dependency Inversion Principle).
///
/// This trait allows the session to depend on an abstraction rather
/// than a concrete implementation, making it easy to:
/// - Test with scripted frame sequences
/// - Switch between live capture and file replay
pub trait CaptureBackend: Send {
    /// Open `device` and install `filter`.
    ///
    /// Fails with a device error if the device cannot be opened, or
    /// `CaptureError::Filter` if the filter expression is rejected.
    fn open(&mut self, device: &str, filter: &str)
        -> Result<Box<dyn FrameReceiver>, CaptureError>;
}
