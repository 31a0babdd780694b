//! Capture sessions.
//!
//! A `Pipeline` fans each raw frame out to the sent and received
//! decode/classify lanes; a `CaptureSession` drives a pipeline from a
//! capture backend on its own thread.

mod capture_session;
mod pipeline;

pub use capture_session::{CaptureSession, SessionState};
pub use pipeline::Pipeline;
