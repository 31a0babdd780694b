//! Threaded capture session lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::capture::{CaptureBackend, FrameRead, FrameReceiver};
use crate::domain::{Direction, EndpointFilter, OpcodeRecord, Stats};
use crate::error::CaptureError;
use crate::reporter::EventSink;

use super::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Running,
}

/// Captures traffic for one server endpoint and classifies its opcodes.
///
/// Frames are decoded and classified on a dedicated capture thread. The
/// pipeline sits behind one mutex: the capture thread holds it while a
/// frame is dispatched, and `stop()` takes it once after clearing the
/// running flag, so no event is published after `stop()` returns.
pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    sink: Arc<dyn EventSink>,
    pipeline: Arc<Mutex<Pipeline>>,
    running: Arc<AtomicBool>,
    endpoint: Option<EndpointFilter>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureSession {
    pub fn new(backend: Box<dyn CaptureBackend>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            backend,
            pipeline: Arc::new(Mutex::new(Pipeline::new(Arc::clone(&sink)))),
            sink,
            running: Arc::new(AtomicBool::new(false)),
            endpoint: None,
            worker: None,
        }
    }

    /// `Running` while the capture thread is alive. A thread that exited on
    /// its own (source closed) reports `Stopped`.
    pub fn state(&self) -> SessionState {
        let alive = self
            .worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());

        if alive {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    /// The endpoint of the current or most recent run.
    pub fn endpoint(&self) -> Option<EndpointFilter> {
        self.endpoint
    }

    /// Open `device`, install the endpoint filter and start capturing.
    ///
    /// A no-op if the session is already running. A capture thread that
    /// exited on its own is joined first, so the session can be restarted.
    /// On error the session stays stopped.
    pub fn start(&mut self, device: &str, endpoint: EndpointFilter) -> Result<(), CaptureError> {
        if self.state() == SessionState::Running {
            tracing::debug!("Capture already running, ignoring start on {}", device);
            return Ok(());
        }
        self.stop()?;

        let filter = endpoint.filter_expression();
        let receiver = self.backend.open(device, &filter)?;

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let pipeline = Arc::clone(&self.pipeline);

        let spawned = thread::Builder::new()
            .name("opscope-capture".to_string())
            .spawn(move || capture_loop(receiver, endpoint, running, pipeline));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::Release);
                return Err(CaptureError::Spawn(e));
            }
        };

        self.worker = Some(handle);
        self.endpoint = Some(endpoint);

        tracing::info!("Capture started on {} for server {}", device, endpoint);
        self.sink.on_start(device);
        Ok(())
    }

    /// Stop capturing and close the device.
    ///
    /// A no-op if no capture thread was started. Waits for a frame that is
    /// being dispatched to finish; no events are raised afterwards. Also
    /// joins a thread whose source closed.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        self.running.store(false, Ordering::Release);

        // Fence off a frame that was in flight when the flag was cleared
        drop(lock(&self.pipeline));

        // The thread notices the flag within one read timeout
        if handle.join().is_err() {
            tracing::warn!("Capture thread panicked");
        }

        tracing::info!("Capture stopped ({})", self.stats());
        self.sink.on_stop();
        Ok(())
    }

    /// Whether the capture thread has exited on its own, e.g. because a
    /// replayed file was exhausted. Stays true until `stop()` or `start()`
    /// joins the thread.
    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false)
    }

    /// Point-in-time copy of one direction's opcode table.
    pub fn snapshot(&self, direction: Direction) -> Vec<OpcodeRecord> {
        lock(&self.pipeline).snapshot(direction)
    }

    pub fn stats(&self) -> Stats {
        lock(&self.pipeline).stats()
    }

    /// Clear both opcode tables and the counters.
    pub fn reset(&self) {
        lock(&self.pipeline).reset();
        tracing::info!("Captured data reset");
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// A panicking sink poisons the lock; the tables themselves stay consistent.
fn lock(pipeline: &Mutex<Pipeline>) -> MutexGuard<'_, Pipeline> {
    pipeline.lock().unwrap_or_else(PoisonError::into_inner)
}

fn capture_loop(
    mut receiver: Box<dyn FrameReceiver>,
    endpoint: EndpointFilter,
    running: Arc<AtomicBool>,
    pipeline: Arc<Mutex<Pipeline>>,
) {
    while running.load(Ordering::Acquire) {
        match receiver.next_frame() {
            FrameRead::Frame(frame) => {
                let mut pipeline = lock(&pipeline);
                // stop() may have cleared the flag while we were reading
                if !running.load(Ordering::Acquire) {
                    break;
                }
                pipeline.process_frame(frame, &endpoint);
            }
            FrameRead::Timeout => continue,
            FrameRead::Closed => {
                tracing::info!("Capture source closed");
                break;
            }
        }
    }

    tracing::debug!("Capture thread exiting");
}
