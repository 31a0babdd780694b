//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use opscope::testing::frames;
use opscope::{
    CaptureBackend, CaptureError, EndpointFilter, EngineEvent, EventSink, FrameRead, FrameReceiver,
};

pub fn endpoint() -> EndpointFilter {
    EndpointFilter::new(Ipv4Addr::new(203, 0, 113, 7), 7171).unwrap()
}

pub fn client() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 10), 50123)
}

pub fn payload(opcode: u16, len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    payload[..2].copy_from_slice(&opcode.to_le_bytes());
    payload
}

/// Server to client.
pub fn inbound(opcode: u16, len: usize) -> Vec<u8> {
    frames::tcp(endpoint().socket_addr(), client(), &payload(opcode, len))
}

/// Client to server.
pub fn outbound(opcode: u16, len: usize) -> Vec<u8> {
    frames::tcp(client(), endpoint().socket_addr(), &payload(opcode, len))
}

/// Frames queued by the test and handed out by the scripted receiver.
#[derive(Clone, Default)]
pub struct FrameQueue {
    frames: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl FrameQueue {
    pub fn push(&self, frame: Vec<u8>) {
        self.frames.lock().unwrap().push_back(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().unwrap().is_empty()
    }
}

/// Outcome the scripted backend gives for `open`.
#[derive(Clone, Copy)]
pub enum OpenBehavior {
    Succeed,
    DeviceFails,
    FilterFails,
}

/// Backend whose receiver replays a shared queue.
pub struct ScriptedBackend {
    queue: FrameQueue,
    behavior: OpenBehavior,
    close_when_drained: bool,
    pub opens: Arc<AtomicUsize>,
    pub filters: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new(queue: FrameQueue) -> Self {
        Self {
            queue,
            behavior: OpenBehavior::Succeed,
            close_when_drained: false,
            opens: Arc::new(AtomicUsize::new(0)),
            filters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(behavior: OpenBehavior) -> Self {
        Self {
            behavior,
            ..Self::new(FrameQueue::default())
        }
    }

    /// Receivers report `Closed` once the queue is empty, like an exhausted replay file.
    pub fn closing_when_drained(queue: FrameQueue) -> Self {
        Self {
            close_when_drained: true,
            ..Self::new(queue)
        }
    }
}

impl CaptureBackend for ScriptedBackend {
    fn open(
        &mut self,
        device: &str,
        filter: &str,
    ) -> Result<Box<dyn FrameReceiver>, CaptureError> {
        match self.behavior {
            OpenBehavior::Succeed => {}
            OpenBehavior::DeviceFails => {
                return Err(CaptureError::DeviceOpen {
                    device: device.to_string(),
                    reason: "no capture driver".to_string(),
                })
            }
            OpenBehavior::FilterFails => {
                return Err(CaptureError::Filter(format!("rejected '{filter}'")))
            }
        }

        self.opens.fetch_add(1, Ordering::SeqCst);
        self.filters.lock().unwrap().push(filter.to_string());

        Ok(Box::new(ScriptedReceiver {
            queue: self.queue.clone(),
            current: Vec::new(),
            close_when_drained: self.close_when_drained,
        }))
    }
}

struct ScriptedReceiver {
    queue: FrameQueue,
    current: Vec<u8>,
    close_when_drained: bool,
}

impl FrameReceiver for ScriptedReceiver {
    fn next_frame(&mut self) -> FrameRead<'_> {
        let next = self.queue.frames.lock().unwrap().pop_front();
        match next {
            Some(frame) => {
                self.current = frame;
                FrameRead::Frame(&self.current)
            }
            None if self.close_when_drained => FrameRead::Closed,
            None => {
                thread::sleep(Duration::from_millis(2));
                FrameRead::Timeout
            }
        }
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<EngineEvent>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl Recorder {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for Recorder {
    fn publish(&self, event: &EngineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_start(&self, _device: &str) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink whose `publish` blocks for `delay`, to hold a frame in flight.
pub struct SlowSink {
    delay: Duration,
    pub entered: AtomicBool,
    pub calls: AtomicUsize,
    pub active: AtomicUsize,
}

impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            entered: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        }
    }
}

impl EventSink for SlowSink {
    fn publish(&self, _event: &EngineEvent) {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.entered.store(true, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Poll `condition` until it holds or five seconds pass.
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
