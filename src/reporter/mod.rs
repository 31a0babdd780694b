//! Reporting module for engine events.
//!
//! This module defines the `EventSink` trait (ISP, DIP) and provides
//! implementations for different consumers.

mod console_reporter;

pub use console_reporter::{render_summary, ConsoleReporter};

use std::sync::mpsc::Sender;

use crate::domain::EngineEvent;

/// Trait for consuming engine events (Interface Segregation Principle).
///
/// Events are published from the capture thread. Implementations must not
/// call back into the session that publishes to them.
pub trait EventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: &EngineEvent);

    /// Called when a capture session starts.
    fn on_start(&self, _device: &str) {}

    /// Called when a capture session stops.
    fn on_stop(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &EngineEvent) {}
}

/// Hands events to another thread. A disconnected receiver is ignored.
impl EventSink for Sender<EngineEvent> {
    fn publish(&self, event: &EngineEvent) {
        let _ = self.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stats;
    use std::sync::mpsc;

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let stats = Stats {
            frames_processed: 1,
            unique_opcodes: 1,
            variable_opcodes: 0,
        };

        tx.publish(&EngineEvent::StatsChanged(stats));

        assert_eq!(rx.try_recv().unwrap(), EngineEvent::StatsChanged(stats));
    }

    #[test]
    fn test_channel_sink_ignores_disconnected_receiver() {
        let (tx, rx) = mpsc::channel::<EngineEvent>();
        drop(rx);

        tx.publish(&EngineEvent::StatsChanged(Stats::default()));
    }
}
