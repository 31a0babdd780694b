//! pnet-based live packet capture implementation.

use std::io::ErrorKind;
use std::time::Duration;

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, NetworkInterface};

use super::{CaptureBackend, CaptureFilter, FrameRead, FrameReceiver, READ_TIMEOUT_MS};
use crate::error::CaptureError;

/// Consecutive read errors after which the device is considered gone.
const MAX_CONSECUTIVE_ERRORS: u32 = 50;

/// Live capture using the pnet datalink layer.
///
/// pnet has no kernel-side filter, so the filter expression is evaluated
/// in userspace on every frame.
#[derive(Debug, Default)]
pub struct PnetCapture;

impl PnetCapture {
    pub fn new() -> Self {
        Self
    }

    /// Find the first suitable interface.
    ///
    /// Looks for an interface that is up and not a loopback.
    pub fn default_interface() -> Option<String> {
        datalink::interfaces()
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
            .map(|iface| iface.name)
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "{}: {} [{}]",
                    iface.name,
                    status,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }

    fn find_interface(name: &str) -> Result<NetworkInterface, CaptureError> {
        datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(name.to_string()))
    }
}

impl CaptureBackend for PnetCapture {
    fn open(
        &mut self,
        device: &str,
        filter: &str,
    ) -> Result<Box<dyn FrameReceiver>, CaptureError> {
        let filter = CaptureFilter::parse(filter)?;
        let interface = Self::find_interface(device)?;

        let config = Config {
            read_timeout: Some(Duration::from_millis(READ_TIMEOUT_MS)),
            promiscuous: true,
            ..Config::default()
        };

        let rx = match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => rx,
            Ok(_) => {
                return Err(CaptureError::DeviceOpen {
                    device: device.to_string(),
                    reason: "unsupported channel type".to_string(),
                })
            }
            Err(e) => {
                if e.kind() == ErrorKind::PermissionDenied {
                    return Err(CaptureError::InsufficientPermissions);
                }
                let msg = e.to_string();
                if msg.contains("permission") || msg.contains("Operation not permitted") {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::DeviceOpen {
                    device: device.to_string(),
                    reason: msg,
                });
            }
        };

        tracing::info!("Opened {} with filter '{}'", interface.name, filter);

        Ok(Box::new(PnetReceiver {
            rx,
            filter,
            consecutive_errors: 0,
        }))
    }
}

/// Receiver that yields filtered frames from the network.
struct PnetReceiver {
    rx: Box<dyn DataLinkReceiver>,
    filter: CaptureFilter,
    consecutive_errors: u32,
}

impl FrameReceiver for PnetReceiver {
    fn next_frame(&mut self) -> FrameRead<'_> {
        match self.rx.next() {
            Ok(frame) => {
                self.consecutive_errors = 0;
                if self.filter.matches(frame) {
                    FrameRead::Frame(frame)
                } else {
                    FrameRead::Timeout
                }
            }
            // Timeout is expected, continue
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                FrameRead::Timeout
            }
            Err(e) => {
                self.consecutive_errors += 1;
                if self.consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    tracing::warn!("Giving up on capture device after repeated errors: {}", e);
                    return FrameRead::Closed;
                }
                tracing::debug!("Capture error: {}", e);
                FrameRead::Timeout
            }
        }
    }
}
