//! Offline replay of a pcap capture file.

use std::fs::File;
use std::io::BufReader;

use pcap_file::pcap::PcapReader;
use pcap_file::DataLink;

use super::{CaptureBackend, CaptureFilter, FrameRead, FrameReceiver};
use crate::error::CaptureError;

/// Replays frames from a pcap file as fast as they can be read.
///
/// The device identifier passed to `open` is the file path. Only
/// Ethernet link-layer captures are accepted.
#[derive(Debug, Default)]
pub struct PcapReplay;

impl PcapReplay {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureBackend for PcapReplay {
    fn open(
        &mut self,
        device: &str,
        filter: &str,
    ) -> Result<Box<dyn FrameReceiver>, CaptureError> {
        let filter = CaptureFilter::parse(filter)?;

        let file = File::open(device).map_err(|e| CaptureError::DeviceOpen {
            device: device.to_string(),
            reason: e.to_string(),
        })?;

        let reader =
            PcapReader::new(BufReader::new(file)).map_err(|e| CaptureError::DeviceOpen {
                device: device.to_string(),
                reason: e.to_string(),
            })?;

        let datalink = reader.header().datalink;
        if datalink != DataLink::ETHERNET {
            return Err(CaptureError::DeviceOpen {
                device: device.to_string(),
                reason: format!("unsupported link type {:?}", datalink),
            });
        }

        tracing::info!("Replaying {} with filter '{}'", device, filter);

        Ok(Box::new(ReplayReceiver {
            reader,
            filter,
            frame: Vec::new(),
        }))
    }
}

struct ReplayReceiver {
    reader: PcapReader<BufReader<File>>,
    filter: CaptureFilter,
    /// Copy of the current frame; the reader's packet borrows its buffer
    frame: Vec<u8>,
}

impl FrameReceiver for ReplayReceiver {
    fn next_frame(&mut self) -> FrameRead<'_> {
        loop {
            match self.reader.next_packet() {
                Some(Ok(packet)) => {
                    if !self.filter.matches(&packet.data) {
                        continue;
                    }
                    self.frame.clear();
                    self.frame.extend_from_slice(&packet.data);
                    return FrameRead::Frame(&self.frame);
                }
                Some(Err(e)) => {
                    tracing::warn!("Stopping replay on unreadable record: {}", e);
                    return FrameRead::Closed;
                }
                None => return FrameRead::Closed,
            }
        }
    }
}
