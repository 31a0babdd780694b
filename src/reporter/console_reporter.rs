//! Console-based event reporter.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::domain::{Classification, DecodedPacket, Direction, EngineEvent, OpcodeRecord};
use crate::reporter::EventSink;

/// Bytes of payload shown in verbose mode.
const HEX_PREVIEW_LEN: usize = 32;

/// Reports engine events to the console.
///
/// Formats packets in a human-readable format suitable for
/// terminal output. Stats changes go to the debug log only.
pub struct ConsoleReporter {
    /// Whether to show a hex preview of each payload
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable or disable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn format_packet(&self, packet: &DecodedPacket) -> String {
        let mut output = format!(
            "[{}] opcode: {:#06x} | len: {}",
            packet.direction.tag(),
            packet.opcode,
            packet.payload.len()
        );

        if self.verbose {
            output.push_str(" | ");
            output.push_str(&hex_preview(&packet.payload, HEX_PREVIEW_LEN));
        }

        output
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleReporter {
    fn publish(&self, event: &EngineEvent) {
        match event {
            EngineEvent::PacketObserved(packet) => {
                let output = self.format_packet(packet);
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{}", output);
            }
            EngineEvent::StatsChanged(stats) => {
                tracing::debug!("{}", stats);
            }
        }
    }

    fn on_start(&self, device: &str) {
        println!("Capturing opcodes on: {}", device);
        println!("Press Ctrl+C to stop.\n");
    }

    fn on_stop(&self) {
        println!("\nStopping capture.");
    }
}

/// Space-separated hex of at most `limit` bytes, with an ellipsis if cut.
fn hex_preview(data: &[u8], limit: usize) -> String {
    let mut output = data
        .iter()
        .take(limit)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");

    if data.len() > limit {
        output.push_str(" ..");
    }

    output
}

/// Render an opcode table for one direction.
pub fn render_summary(direction: Direction, records: &[OpcodeRecord]) -> String {
    let mut output = String::new();
    let variable = records
        .iter()
        .filter(|r| r.classification.is_variable())
        .count();

    let _ = writeln!(
        output,
        "{} opcodes: {} ({} fixed, {} variable)",
        direction,
        records.len(),
        records.len() - variable,
        variable
    );
    let _ = writeln!(output, "  {:<8} {:>10} {:<12} lengths", "opcode", "count", "type");

    for record in records {
        let kind = match record.classification {
            Classification::Fixed(_) => "fixed",
            Classification::Variable => "variable",
        };
        let lengths = record
            .observed_lengths
            .iter()
            .map(|len| len.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let _ = writeln!(
            output,
            "  {:<8} {:>10} {:<12} {}",
            format!("{:#06x}", record.opcode),
            record.occurrence_count,
            kind,
            lengths
        );
    }

    output
}
