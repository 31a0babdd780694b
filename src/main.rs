//! opscope - capture a game server's traffic and classify its opcodes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use opscope::config::Overrides;
use opscope::reporter::render_summary;
use opscope::{
    CaptureBackend, CaptureSession, Config, ConsoleReporter, Direction, PcapReplay, PnetCapture,
};

#[derive(Parser)]
#[command(name = "opscope")]
#[command(about = "Capture game-server traffic and classify protocol opcodes")]
struct Args {
    /// Config file (default: $OPSCOPE_CONFIG or /etc/opscope.conf)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network interface to capture on (e.g., eth0)
    #[arg(short, long)]
    interface: Option<String>,

    /// Game server IPv4 address
    #[arg(short, long)]
    server: Option<String>,

    /// Game server TCP port
    #[arg(short, long)]
    port: Option<String>,

    /// Replay frames from a pcap file instead of a live interface
    #[arg(short, long, conflicts_with = "interface")]
    replay: Option<PathBuf>,

    /// List available network interfaces and exit
    #[arg(short, long)]
    list_interfaces: bool,

    /// Show payload bytes and debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_interfaces {
        println!("Available network interfaces:");
        for iface in PnetCapture::list_interfaces() {
            println!("  {}", iface);
        }
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply(Overrides {
            server_address: args.server.clone(),
            server_port: args.port.clone(),
            device: args.interface.clone(),
            log_level: args.verbose.then(|| "debug".to_string()),
        })
        .context("Invalid command-line setting")?;

    init_logging(&config.log_level);

    let endpoint = config.endpoint().context("No game server configured")?;

    let (backend, device): (Box<dyn CaptureBackend>, String) = match &args.replay {
        Some(path) => (
            Box::new(PcapReplay::new()) as Box<dyn CaptureBackend>,
            path.display().to_string(),
        ),
        None => {
            let device = match config.device.clone() {
                Some(device) => device,
                None => PnetCapture::default_interface()
                    .context("No suitable network interface found")?,
            };
            (Box::new(PnetCapture::new()) as Box<dyn CaptureBackend>, device)
        }
    };

    let reporter = Arc::new(ConsoleReporter::new().with_verbose(args.verbose));
    let mut session = CaptureSession::new(backend, reporter);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl+C handler")?;

    session
        .start(&device, endpoint)
        .with_context(|| format!("Failed to start capture on {}", device))?;

    while !interrupted.load(Ordering::SeqCst) && !session.is_finished() {
        thread::sleep(Duration::from_millis(100));
    }

    session.stop().context("Failed to stop capture")?;

    println!();
    for direction in Direction::ALL {
        print!("{}", render_summary(direction, &session.snapshot(direction)));
        println!();
    }
    println!("{}", session.stats());

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
