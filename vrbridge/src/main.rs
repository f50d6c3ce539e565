/// VRBRIDGE
///
/// Polls the VR runtime for headset and controller poses and publishes them
/// to a rosbridge websocket (or, with `--format unity`, as combined UDP
/// frames for the Unity receiver). Runs until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use vrbridge_core::{BridgeConfig, BridgeResult, BridgeStats, PoseBackend, WireFormat};

/// Grace period before a stuck loop is force-terminated after Ctrl+C
const FORCE_EXIT_AFTER: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "vrbridge")]
#[command(about = "Publish VR headset and controller poses to rosbridge", long_about = None)]
struct Args {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rosbridge websocket URL [default: ws://localhost:9090]
    #[arg(short, long)]
    url: Option<String>,

    /// Pose backend: openvr or simulation [default: openvr]
    #[arg(short, long)]
    backend: Option<PoseBackend>,

    /// Wire format: rosbridge or unity [default: rosbridge]
    #[arg(short, long)]
    format: Option<WireFormat>,

    /// UDP target for the unity format [default: 127.0.0.1:8080]
    #[arg(long)]
    udp_target: Option<String>,

    /// Milliseconds between pose queries [default: 10]
    #[arg(short, long)]
    period_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Defaults, then the config file, then command line flags
    fn resolve_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BridgeConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(target) = &self.udp_target {
            config.udp_target = target.clone();
        }
        if let Some(period_ms) = self.period_ms {
            config.period_ms = period_ms;
        }
        Ok(config)
    }
}

/// Combine the loop outcome with the cleanup outcome
///
/// A loop error is what the caller sees; a cleanup failure is only logged.
fn finish(
    result: BridgeResult<BridgeStats>,
    cleanup: BridgeResult<()>,
) -> anyhow::Result<BridgeStats> {
    if let Err(e) = &result {
        error!("Bridge loop failed: {}", e);
    }
    if let Err(e) = cleanup {
        warn!("Cleanup failed: {}", e);
    }
    result.context("running bridge")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        "vrbridge=debug,vrbridge_core=debug"
    } else {
        "vrbridge=info,vrbridge_core=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = args.resolve_config()?;
    info!(
        "Backend: {}, format: {}, endpoint: {}",
        config.backend,
        config.format,
        config.endpoint()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Shutting down...");
        r.store(false, Ordering::SeqCst);
        std::thread::spawn(|| {
            std::thread::sleep(FORCE_EXIT_AFTER);
            warn!("Loop did not stop in time, force terminating");
            std::process::exit(0);
        });
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    let mut bridge = vrbridge_core::open(&config).context("starting bridge")?;

    let result = bridge.run(&running);
    let stats = finish(result, bridge.shutdown())?;
    info!("Published {} messages over {} ticks", stats.messages, stats.ticks);
    Ok(())
}
