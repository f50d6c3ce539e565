//! The polling loop
//!
//! Each tick is strictly sequential: stamp, one pose query, conversion,
//! encoding, then one blocking send per message. Nothing is queued or
//! retried, and no pose outlives its tick.

use crate::device::{open_source, sample_for, PoseSource, TrackingUniverse};
use crate::error::BridgeResult;
use crate::messages::{TrackedDevice, TrackedFrame};
use crate::params::{BridgeConfig, DEFAULT_PERIOD_MS};
use crate::publisher::{encode_frame, WireFormat};
use crate::stamp::Stamp;
use crate::transport::{MessageTransport, UdpTransport, WebSocketTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Messages handed to the transport
    pub sent: usize,
    /// Devices without a valid pose this tick
    pub skipped: usize,
}

/// Running totals, used for periodic debug output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeStats {
    pub ticks: u64,
    pub messages: u64,
    pub skipped: u64,
}

impl BridgeStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.messages += report.sent as u64;
        self.skipped += report.skipped as u64;
    }
}

/// Polls a pose source and publishes every valid device pose
pub struct PoseBridge<S: PoseSource, T: MessageTransport> {
    source: S,
    transport: T,
    format: WireFormat,
    universe: TrackingUniverse,
    period: Duration,
    stats: BridgeStats,
    shut_down: bool,
}

impl<S: PoseSource, T: MessageTransport> PoseBridge<S, T> {
    pub fn new(source: S, transport: T, format: WireFormat) -> Self {
        Self {
            source,
            transport,
            format,
            universe: TrackingUniverse::Standing,
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
            stats: BridgeStats::default(),
            shut_down: false,
        }
    }

    /// Sleep between ticks
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query the source once and build this tick's frame
    pub fn capture(&mut self) -> BridgeResult<TrackedFrame> {
        let stamp = Stamp::now();
        let poses = self.source.poses(self.universe)?;

        let mut frame = TrackedFrame::new(stamp);
        for device in TrackedDevice::ALL {
            let pose = sample_for(&self.source, &poses, device).and_then(|s| s.to_pose());
            frame.set(device, pose);
        }
        Ok(frame)
    }

    /// One full iteration: capture, encode, send
    pub fn tick(&mut self) -> BridgeResult<TickReport> {
        let frame = self.capture()?;
        let messages = encode_frame(&frame, self.format)?;

        for message in &messages {
            trace!("-> {}", message);
            self.transport.send_text(message)?;
        }

        let report = TickReport {
            sent: messages.len(),
            skipped: TrackedDevice::ALL.len() - frame.valid_count(),
        };
        self.stats.record(&report);
        Ok(report)
    }

    /// Tick until `running` is cleared or an error occurs
    ///
    /// The flag is checked between ticks, so an interrupt takes effect
    /// after at most one tick plus one period.
    pub fn run(&mut self, running: &AtomicBool) -> BridgeResult<BridgeStats> {
        info!(
            "Publishing {} poses from {} to {} every {:?}",
            self.format,
            self.source.name(),
            self.transport.describe(),
            self.period
        );

        // Roughly one debug line per second of polling
        let log_every = (1000 / self.period.as_millis().max(1)).max(1) as u64;

        while running.load(Ordering::SeqCst) {
            self.tick()?;

            if self.stats.ticks % log_every == 0 {
                debug!(
                    "ticks={} messages={} skipped={}",
                    self.stats.ticks, self.stats.messages, self.stats.skipped
                );
            }

            std::thread::sleep(self.period);
        }

        Ok(self.stats)
    }

    /// Close the transport and release the tracking session
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn shutdown(&mut self) -> BridgeResult<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let closed = self.transport.close();
        self.source.shutdown();
        info!(
            "Bridge stopped after {} ticks ({} messages sent)",
            self.stats.ticks, self.stats.messages
        );
        closed
    }
}

/// Bridge over boxed backends chosen at runtime
pub type DynPoseBridge = PoseBridge<Box<dyn PoseSource>, Box<dyn MessageTransport>>;

/// Open the transport the configured format sends over
pub fn open_transport(config: &BridgeConfig) -> BridgeResult<Box<dyn MessageTransport>> {
    Ok(match config.format {
        WireFormat::Rosbridge => Box::new(WebSocketTransport::connect(&config.url)?),
        WireFormat::Unity => Box::new(UdpTransport::connect(&config.udp_target)?),
    })
}

/// Start the tracking session, then connect the transport
pub fn open(config: &BridgeConfig) -> BridgeResult<DynPoseBridge> {
    let source = open_source(config.backend)?;
    info!("Tracking backend '{}' ready", source.name());

    let transport = open_transport(config)?;
    Ok(PoseBridge::new(source, transport, config.format).with_period(config.period()))
}

impl<S: PoseSource, T: MessageTransport> Drop for PoseBridge<S, T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("Cleanup failed: {}", e);
        }
    }
}
