//! Bridge configuration
//!
//! Defaults reproduce the fixed setup: OpenVR in the standing universe,
//! rosbridge at `ws://localhost:9090`, one query every 10 ms. An optional
//! YAML file can override any field; the command line overrides the file.
//! Values are taken as given.

use crate::device::PoseBackend;
use crate::error::{BridgeError, BridgeResult};
use crate::publisher::WireFormat;
use crate::transport::{DEFAULT_ROSBRIDGE_URL, DEFAULT_UDP_TARGET};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default polling period in milliseconds
pub const DEFAULT_PERIOD_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Rosbridge websocket endpoint (rosbridge format)
    pub url: String,
    /// Where poses come from
    pub backend: PoseBackend,
    /// Outbound message layout
    pub format: WireFormat,
    /// `host:port` of the Unity receiver (unity format)
    pub udp_target: String,
    /// Sleep between ticks
    pub period_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ROSBRIDGE_URL.to_string(),
            backend: PoseBackend::default(),
            format: WireFormat::default(),
            udp_target: DEFAULT_UDP_TARGET.to_string(),
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

impl BridgeConfig {
    /// Load a YAML config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> BridgeResult<Self> {
        // An empty document deserializes to unit, not to a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Endpoint the configured format sends to
    pub fn endpoint(&self) -> &str {
        match self.format {
            WireFormat::Rosbridge => &self.url,
            WireFormat::Unity => &self.udp_target,
        }
    }
}
