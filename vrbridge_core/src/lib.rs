//! # VRBRIDGE Core
//!
//! Streams VR headset and controller poses to a robotics message bridge.
//!
//! Every tick the bridge:
//!
//! - captures one wall-clock stamp
//! - queries the tracking runtime for all device slots (standing universe)
//! - converts each valid 3x4 transform to position + unit quaternion
//! - publishes one rosbridge `PoseStamped` per device, all sharing the stamp
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//! use vrbridge_core::{PoseBridge, SimulatedSource, WebSocketTransport, WireFormat};
//!
//! let transport = WebSocketTransport::connect("ws://localhost:9090")?;
//! let mut bridge = PoseBridge::new(SimulatedSource::new(), transport, WireFormat::Rosbridge);
//! let running = AtomicBool::new(true);
//! bridge.run(&running)?;
//! # Ok::<(), vrbridge_core::BridgeError>(())
//! ```

pub mod bridge;
pub mod device;
pub mod error;
pub mod messages;
pub mod params;
pub mod pose;
pub mod publisher;
pub mod stamp;
pub mod transport;

// Re-export commonly used types for easy access
pub use bridge::{open, BridgeStats, DynPoseBridge, PoseBridge, TickReport};
pub use device::{
    ControllerMode, DeviceRole, PoseBackend, PoseSource, SimulatedSource, TrackingUniverse,
};
pub use error::{BridgeError, BridgeResult};
pub use messages::{TrackedDevice, TrackedFrame};
pub use params::BridgeConfig;
pub use pose::{matrix34_to_pose, pose_to_matrix34, Matrix34, Pose, PoseSample};
pub use publisher::WireFormat;
pub use stamp::Stamp;
pub use transport::{MessageTransport, UdpTransport, WebSocketTransport};

#[cfg(feature = "openvr")]
pub use device::OpenVrSource;
