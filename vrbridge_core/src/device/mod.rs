//! Tracked device pose sources
//!
//! A [`PoseSource`] answers one blocking query per tick with every device
//! slot the runtime knows about, plus a lookup from controller role to slot.
//! The bridge never keeps samples across ticks.
//!
//! Backends:
//! - [`SimulatedSource`]: synthetic headset and controllers for testing
//!   without hardware
//! - `OpenVrSource` (feature `openvr`): SteamVR / OpenVR runtime

mod simulation;

#[cfg(feature = "openvr")]
mod openvr_runtime;

pub use simulation::{ControllerMode, SimulatedSource};

#[cfg(feature = "openvr")]
pub use openvr_runtime::OpenVrSource;

use crate::error::BridgeResult;
use crate::messages::TrackedDevice;
use crate::pose::PoseSample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slot the runtime always assigns to the head-mounted display
pub const HMD_DEVICE_INDEX: usize = 0;

/// Number of device slots a runtime query returns
pub const MAX_TRACKED_DEVICE_COUNT: usize = 64;

/// Logical role of a tracked device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Head,
    LeftHand,
    RightHand,
}

impl From<TrackedDevice> for DeviceRole {
    fn from(device: TrackedDevice) -> Self {
        match device {
            TrackedDevice::Headset => DeviceRole::Head,
            TrackedDevice::LeftController => DeviceRole::LeftHand,
            TrackedDevice::RightController => DeviceRole::RightHand,
        }
    }
}

/// Reference frame convention poses are reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingUniverse {
    Seated,
    #[default]
    Standing,
    RawAndUncalibrated,
}

/// Source of per-tick device poses
pub trait PoseSource {
    /// Query every device slot once (blocking)
    fn poses(&mut self, universe: TrackingUniverse) -> BridgeResult<Vec<PoseSample>>;

    /// Slot currently holding the device with `role`, `None` if no device has it
    fn device_index_for_role(&self, role: DeviceRole) -> Option<usize>;

    /// Release the tracking session. Calling it again is a no-op.
    fn shutdown(&mut self);

    /// Short human readable name for logs
    fn name(&self) -> &'static str;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn poses(&mut self, universe: TrackingUniverse) -> BridgeResult<Vec<PoseSample>> {
        (**self).poses(universe)
    }

    fn device_index_for_role(&self, role: DeviceRole) -> Option<usize> {
        (**self).device_index_for_role(role)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Resolve the sample for `device`, if it exists and is valid this frame
///
/// The headset is always read from [`HMD_DEVICE_INDEX`]; controllers go
/// through the role lookup. Out-of-range slots count as missing.
pub fn sample_for<'a, S: PoseSource + ?Sized>(
    source: &S,
    poses: &'a [PoseSample],
    device: TrackedDevice,
) -> Option<&'a PoseSample> {
    let index = match device {
        TrackedDevice::Headset => Some(HMD_DEVICE_INDEX),
        other => source.device_index_for_role(other.into()),
    }?;

    poses.get(index).filter(|sample| sample.valid)
}

/// Pose backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseBackend {
    /// OpenVR / SteamVR runtime (requires the `openvr` feature)
    #[default]
    OpenVr,
    /// Synthetic poses, no hardware needed
    Simulation,
}

impl fmt::Display for PoseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseBackend::OpenVr => write!(f, "openvr"),
            PoseBackend::Simulation => write!(f, "simulation"),
        }
    }
}

impl FromStr for PoseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openvr" | "steamvr" => Ok(PoseBackend::OpenVr),
            "simulation" | "sim" | "mock" => Ok(PoseBackend::Simulation),
            other => Err(format!("unknown pose backend '{}'", other)),
        }
    }
}

/// Open the source for `backend`
pub fn open_source(backend: PoseBackend) -> BridgeResult<Box<dyn PoseSource>> {
    match backend {
        PoseBackend::Simulation => Ok(Box::new(SimulatedSource::new())),
        #[cfg(feature = "openvr")]
        PoseBackend::OpenVr => Ok(Box::new(OpenVrSource::init()?)),
        #[cfg(not(feature = "openvr"))]
        PoseBackend::OpenVr => Err(crate::error::BridgeError::Tracking(
            "built without OpenVR support; rebuild with `--features openvr` \
             or use the simulation backend"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::IDENTITY_MATRIX34;

    struct FixedSource {
        left: Option<usize>,
        right: Option<usize>,
    }

    impl PoseSource for FixedSource {
        fn poses(&mut self, _universe: TrackingUniverse) -> BridgeResult<Vec<PoseSample>> {
            Ok(Vec::new())
        }

        fn device_index_for_role(&self, role: DeviceRole) -> Option<usize> {
            match role {
                DeviceRole::Head => Some(HMD_DEVICE_INDEX),
                DeviceRole::LeftHand => self.left,
                DeviceRole::RightHand => self.right,
            }
        }

        fn shutdown(&mut self) {}

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_sample_for_uses_role_lookup() {
        let source = FixedSource {
            left: Some(2),
            right: None,
        };
        let poses = vec![
            PoseSample::new(IDENTITY_MATRIX34, true),
            PoseSample::invalid(),
            PoseSample::new(IDENTITY_MATRIX34, true),
        ];

        assert!(sample_for(&source, &poses, TrackedDevice::Headset).is_some());
        assert!(sample_for(&source, &poses, TrackedDevice::LeftController).is_some());
        assert!(sample_for(&source, &poses, TrackedDevice::RightController).is_none());
    }

    #[test]
    fn test_sample_for_rejects_invalid_and_out_of_range() {
        let source = FixedSource {
            left: Some(1),
            right: Some(99),
        };
        let poses = vec![PoseSample::invalid(), PoseSample::invalid()];

        assert!(sample_for(&source, &poses, TrackedDevice::Headset).is_none());
        assert!(sample_for(&source, &poses, TrackedDevice::LeftController).is_none());
        assert!(sample_for(&source, &poses, TrackedDevice::RightController).is_none());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("openvr".parse::<PoseBackend>(), Ok(PoseBackend::OpenVr));
        assert_eq!("Simulation".parse::<PoseBackend>(), Ok(PoseBackend::Simulation));
        assert!("oculus-sdk".parse::<PoseBackend>().is_err());
    }

    #[cfg(not(feature = "openvr"))]
    #[test]
    fn test_openvr_backend_unavailable_without_feature() {
        assert!(open_source(PoseBackend::OpenVr).is_err());
    }
}
