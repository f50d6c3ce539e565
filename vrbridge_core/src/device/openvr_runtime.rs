use super::{DeviceRole, PoseSource, TrackingUniverse, HMD_DEVICE_INDEX};
use crate::error::{BridgeError, BridgeResult};
use crate::pose::PoseSample;
use openvr::{ApplicationType, Context, System, TrackedControllerRole, TrackingUniverseOrigin};

/// OpenVR / SteamVR runtime session
///
/// Initialised as a background ("Other") application so no compositor or
/// scene rendering is required.
pub struct OpenVrSource {
    // `system` borrows runtime state owned by `context`; both are dropped together
    system: Option<System>,
    context: Option<Context>,
}

impl OpenVrSource {
    /// Connect to the running VR runtime
    pub fn init() -> BridgeResult<Self> {
        // SAFETY: one session per process; it is released in `shutdown` or on drop.
        let context = unsafe { openvr::init(ApplicationType::Other) }
            .map_err(|e| BridgeError::Tracking(format!("OpenVR init failed: {}", e)))?;
        let system = context
            .system()
            .map_err(|e| BridgeError::Tracking(format!("OpenVR system unavailable: {}", e)))?;

        tracing::info!("OpenVR session initialised");
        Ok(Self {
            system: Some(system),
            context: Some(context),
        })
    }

    fn system(&self) -> BridgeResult<&System> {
        self.system
            .as_ref()
            .ok_or_else(|| BridgeError::Tracking("OpenVR session already shut down".to_string()))
    }
}

fn origin(universe: TrackingUniverse) -> TrackingUniverseOrigin {
    match universe {
        TrackingUniverse::Seated => TrackingUniverseOrigin::Seated,
        TrackingUniverse::Standing => TrackingUniverseOrigin::Standing,
        TrackingUniverse::RawAndUncalibrated => TrackingUniverseOrigin::RawAndUncalibrated,
    }
}

impl PoseSource for OpenVrSource {
    fn poses(&mut self, universe: TrackingUniverse) -> BridgeResult<Vec<PoseSample>> {
        let poses = self
            .system()?
            .device_to_absolute_tracking_pose(origin(universe), 0.0);

        Ok(poses
            .iter()
            .map(|pose| PoseSample::new(*pose.device_to_absolute_tracking(), pose.pose_is_valid()))
            .collect())
    }

    fn device_index_for_role(&self, role: DeviceRole) -> Option<usize> {
        let role = match role {
            DeviceRole::Head => return Some(HMD_DEVICE_INDEX),
            DeviceRole::LeftHand => TrackedControllerRole::LeftHand,
            DeviceRole::RightHand => TrackedControllerRole::RightHand,
        };
        self.system
            .as_ref()?
            .tracked_device_index_for_controller_role(role)
            .map(|index| index as usize)
    }

    fn shutdown(&mut self) {
        self.system = None;
        if let Some(context) = self.context.take() {
            // SAFETY: `system` was dropped above, nothing else borrows the session.
            unsafe { context.shutdown() };
            tracing::info!("OpenVR session released");
        }
    }

    fn name(&self) -> &'static str {
        "openvr"
    }
}

impl Drop for OpenVrSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}
