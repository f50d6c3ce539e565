use super::{DeviceRole, PoseSource, TrackingUniverse, HMD_DEVICE_INDEX, MAX_TRACKED_DEVICE_COUNT};
use crate::error::BridgeResult;
use crate::pose::{pose_to_matrix34, Pose, PoseSample};
use nalgebra::UnitQuaternion;

const LEFT_HAND_INDEX: usize = 1;
const RIGHT_HAND_INDEX: usize = 2;

/// Standing eye height in meters
const HEAD_HEIGHT: f64 = 1.6;
/// Controllers hang this far below the head
const HAND_DROP: f64 = 0.5;
const HAND_RADIUS: f64 = 0.35;

/// How a simulated controller shows up in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerMode {
    /// Assigned a slot and reporting valid poses
    #[default]
    Tracked,
    /// Assigned a slot but the pose is flagged invalid (lost tracking)
    Invalid,
    /// No device holds the role
    Absent,
}

/// Synthetic headset and controllers
///
/// Motion is a pure function of the query count so runs are reproducible:
/// the head bobs and turns slowly, the hands orbit around it.
pub struct SimulatedSource {
    tick: u64,
    step: f64,
    headset_valid: bool,
    left: ControllerMode,
    right: ControllerMode,
    active: bool,
}

impl SimulatedSource {
    /// Headset plus two tracked controllers
    pub fn new() -> Self {
        Self {
            tick: 0,
            step: 0.01,
            headset_valid: true,
            left: ControllerMode::Tracked,
            right: ControllerMode::Tracked,
            active: true,
        }
    }

    pub fn with_controllers(mut self, left: ControllerMode, right: ControllerMode) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    pub fn with_headset_valid(mut self, valid: bool) -> Self {
        self.headset_valid = valid;
        self
    }

    /// Phase advance per query, in radians
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Number of queries answered so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn head_pose(phase: f64) -> Pose {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.3 * phase.sin(), 0.0).into_inner();
        Pose::new(
            [0.0, HEAD_HEIGHT + 0.02 * (2.0 * phase).sin(), 0.0],
            [q.coords.x, q.coords.y, q.coords.z, q.coords.w],
        )
    }

    fn hand_pose(phase: f64, side: f64) -> Pose {
        let angle = phase + side * std::f64::consts::FRAC_PI_2;
        let q = UnitQuaternion::from_euler_angles(0.2 * side, angle, 0.0).into_inner();
        Pose::new(
            [
                HAND_RADIUS * angle.cos(),
                HEAD_HEIGHT - HAND_DROP,
                HAND_RADIUS * angle.sin(),
            ],
            [q.coords.x, q.coords.y, q.coords.z, q.coords.w],
        )
    }

    fn controller_sample(mode: ControllerMode, pose: Pose) -> PoseSample {
        PoseSample::new(pose_to_matrix34(&pose), mode == ControllerMode::Tracked)
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseSource for SimulatedSource {
    fn poses(&mut self, _universe: TrackingUniverse) -> BridgeResult<Vec<PoseSample>> {
        let phase = self.tick as f64 * self.step;
        self.tick += 1;

        let mut poses = vec![PoseSample::invalid(); MAX_TRACKED_DEVICE_COUNT];
        poses[HMD_DEVICE_INDEX] =
            PoseSample::new(pose_to_matrix34(&Self::head_pose(phase)), self.headset_valid);
        poses[LEFT_HAND_INDEX] = Self::controller_sample(self.left, Self::hand_pose(phase, 1.0));
        poses[RIGHT_HAND_INDEX] = Self::controller_sample(self.right, Self::hand_pose(phase, -1.0));

        Ok(poses)
    }

    fn device_index_for_role(&self, role: DeviceRole) -> Option<usize> {
        let (mode, index) = match role {
            DeviceRole::Head => return Some(HMD_DEVICE_INDEX),
            DeviceRole::LeftHand => (self.left, LEFT_HAND_INDEX),
            DeviceRole::RightHand => (self.right, RIGHT_HAND_INDEX),
        };
        (mode != ControllerMode::Absent).then_some(index)
    }

    fn shutdown(&mut self) {
        if self.active {
            tracing::debug!("Simulated tracking session released after {} queries", self.tick);
            self.active = false;
        }
    }

    fn name(&self) -> &'static str {
        "simulation"
    }
}
