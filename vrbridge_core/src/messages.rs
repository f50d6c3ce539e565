//! Wire message types
//!
//! Two outbound formats are supported:
//!
//! - rosbridge `publish` operations carrying a `geometry_msgs/PoseStamped`,
//!   one per tracked device
//! - a single combined frame object per tick, the layout the Unity
//!   `UDPReceiver` script deserializes

use crate::pose::Pose;
use crate::stamp::Stamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic carrying the headset pose
pub const HEADSET_TOPIC: &str = "/oculus/headset_pose";
/// Topic carrying the left controller pose
pub const LEFT_CONTROLLER_TOPIC: &str = "/oculus/left_controller_pose";
/// Topic carrying the right controller pose
pub const RIGHT_CONTROLLER_TOPIC: &str = "/oculus/right_controller_pose";

/// Frame every published pose is expressed in
pub const WORLD_FRAME: &str = "world";

/// Rosbridge operation name for publishing
pub const PUBLISH_OP: &str = "publish";

/// The three devices the bridge publishes, in publish order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedDevice {
    Headset,
    LeftController,
    RightController,
}

impl TrackedDevice {
    pub const ALL: [TrackedDevice; 3] = [
        TrackedDevice::Headset,
        TrackedDevice::LeftController,
        TrackedDevice::RightController,
    ];

    /// Rosbridge topic for this device
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Headset => HEADSET_TOPIC,
            Self::LeftController => LEFT_CONTROLLER_TOPIC,
            Self::RightController => RIGHT_CONTROLLER_TOPIC,
        }
    }

    /// Member name in the combined frame object
    pub fn frame_key(&self) -> &'static str {
        match self {
            Self::Headset => "headset",
            Self::LeftController => "left_controller",
            Self::RightController => "right_controller",
        }
    }
}

impl fmt::Display for TrackedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.frame_key())
    }
}

/// Device poses captured during one tick, sharing one stamp
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedFrame {
    pub stamp: Stamp,
    pub headset: Option<Pose>,
    pub left_controller: Option<Pose>,
    pub right_controller: Option<Pose>,
}

impl TrackedFrame {
    /// Empty frame (no device valid) at the given stamp
    pub fn new(stamp: Stamp) -> Self {
        Self {
            stamp,
            ..Default::default()
        }
    }

    pub fn get(&self, device: TrackedDevice) -> Option<&Pose> {
        match device {
            TrackedDevice::Headset => self.headset.as_ref(),
            TrackedDevice::LeftController => self.left_controller.as_ref(),
            TrackedDevice::RightController => self.right_controller.as_ref(),
        }
    }

    pub fn set(&mut self, device: TrackedDevice, pose: Option<Pose>) {
        match device {
            TrackedDevice::Headset => self.headset = pose,
            TrackedDevice::LeftController => self.left_controller = pose,
            TrackedDevice::RightController => self.right_controller = pose,
        }
    }

    /// Valid device poses in publish order
    pub fn poses(&self) -> impl Iterator<Item = (TrackedDevice, &Pose)> + '_ {
        TrackedDevice::ALL
            .into_iter()
            .filter_map(move |device| self.get(device).map(|pose| (device, pose)))
    }

    pub fn valid_count(&self) -> usize {
        self.poses().count()
    }
}

// ---------------------------------------------------------------------------
// rosbridge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PointMessage {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for PointMessage {
    fn from(p: [f64; 3]) -> Self {
        Self {
            x: p[0],
            y: p[1],
            z: p[2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuaternionMessage {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl From<[f64; 4]> for QuaternionMessage {
    fn from(q: [f64; 4]) -> Self {
        Self {
            x: q[0],
            y: q[1],
            z: q[2],
            w: q[3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseMessage {
    pub position: PointMessage,
    pub orientation: QuaternionMessage,
}

impl From<&Pose> for PoseMessage {
    fn from(pose: &Pose) -> Self {
        Self {
            position: pose.position.into(),
            orientation: pose.orientation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: Stamp,
    pub frame_id: String,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp: Stamp) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: PoseMessage,
}

impl PoseStamped {
    /// Pose in the world frame at the given stamp
    pub fn world(pose: &Pose, stamp: Stamp) -> Self {
        Self {
            header: Header::new(WORLD_FRAME, stamp),
            pose: pose.into(),
        }
    }
}

/// A rosbridge `publish` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOp<M> {
    pub op: String,
    pub topic: String,
    pub msg: M,
}

impl<M> PublishOp<M> {
    pub fn new(topic: impl Into<String>, msg: M) -> Self {
        Self {
            op: PUBLISH_OP.to_string(),
            topic: topic.into(),
            msg,
        }
    }
}

impl PublishOp<PoseStamped> {
    /// Publish operation for one device pose
    pub fn device_pose(device: TrackedDevice, pose: &Pose, stamp: Stamp) -> Self {
        Self::new(device.topic(), PoseStamped::world(pose, stamp))
    }
}

// ---------------------------------------------------------------------------
// Unity frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceData {
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl From<&Pose> for DeviceData {
    fn from(pose: &Pose) -> Self {
        Self {
            position: pose.position,
            orientation: pose.orientation,
        }
    }
}

/// Combined per-tick object; devices without a valid pose are omitted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct UnityFrame {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub headset: Option<DeviceData>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub left_controller: Option<DeviceData>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub right_controller: Option<DeviceData>,
}

impl From<&TrackedFrame> for UnityFrame {
    fn from(frame: &TrackedFrame) -> Self {
        Self {
            headset: frame.headset.as_ref().map(DeviceData::from),
            left_controller: frame.left_controller.as_ref().map(DeviceData::from),
            right_controller: frame.right_controller.as_ref().map(DeviceData::from),
        }
    }
}
