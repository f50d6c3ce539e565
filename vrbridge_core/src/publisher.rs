//! Frame encoding for the supported wire formats

use crate::error::BridgeResult;
use crate::messages::{PublishOp, TrackedFrame, UnityFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outbound message layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// One rosbridge `publish` op per valid device
    #[default]
    Rosbridge,
    /// One combined object per tick for the Unity receiver
    Unity,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Rosbridge => write!(f, "rosbridge"),
            WireFormat::Unity => write!(f, "unity"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rosbridge" | "ros" => Ok(WireFormat::Rosbridge),
            "unity" | "frame" => Ok(WireFormat::Unity),
            other => Err(format!("unknown wire format '{}'", other)),
        }
    }
}

/// Serialize one tick's frame into the messages to send, in send order
///
/// Rosbridge: headset, left, right, skipping devices without a valid pose.
/// Unity: always exactly one message, possibly `{}`.
pub fn encode_frame(frame: &TrackedFrame, format: WireFormat) -> BridgeResult<Vec<String>> {
    match format {
        WireFormat::Rosbridge => frame
            .poses()
            .map(|(device, pose)| -> BridgeResult<String> {
                let op = PublishOp::device_pose(device, pose, frame.stamp);
                Ok(serde_json::to_string(&op)?)
            })
            .collect(),
        WireFormat::Unity => Ok(vec![serde_json::to_string(&UnityFrame::from(frame))?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{PoseStamped, TrackedDevice};
    use crate::pose::Pose;
    use crate::stamp::Stamp;

    fn full_frame(stamp: Stamp) -> TrackedFrame {
        let mut frame = TrackedFrame::new(stamp);
        for device in TrackedDevice::ALL {
            frame.set(device, Some(Pose::identity()));
        }
        frame
    }

    #[test]
    fn test_rosbridge_one_message_per_device_in_order() {
        let messages = encode_frame(&full_frame(Stamp::default()), WireFormat::Rosbridge).unwrap();

        let topics: Vec<String> = messages
            .iter()
            .map(|m| serde_json::from_str::<PublishOp<PoseStamped>>(m).unwrap().topic)
            .collect();
        assert_eq!(
            topics,
            vec![
                "/oculus/headset_pose",
                "/oculus/left_controller_pose",
                "/oculus/right_controller_pose"
            ]
        );
    }

    #[test]
    fn test_rosbridge_messages_share_stamp() {
        let stamp = Stamp { secs: 1_700_000_000, nsecs: 123_456_789 };
        let messages = encode_frame(&full_frame(stamp), WireFormat::Rosbridge).unwrap();

        for message in &messages {
            let op: PublishOp<PoseStamped> = serde_json::from_str(message).unwrap();
            assert_eq!(op.msg.header.stamp, stamp);
            assert_eq!(op.msg.header.frame_id, "world");
        }
    }

    #[test]
    fn test_rosbridge_skips_missing_devices() {
        let mut frame = full_frame(Stamp::default());
        frame.set(TrackedDevice::LeftController, None);

        let messages = encode_frame(&frame, WireFormat::Rosbridge).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.contains("left_controller")));
    }

    #[test]
    fn test_rosbridge_empty_frame_sends_nothing() {
        let frame = TrackedFrame::new(Stamp::default());
        assert!(encode_frame(&frame, WireFormat::Rosbridge).unwrap().is_empty());
    }

    #[test]
    fn test_unity_always_one_message() {
        let empty = TrackedFrame::new(Stamp::default());
        assert_eq!(encode_frame(&empty, WireFormat::Unity).unwrap(), vec!["{}".to_string()]);

        let messages = encode_frame(&full_frame(Stamp::default()), WireFormat::Unity).unwrap();
        assert_eq!(messages.len(), 1);
        let decoded: UnityFrame = serde_json::from_str(&messages[0]).unwrap();
        assert!(decoded.headset.is_some());
        assert!(decoded.left_controller.is_some());
        assert!(decoded.right_controller.is_some());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("rosbridge".parse::<WireFormat>(), Ok(WireFormat::Rosbridge));
        assert_eq!("UNITY".parse::<WireFormat>(), Ok(WireFormat::Unity));
        assert!("protobuf".parse::<WireFormat>().is_err());
    }
}
