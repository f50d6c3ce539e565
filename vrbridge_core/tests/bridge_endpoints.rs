//! End-to-end runs of the bridge against real local endpoints

use std::net::{TcpListener, UdpSocket};
use std::thread;
use std::time::Duration;
use tungstenite::Message;
use vrbridge_core::messages::{PoseStamped, PublishOp, UnityFrame};
use vrbridge_core::{
    BridgeConfig, BridgeError, ControllerMode, PoseBackend, PoseBridge, SimulatedSource,
    WebSocketTransport, WireFormat,
};

/// Accept one websocket client and collect its text frames until it closes
fn spawn_rosbridge_stub() -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut ws = tungstenite::accept(stream).unwrap();
        let mut texts = Vec::new();
        loop {
            match ws.read() {
                Ok(Message::Text(text)) => texts.push(text.to_string()),
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        texts
    });

    (url, handle)
}

fn decode(texts: &[String]) -> Vec<PublishOp<PoseStamped>> {
    texts
        .iter()
        .map(|t| serde_json::from_str(t).expect("rosbridge publish op"))
        .collect()
}

#[test]
fn test_publishes_all_devices_over_websocket() {
    let (url, server) = spawn_rosbridge_stub();

    let transport = WebSocketTransport::connect(&url).unwrap();
    let mut bridge = PoseBridge::new(SimulatedSource::new(), transport, WireFormat::Rosbridge);
    for _ in 0..5 {
        bridge.tick().unwrap();
    }
    bridge.shutdown().unwrap();

    let ops = decode(&server.join().unwrap());
    assert_eq!(ops.len(), 15);

    for tick in ops.chunks(3) {
        let topics: Vec<&str> = tick.iter().map(|op| op.topic.as_str()).collect();
        assert_eq!(
            topics,
            [
                "/oculus/headset_pose",
                "/oculus/left_controller_pose",
                "/oculus/right_controller_pose"
            ]
        );

        let stamp = tick[0].msg.header.stamp;
        for op in tick {
            assert_eq!(op.op, "publish");
            assert_eq!(op.msg.header.stamp, stamp);
            assert_eq!(op.msg.header.frame_id, "world");

            let q = op.msg.pose.orientation;
            let norm = (q.x * q.x + q.y * q.y + q.z * q.z + q.w * q.w).sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "quaternion norm {}", norm);
        }
    }
}

#[test]
fn test_lost_controllers_publish_headset_only() {
    let (url, server) = spawn_rosbridge_stub();

    let source = SimulatedSource::new()
        .with_controllers(ControllerMode::Invalid, ControllerMode::Absent);
    let transport = WebSocketTransport::connect(&url).unwrap();
    let mut bridge = PoseBridge::new(source, transport, WireFormat::Rosbridge);
    for _ in 0..3 {
        bridge.tick().unwrap();
    }
    drop(bridge);

    let ops = decode(&server.join().unwrap());
    assert_eq!(ops.len(), 3);
    assert!(ops.iter().all(|op| op.topic == "/oculus/headset_pose"));
}

#[test]
fn test_unity_frames_over_udp() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    let config = BridgeConfig {
        backend: PoseBackend::Simulation,
        format: WireFormat::Unity,
        udp_target: receiver.local_addr().unwrap().to_string(),
        ..Default::default()
    };
    let mut bridge = vrbridge_core::open(&config).unwrap();
    for _ in 0..3 {
        bridge.tick().unwrap();
    }

    let mut buf = [0u8; 2048];
    for _ in 0..3 {
        let len = receiver.recv(&mut buf).unwrap();
        let frame: UnityFrame = serde_json::from_slice(&buf[..len]).unwrap();
        let headset = frame.headset.expect("headset present");
        assert!((headset.position[1] - 1.6).abs() < 0.05);
        assert!(frame.left_controller.is_some());
        assert!(frame.right_controller.is_some());
    }
}

#[test]
fn test_open_fails_without_rosbridge() {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = BridgeConfig {
        backend: PoseBackend::Simulation,
        url: format!("ws://127.0.0.1:{}", port),
        ..Default::default()
    };

    assert!(matches!(
        vrbridge_core::open(&config),
        Err(BridgeError::Transport { .. })
    ));
}
