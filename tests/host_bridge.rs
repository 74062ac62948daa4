use tokio::io::BufReader;
use tokio::sync::mpsc;

use orientation_bridge_lib::host::{read_commands, write_events};
use orientation_bridge_lib::sensor::{SensorSnapshot, WorkerEvent};
use orientation_bridge_lib::worker::WorkerCommand;

#[tokio::test]
async fn test_read_commands_skips_bad_lines() {
    let input = b"{\"type\":\"CONNECT\",\"baudRate\":9600}\n\nnot json\n{\"type\":\"CONNECT\"}\n{\"type\":\"DISCONNECT\"}\n";
    let (tx, mut rx) = mpsc::channel(8);
    read_commands(BufReader::new(&input[..]), tx).await;

    assert_eq!(rx.recv().await, Some(WorkerCommand::Connect { baud_rate: Some(9600) }));
    assert_eq!(rx.recv().await, Some(WorkerCommand::Connect { baud_rate: None }));
    assert_eq!(rx.recv().await, Some(WorkerCommand::Disconnect));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_write_events_as_json_lines() {
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(WorkerEvent::ShowCalibration).unwrap();
    tx.send(WorkerEvent::DataRead(SensorSnapshot {
        orientation: vec![1.0, f64::NAN, 3.0],
        ..SensorSnapshot::default()
    }))
    .unwrap();
    drop(tx);

    let mut out = Vec::new();
    write_events(rx, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first, serde_json::json!({ "type": "SHOW_CALIBRATION" }));

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(
        second,
        serde_json::json!({
            "type": "DATA_READ",
            "orientation": [1.0, null, 3.0],
            "quaternion": [1.0, 0.0, 0.0, 0.0],
            "calibration": [0.0, 0.0, 0.0, 0.0]
        })
    );
}

#[test]
fn test_connected_event_shape() {
    let event = WorkerEvent::Connected {
        port_name: "/dev/ttyACM0".to_string(),
        baud_rate: 115200,
        connected_at: chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap().with_timezone(&chrono::Utc),
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "CONNECTED");
    assert_eq!(value["portName"], "/dev/ttyACM0");
    assert_eq!(value["baudRate"], 115200);
    assert!(value["connectedAt"].as_str().unwrap().starts_with("2024-01-02T03:04:05"));
}
