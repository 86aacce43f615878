//! End-to-end tests: real relay on a local port, WebSocket clients.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use common::*;
use courier_relay::config::RelayConfig;
use serde_json::json;

#[tokio::test]
async fn location_reaches_subscribed_monitor_verbatim() {
    let addr = start_relay().await;

    let mut d1 = TestClient::driver(&addr, "d1").await;
    let (mut m1, drivers) = TestClient::monitor(&addr, "m1").await;
    assert_eq!(drivers, ["d1"]);

    m1.send(json!({"type": "subscribe", "monitorId": "m1", "driverId": "d1"}))
        .await;
    m1.sync().await;

    d1.send(json!({"type": "location", "driverId": "d1", "coord": {"lat": 3.85, "lng": 11.51}}))
        .await;

    let msg = m1.recv().await;
    assert_eq!(
        msg,
        json!({"type": "location", "driverId": "d1", "coord": {"lat": 3.85, "lng": 11.51}})
    );
    m1.expect_silence().await;
}

#[tokio::test]
async fn only_watchers_of_a_driver_get_its_locations() {
    let addr = start_relay().await;

    let mut d1 = TestClient::driver(&addr, "d1").await;
    let mut d2 = TestClient::driver(&addr, "d2").await;
    let (mut watcher, _) = TestClient::monitor(&addr, "watcher").await;
    let (mut other, _) = TestClient::monitor(&addr, "other").await;
    // `other` joining refreshed the list for `watcher` too.
    let _ = watcher.recv_driver_list().await;

    // The dashboard client's spelling.
    watcher
        .send(json!({"type": "suscribe", "monitorId": "watcher", "driverId": "d1"}))
        .await;
    watcher.sync().await;
    other
        .send(json!({"type": "subscribe", "monitorId": "other", "driverId": "d2"}))
        .await;
    other.sync().await;

    d1.send(json!({
        "type": "location",
        "driverId": "d1",
        "coord": {"lat": 4.05, "lng": 9.7, "accuracy": 8.0},
        "timestamp": 1_718_000_000_000_u64
    }))
    .await;

    let msg = watcher.recv().await;
    assert_eq!(msg["coord"]["accuracy"], 8.0);
    assert_eq!(msg["timestamp"], 1_718_000_000_000_u64);
    other.expect_silence().await;

    d2.sync().await;
}

#[tokio::test]
async fn location_payload_is_relayed_untouched() {
    let addr = start_relay().await;

    let mut d1 = TestClient::driver(&addr, "d1").await;
    let (mut m1, _) = TestClient::monitor(&addr, "m1").await;
    m1.send(json!({"type": "subscribe", "monitorId": "m1", "driverId": "d1"}))
        .await;
    m1.sync().await;

    let coord = json!({"lat": 3, "lng": 11, "heading": 90.0, "speed": 4.2});
    d1.send(json!({
        "type": "location",
        "driverId": "d1",
        "coord": coord,
        "timestamp": "2024-06-10T10:00:00Z"
    }))
    .await;

    let msg = m1.recv().await;
    assert_eq!(msg["coord"], coord);
    assert_eq!(msg["timestamp"], "2024-06-10T10:00:00Z");
}

#[tokio::test]
async fn driver_disconnect_is_broadcast_to_monitors() {
    let addr = start_relay().await;

    let (mut m1, drivers) = TestClient::monitor(&addr, "m1").await;
    assert!(drivers.is_empty());

    let d1 = TestClient::driver(&addr, "d1").await;
    assert_eq!(m1.recv_driver_list().await, ["d1"]);

    d1.close().await;
    assert!(m1.recv_driver_list().await.is_empty());
    assert!(m1.sync().await.is_empty());
}

#[tokio::test]
async fn assignments_accumulate_on_the_driver() {
    let addr = start_relay().await;

    let mut driver = TestClient::driver(&addr, "d1").await;
    let (mut dispatch, _) = TestClient::monitor(&addr, "dispatch").await;

    dispatch
        .send(json!({"type": "assign", "driverId": "d1", "delivery": "job1"}))
        .await;
    assert_eq!(
        driver.recv().await,
        json!({"type": "assign", "deliveries": ["job1"]})
    );

    dispatch
        .send(json!({"type": "assign", "driverId": "d1", "delivery": "job2"}))
        .await;
    assert_eq!(
        driver.recv().await,
        json!({"type": "assign", "deliveries": ["job1", "job2"]})
    );
}

#[tokio::test]
async fn reconnect_survives_stale_close() {
    let addr = start_relay().await;
    let (mut m1, _) = TestClient::monitor(&addr, "m1").await;

    let old = TestClient::driver(&addr, "d1").await;
    assert_eq!(m1.recv_driver_list().await, ["d1"]);
    let mut fresh = TestClient::driver(&addr, "d1").await;
    assert_eq!(m1.recv_driver_list().await, ["d1"]);

    old.close().await;
    // The close path re-broadcasts; d1 is still registered on `fresh`.
    assert_eq!(m1.recv_driver_list().await, ["d1"]);

    m1.send(json!({"type": "assign", "driverId": "d1", "delivery": 99}))
        .await;
    assert_eq!(
        fresh.recv().await,
        json!({"type": "assign", "deliveries": [99]})
    );
}

#[tokio::test]
async fn bad_frames_do_not_close_the_connection() {
    let addr = start_relay().await;
    let mut client = TestClient::connect(&addr).await;

    client.send_raw("definitely not json").await;
    client.send(json!({"type": "teleport"})).await;
    client.send(json!({"type": "connected_drivers"})).await;
    client.expect_silence().await;

    client
        .send(json!({"type": "auth", "role": "driver", "driverId": "late"}))
        .await;
    assert_eq!(client.sync().await, ["late"]);
}

#[tokio::test]
async fn health_reports_registered_clients() {
    let addr = start_relay().await;

    let _d1 = TestClient::driver(&addr, "d1").await;
    let (mut m1, _) = TestClient::monitor(&addr, "m1").await;
    m1.send(json!({"type": "subscribe", "monitorId": "m1", "driverId": "d1"}))
        .await;
    m1.sync().await;

    let health = health(&addr).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["drivers"], 1);
    assert_eq!(health["monitors"], 1);
    assert_eq!(health["connections"], 2);
    assert_eq!(health["subscriptions"], 1);
}

#[tokio::test]
async fn silent_connections_are_reclaimed() {
    let config = RelayConfig {
        heartbeat_interval_secs: 1,
        idle_timeout_secs: 1,
        ..RelayConfig::default()
    };
    let addr = start_relay_with(config).await;

    let mut idle = TestClient::connect(&addr).await;
    idle.send(json!({"type": "auth", "role": "driver", "driverId": "sleepy"}))
        .await;

    // Not reading means pings go unanswered.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    idle.expect_closed(Duration::from_secs(3)).await;

    let health = health(&addr).await;
    assert_eq!(health["drivers"], 0);
}

#[tokio::test]
async fn oversized_frames_close_the_connection() {
    let config = RelayConfig {
        max_message_bytes: 1024,
        ..RelayConfig::default()
    };
    let addr = start_relay_with(config).await;

    let mut big = TestClient::driver(&addr, "big").await;
    let padding = "x".repeat(2048);
    big.send(json!({"type": "connected_drivers", "padding": padding}))
        .await;
    big.expect_closed(RECV_TIMEOUT).await;

    let health = health(&addr).await;
    assert_eq!(health["drivers"], 0);
    assert_eq!(health["connections"], 0);
}
