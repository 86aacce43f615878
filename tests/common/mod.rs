#![allow(dead_code, clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;

use courier_relay::app_state::AppState;
use courier_relay::config::RelayConfig;
use courier_relay::server;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// How long a client waits for an expected message.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a client listens before concluding nothing is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(250);

/// Start a relay with default settings on a random local port.
pub async fn start_relay() -> SocketAddr {
    start_relay_with(RelayConfig::default()).await
}

/// Start a relay with `config` (its listen address is ignored).
pub async fn start_relay_with(config: RelayConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(config);

    tokio::spawn(async move {
        server::serve(listener, state, std::future::pending())
            .await
            .unwrap();
    });

    addr
}

/// Fetch `/health` as JSON.
pub async fn health(addr: &SocketAddr) -> Value {
    reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body")
}

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(addr: &SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{addr}/"))
            .await
            .expect("ws connect");
        Self { ws }
    }

    pub async fn driver(addr: &SocketAddr, id: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client
            .send(json!({"type": "auth", "role": "driver", "driverId": id}))
            .await;
        client.sync().await;
        client
    }

    pub async fn monitor(addr: &SocketAddr, id: &str) -> (Self, Vec<String>) {
        let mut client = Self::connect(addr).await;
        client
            .send(json!({"type": "auth", "role": "monitor", "monitorId": id}))
            .await;
        let drivers = client.recv_driver_list().await;
        (client, drivers)
    }

    pub async fn send(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::text(text.to_string()))
            .await
            .expect("ws send");
    }

    /// Round-trips a `connected_drivers` request so that everything this
    /// client sent before has been applied by the relay.
    pub async fn sync(&mut self) -> Vec<String> {
        self.send(json!({"type": "connected_drivers"})).await;
        self.recv_driver_list().await
    }

    pub async fn recv(&mut self) -> Value {
        match tokio::time::timeout(RECV_TIMEOUT, self.next_text()).await {
            Ok(Some(text)) => serde_json::from_str(&text).expect("relay sends JSON"),
            Ok(None) => panic!("connection closed while waiting for a message"),
            Err(_) => panic!("timed out waiting for a message"),
        }
    }

    pub async fn recv_driver_list(&mut self) -> Vec<String> {
        let msg = self.recv().await;
        assert_eq!(msg["type"], "connected_drivers", "unexpected message {msg}");
        serde_json::from_value(msg["connectedDrivers"].clone())
            .expect("driver id list")
    }

    pub async fn expect_silence(&mut self) {
        if let Ok(Some(text)) = tokio::time::timeout(QUIET_PERIOD, self.next_text()).await {
            panic!("expected no message, got {text}");
        }
    }

    /// Reads until the relay closes the connection.
    pub async fn expect_closed(&mut self, within: Duration) {
        let closed = tokio::time::timeout(within, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => {}
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "relay did not close the connection");
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    async fn next_text(&mut self) -> Option<String> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }
}
