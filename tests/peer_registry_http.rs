// Copyright (c) 2026 Peerpool
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use peerpool::config::RegistryConfig;
use peerpool::networking::peer_registry::{PeerRegistry, PeerRegistryError};
use peerpool::networking::transport::TransportError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Inbox = Arc<Mutex<Vec<Value>>>;

async fn alive() -> &'static str {
    "ok"
}

async fn inbox(State(rx): State<Inbox>, Json(v): Json<Value>) -> StatusCode {
    rx.lock().unwrap().push(v);
    StatusCode::ACCEPTED
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn hang() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

/// Local mock peer; returns its base URL and the messages it received.
async fn spawn_peer() -> anyhow::Result<(String, Inbox)> {
    let received: Inbox = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/", get(alive).post(inbox))
        .route("/broken", get(broken).post(broken))
        .route("/hang", get(hang))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), received))
}

fn http_registry(timeout_ms: u64) -> PeerRegistry<peerpool::networking::transport::HttpTransport> {
    let cfg = RegistryConfig {
        request_timeout_ms: timeout_ms,
        ..RegistryConfig::default()
    };
    let mut reg = PeerRegistry::from_config(cfg).expect("http transport");
    reg.initialize();
    reg
}

#[tokio::test]
async fn probe_and_deliver_over_http() -> anyhow::Result<()> {
    let (base, received) = spawn_peer().await?;
    let mut reg = http_registry(2_000);

    reg.add_peer("peer1", &format!("{base}/"))?;
    reg.connect_to_peer("peer1").await?;
    assert!(reg.get_peer("peer1").unwrap().connected);

    reg.send_message("peer1", &json!({"type": "test", "data": "hello"}))
        .await?;
    assert_eq!(
        received.lock().unwrap().clone(),
        vec![json!({"type": "test", "data": "hello"})]
    );
    Ok(())
}

#[tokio::test]
async fn error_status_still_counts_as_alive() -> anyhow::Result<()> {
    let (base, _rx) = spawn_peer().await?;
    let mut reg = http_registry(2_000);

    reg.add_peer("peer1", &format!("{base}/broken"))?;
    reg.connect_to_peer("peer1").await?;
    reg.send_message("peer1", &json!({"type": "test"})).await?;
    Ok(())
}

#[tokio::test]
async fn refused_connection_fails_probe() -> anyhow::Result<()> {
    // reserve a port, then close it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let mut reg = http_registry(2_000);
    reg.add_peer("peer1", &format!("http://{addr}/"))?;

    let err = reg.connect_to_peer("peer1").await.unwrap_err();
    assert!(matches!(err, PeerRegistryError::ConnectionFailed { .. }));
    assert!(reg.last_error().contains("failed to connect"));
    assert!(!reg.get_peer("peer1").unwrap().connected);
    Ok(())
}

#[tokio::test]
async fn hung_probe_times_out() -> anyhow::Result<()> {
    let (base, _rx) = spawn_peer().await?;
    let mut reg = http_registry(200);
    reg.add_peer("slow", &format!("{base}/hang"))?;

    let err = reg.connect_to_peer("slow").await.unwrap_err();
    assert_eq!(
        err,
        PeerRegistryError::ConnectionFailed {
            id: "slow".to_string(),
            cause: TransportError::Timeout,
        }
    );
    Ok(())
}
