//! Common test utilities for integration tests
//!
//! Provides test server spawning, request builders, and assertions.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use queue_simulator::{
    config::SimulatorConfig,
    server::{create_router, AppState},
};

/// Test server wrapper
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub base_url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawn a test server with default configuration
    pub async fn spawn() -> Self {
        Self::spawn_with_config(SimulatorConfig::default()).await
    }

    /// Spawn a test server with custom configuration
    pub async fn spawn_with_config(mut config: SimulatorConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        config.server.host = "127.0.0.1".to_string();
        config.server.port = addr.port();

        let state = AppState::new(config).unwrap();
        let app = create_router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        let base_url = format!("http://{}", addr);

        for _ in 0..50 {
            if client.get(format!("{}/health", base_url)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Self {
            addr,
            client,
            base_url,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Service row in the spreadsheet column layout
pub fn service_row(code: &str, title: &str, duration: i64) -> Value {
    json!({
        "Service Code": code,
        "Service Title": title,
        "Service Duration (minutes)": duration
    })
}

/// Weighted table input
pub fn weighted_table(pairs: &[(f64, f64)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(value, weight)| json!({ "value": value, "weight": weight }))
            .collect(),
    )
}

/// Assert response status
pub fn assert_status(response: &reqwest::Response, expected: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert JSON field exists
pub fn assert_json_field(json: &Value, field: &str) {
    assert!(
        json.get(field).is_some(),
        "Expected field '{}' to exist in {:?}",
        field,
        json
    );
}

/// Assert the body is an error envelope with the given code
pub fn assert_error_code(json: &Value, code: &str) {
    assert_json_field(json, "error");
    assert_eq!(
        json["error"]["code"], code,
        "Expected error code {}, got {:?}",
        code, json["error"]
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_server() {
        let server = TestServer::spawn().await;
        let response = server.get("/health").await;
        assert_eq!(response.status().as_u16(), 200);
    }

    #[test]
    fn test_service_row_builder() {
        let row = service_row("DEP", "Deposit", 4);
        assert_eq!(row["Service Code"], "DEP");
        assert_eq!(row["Service Duration (minutes)"], 4);
    }
}
