//! Health, readiness, metrics and info endpoint tests

use super::common::*;
use queue_simulator::config::SimulatorConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_default_workspace() {
    let server = TestServer::spawn().await;

    let response = server.get("/health").await;
    assert_status(&response, 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_json_field(&body["checks"], "engine");
    assert_eq!(body["checks"]["workspace"]["status"], "pass");
}

#[tokio::test]
async fn test_health_degraded_without_inputs() {
    let server = TestServer::spawn_with_config(SimulatorConfig::minimal()).await;

    let body: Value = server.get("/healthz").await.json().await.unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["workspace"]["status"], "warn");
}

#[tokio::test]
async fn test_request_id_propagated() {
    let server = TestServer::spawn().await;

    let response = server
        .client
        .get(server.url("/ready"))
        .header("x-request-id", "req-abc")
        .send()
        .await
        .unwrap();

    assert_status(&response, 200);
    assert_eq!(response.headers()["x-request-id"], "req-abc");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_metrics_export() {
    let server = TestServer::spawn().await;

    server
        .post(
            "/v1/simulations/parallel",
            json!({
                "arrival": weighted_table(&[(2.0, 1.0)]),
                "service": weighted_table(&[(3.0, 1.0)])
            }),
        )
        .await;

    let response = server.get("/metrics").await;
    assert_status(&response, 200);

    let text = response.text().await.unwrap();
    assert!(text.contains("queue_simulator_runs_total{kind=\"parallel\"} 1"));
    assert!(text.contains("# TYPE queue_simulator_run_duration_seconds histogram"));
    assert!(text.contains("queue_simulator_http_requests_total"));
}

#[tokio::test]
async fn test_version_and_root() {
    let server = TestServer::spawn().await;

    let version: Value = server.get("/version").await.json().await.unwrap();
    assert_eq!(version["version"], queue_simulator::VERSION);

    let root: Value = server.get("/").await.json().await.unwrap();
    let endpoints = root["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e.as_str().unwrap().contains("/v1/simulations/parallel")));
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::spawn().await;
    let response = server.get("/v1/nothing-here").await;
    assert_status(&response, 404);
}
