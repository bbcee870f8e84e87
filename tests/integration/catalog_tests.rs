//! Service catalog and probability table endpoint tests

use super::common::*;
use queue_simulator::config::SimulatorConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_list_default_catalog() {
    let server = TestServer::spawn().await;

    let response = server.get("/v1/services").await;
    assert_status(&response, 200);

    let body: Vec<Value> = response.json().await.unwrap();
    let codes: Vec<&str> = body.iter().map(|s| s["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["DEP", "WDL", "ACC"]);
}

#[tokio::test]
async fn test_add_service() {
    let server = TestServer::spawn_with_config(SimulatorConfig::minimal()).await;

    let response = server
        .post("/v1/services", json!({"code": "LN", "title": "Loan", "duration": 8}))
        .await;
    assert_status(&response, 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "LN");
    assert_eq!(body["duration"], 8);

    let list: Vec<Value> = server.get("/v1/services").await.json().await.unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_add_duplicate_service_rejected() {
    let server = TestServer::spawn().await;

    let response = server
        .post("/v1/services", service_row("DEP", "Deposit again", 2))
        .await;
    assert_status(&response, 400);

    let body: Value = response.json().await.unwrap();
    assert_error_code(&body, "duplicate_code");
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_add_service_invalid_duration() {
    let server = TestServer::spawn().await;

    let response = server
        .post("/v1/services", json!({"code": "Z", "title": "Zero", "duration": 0}))
        .await;
    assert_status(&response, 400);

    let body: Value = response.json().await.unwrap();
    assert_error_code(&body, "invalid_duration");
}

#[tokio::test]
async fn test_bulk_load_replaces_catalog() {
    let server = TestServer::spawn().await;

    let response = server
        .put(
            "/v1/services",
            json!([service_row("A", "Audit", 2), service_row("B", "Billing", 3)]),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loaded"], 2);

    let list: Vec<Value> = server.get("/v1/services").await.json().await.unwrap();
    let codes: Vec<&str> = list.iter().map(|s| s["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["A", "B"]);
}

#[tokio::test]
async fn test_bulk_load_failure_leaves_catalog_unchanged() {
    let server = TestServer::spawn().await;

    let response = server
        .put(
            "/v1/services",
            json!([service_row("A", "Audit", 2), service_row("A", "Again", 3)]),
        )
        .await;
    assert_status(&response, 400);

    let body: Value = response.json().await.unwrap();
    assert_error_code(&body, "bulk_load_failed");

    let list: Vec<Value> = server.get("/v1/services").await.json().await.unwrap();
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn test_clear_services() {
    let server = TestServer::spawn().await;

    let response = server.delete("/v1/services").await;
    assert_status(&response, 204);

    let list: Vec<Value> = server.get("/v1/services").await.json().await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_get_default_tables() {
    let server = TestServer::spawn().await;

    let response = server.get("/v1/tables").await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    let rows = body["arrival"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["digitFrom"], 1);
    assert_eq!(rows[0]["digitTo"], 25);
    assert_eq!(rows[3]["digitTo"], 100);
}

#[tokio::test]
async fn test_put_tables_with_sheet_rows() {
    let server = TestServer::spawn().await;

    let response = server
        .put(
            "/v1/tables",
            json!({
                "service": [
                    {"Service Time": 2, "Server Probability": 0.5},
                    {"Service Time": 4, "Server Probability": 0.5}
                ]
            }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    let service = body["service"]["rows"].as_array().unwrap();
    assert_eq!(service.len(), 2);
    assert_eq!(service[1]["cumulativeProbability"], 1.0);
    // arrival table untouched
    assert_eq!(body["arrival"]["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_put_invalid_table_changes_nothing() {
    let server = TestServer::spawn().await;

    let response = server
        .put(
            "/v1/tables",
            json!({
                "arrival": weighted_table(&[(1.0, 1.0)]),
                "service": weighted_table(&[(3.0, -1.0)])
            }),
        )
        .await;
    assert_status(&response, 400);

    let tables: Value = server.get("/v1/tables").await.json().await.unwrap();
    assert_eq!(tables["arrival"]["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_clear_tables() {
    let server = TestServer::spawn().await;

    assert_status(&server.delete("/v1/tables").await, 204);

    let tables: Value = server.get("/v1/tables").await.json().await.unwrap();
    assert!(tables["arrival"]["rows"].as_array().unwrap().is_empty());
    assert!(tables["service"]["rows"].as_array().unwrap().is_empty());
}
