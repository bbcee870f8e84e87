//! Simulation run endpoint tests

use super::common::*;
use queue_simulator::catalog::ServiceCatalog;
use queue_simulator::config::SimulatorConfig;
use queue_simulator::engine::SingleRunOptions;
use queue_simulator::sampling::ScriptedSource;
use queue_simulator::types::{EventType, ServiceRow};
use queue_simulator::{SimulationEngine, SimulationError};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

fn arrivals(events: &[Value]) -> Vec<&Value> {
    events.iter().filter(|e| e["eventType"] == "Arrival").collect()
}

#[test]
fn test_scripted_single_customer() {
    let catalog = ServiceCatalog::from_rows(&[ServiceRow::new("X", "T", 5)]).unwrap();
    let engine = SimulationEngine::default_config();
    let mut rng = ScriptedSource::new().with_ints([1, 2]);

    let run = assert_ok!(engine.run_single_with(&catalog, &SingleRunOptions::default(), &mut rng));

    let records: Vec<_> = run.events.iter().map(|e| e.record().clone()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].event_type, EventType::Arrival);
    assert_eq!((records[0].clock_time, records[0].end_time), (2, 7));
    assert_eq!(records[1].event_type, EventType::Departure);
    assert_eq!((records[1].clock_time, records[1].end_time), (7, 7));
}

#[test]
fn test_empty_catalog_produces_no_events() {
    let engine = SimulationEngine::default_config();
    let err = assert_err!(engine.run_single(&ServiceCatalog::new(), &SingleRunOptions::default()));
    assert_eq!(err, SimulationError::NoServicesAvailable);
}

#[tokio::test]
async fn test_single_run_plain() {
    let server = TestServer::spawn().await;

    let response = server.post("/v1/simulations/single", json!({"seed": 11})).await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "plain");
    assert_eq!(body["seed"], 11);

    let events = body["events"].as_array().unwrap();
    let customers = body["metrics"]["totalCustomers"].as_u64().unwrap();
    assert!((5..=10).contains(&customers));
    assert_eq!(events.len() as u64, customers * 2);

    for event in events {
        assert!(event.get("arrivalProbability").is_none());
        let clock = event["clockTime"].as_u64().unwrap();
        let end = event["endTime"].as_u64().unwrap();
        assert!(end >= clock);
    }
}

#[tokio::test]
async fn test_single_run_reproducible_with_seed() {
    let server = TestServer::spawn().await;
    let request = json!({"seed": 99, "mode": "probability"});

    let a: Value = server.post("/v1/simulations/single", request.clone()).await.json().await.unwrap();
    let b: Value = server.post("/v1/simulations/single", request).await.json().await.unwrap();

    assert_eq!(a["events"], b["events"]);
    assert_ne!(a["runId"], b["runId"]);
}

#[tokio::test]
async fn test_single_run_probability_columns() {
    let server = TestServer::spawn().await;

    let body: Value = server
        .post("/v1/simulations/single", json!({"seed": 5, "mode": "probability"}))
        .await
        .json()
        .await
        .unwrap();

    let events = body["events"].as_array().unwrap();
    assert!(events.len() <= 40);
    for event in events {
        let p = event["arrivalProbability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(event["completionProbability"], 0.8);
    }
}

#[tokio::test]
async fn test_single_run_sorted_by_clock() {
    let server = TestServer::spawn().await;

    let body: Value = server
        .post("/v1/simulations/single", json!({"seed": 3, "sorted": true}))
        .await
        .json()
        .await
        .unwrap();

    let clocks: Vec<u64> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["clockTime"].as_u64().unwrap())
        .collect();
    assert!(clocks.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_single_run_same_code_waits() {
    let server = TestServer::spawn().await;

    let body: Value = server
        .post(
            "/v1/simulations/single",
            json!({
                "seed": 21,
                "simultaneousArrivals": false,
                "services": [service_row("LONG", "Long service", 30)]
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    let events = body["events"].as_array().unwrap();
    let arrivals = arrivals(events);
    assert!(arrivals.len() >= 5);
    // interarrival is at most 3 minutes, so everyone after the first queues
    for event in arrivals.iter().skip(1) {
        assert!(event["waitingTime"].as_u64().unwrap() > 0);
    }
}

#[tokio::test]
async fn test_single_run_empty_catalog() {
    let server = TestServer::spawn_with_config(SimulatorConfig::minimal()).await;

    let response = server.post("/v1/simulations/single", json!({})).await;
    assert_status(&response, 400);

    let body: Value = response.json().await.unwrap();
    assert_error_code(&body, "no_services_available");
}

#[tokio::test]
async fn test_parallel_run_deterministic_tables() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/simulations/parallel",
            json!({
                "arrival": weighted_table(&[(2.0, 1.0)]),
                "service": weighted_table(&[(3.0, 1.0)])
            }),
        )
        .await;
    assert_status(&response, 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["report"]["Total Customers"], 30);
    assert_eq!(body["report"]["Able Utilization Rate"], "75.00%");
    assert_eq!(body["report"]["Baker Utilization Rate"], "75.00%");
    assert_eq!(body["report"]["Average Waiting Time"], "0.00 minutes");

    let customers = body["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 30);
    assert!(customers.iter().all(|c| c["waitTime"] == 0.0));
}

#[tokio::test]
async fn test_parallel_run_workspace_tables() {
    let server = TestServer::spawn().await;

    let body: Value = server
        .post("/v1/simulations/parallel", json!({"seed": 4, "periodMinutes": 120}))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["simulationPeriod"], 120.0);
    let customers = body["customers"].as_array().unwrap();
    assert!(!customers.is_empty());

    for (idx, c) in customers.iter().enumerate() {
        let arrival = c["arrivalTime"].as_f64().unwrap();
        let start = c["serviceStart"].as_f64().unwrap();
        let end = c["endTime"].as_f64().unwrap();
        // only the final arrival may cross the period
        if idx + 1 < customers.len() {
            assert!(arrival < 120.0);
        }
        assert!(start >= arrival);
        assert!(end > start);
    }
}

#[tokio::test]
async fn test_parallel_run_without_tables() {
    let server = TestServer::spawn().await;
    assert_status(&server.delete("/v1/tables").await, 204);

    let response = server.post("/v1/simulations/parallel", json!({})).await;
    assert_status(&response, 400);

    let body: Value = response.json().await.unwrap();
    assert_error_code(&body, "empty_probability_table");
}

#[tokio::test]
async fn test_last_run() {
    let server = TestServer::spawn().await;

    let empty: Value = server.get("/v1/simulations/last").await.json().await.unwrap();
    assert!(empty.is_null());

    let run: Value = server
        .post("/v1/simulations/single", json!({"seed": 8}))
        .await
        .json()
        .await
        .unwrap();

    let last: Value = server.get("/v1/simulations/last").await.json().await.unwrap();
    assert_eq!(last["kind"], "single");
    assert_eq!(last["runId"], run["runId"]);
}

#[tokio::test]
async fn test_stats_track_runs() {
    let server = TestServer::spawn().await;

    server.post("/v1/simulations/single", json!({"seed": 1})).await;
    server
        .post(
            "/v1/simulations/parallel",
            json!({
                "arrival": weighted_table(&[(2.0, 1.0)]),
                "service": weighted_table(&[(3.0, 1.0)])
            }),
        )
        .await;

    let stats: Value = server.get("/admin/stats").await.json().await.unwrap();
    assert_eq!(stats["total_runs"], 2);
    assert_eq!(stats["single_runs"], 1);
    assert_eq!(stats["parallel_runs"], 1);

    let reset = server.client.post(server.url("/admin/stats/reset")).send().await.unwrap();
    assert_status(&reset, 204);

    let stats: Value = server.get("/admin/stats").await.json().await.unwrap();
    assert_eq!(stats["total_runs"], 0);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = TestServer::spawn().await;

    let response = server
        .client
        .post(server.url("/v1/simulations/single"))
        .header("Content-Type", "application/json")
        .body("{invalid json}")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
