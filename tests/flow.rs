//! Integration tests for the end-to-end conversation flow

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use float_harness::config::HarnessConfig;
use float_harness::flow::{FlowOutcome, FlowTester};
use float_harness::health::{HealthProber, ReadinessReport, ReadinessWalker};
use float_harness::registry::{ServiceDescriptor, ServiceRegistry};
use serde_json::{Value, json};

fn health() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

fn tools_server() -> Router {
    health()
        .route(
            "/mcp/tools/descriptions",
            get(|| async {
                Json(json!({"tools": [{"name": "query_profiles"}, {"name": "nearest_floats"}]}))
            }),
        )
        .route(
            "/metadata/stats",
            get(|| async { Json(json!({"total_embeddings": 1234, "collections": 2})) }),
        )
}

async fn walk(tools: &str, agent: &str) -> (ServiceRegistry, ReadinessReport) {
    let registry = ServiceRegistry::from_descriptors([
        ServiceDescriptor::new("mcp_server", tools, "/health").unwrap(),
        ServiceDescriptor::new("agent", agent, "/health").unwrap(),
    ])
    .unwrap();
    let walker = ReadinessWalker::new(HealthProber::new(Duration::from_secs(2)).unwrap());
    let report = walker.walk(&registry).await;
    (registry, report)
}

fn tester(registry: &ServiceRegistry) -> FlowTester {
    FlowTester::from_registry(
        reqwest::Client::new(),
        registry,
        HarnessConfig::default().timeouts,
    )
    .unwrap()
}

#[tokio::test]
async fn test_flow_accepts_response_without_optional_fields() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = seen.clone();

    let agent = health()
        .route(
            "/agent/initialize",
            post(|| async { Json(json!({"message": "agent ready"})) }),
        )
        .route(
            "/agent/chat",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(body);
                    Json(json!({"response": "hello"}))
                }
            }),
        );

    let tools = common::serve(tools_server()).await;
    let agent = common::serve(agent).await;
    let (registry, readiness) = walk(&tools, &agent).await;

    let outcome = tester(&registry).run_gated(&readiness, "session-42").await;
    let FlowOutcome::Completed(summary) = outcome else {
        panic!("flow should run when both dependencies are reachable");
    };

    assert!(summary.overall_pass);
    assert_eq!(summary.per_service_pass.len(), 2);
    assert!(summary.steps.iter().all(|s| s.succeeded), "{:?}", summary.steps);
    assert_eq!(summary.turns.len(), 3);
    assert!(summary.turns.iter().all(|t| t.response == "hello"));
    assert!(summary.turns[0].follow_up_suggestions.is_empty());
    assert_eq!(summary.tool_count, Some(2));
    assert_eq!(summary.total_embeddings, Some(1234));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["session_id"], "session-42");
    assert!(requests[0]["message"].is_string());
}

#[tokio::test]
async fn test_flow_continues_after_failed_steps() {
    let agent = health()
        .route(
            "/agent/initialize",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/agent/chat",
            post(|| async {
                Json(json!({
                    "answer": "wrong field name",
                    "follow_up_suggestions": ["Try the Indian Ocean"],
                    "metadata": {"voice_compatible": true}
                }))
            }),
        );
    // Tool server without the listing endpoints
    let tools = common::serve(health()).await;
    let agent = common::serve(agent).await;
    let (registry, readiness) = walk(&tools, &agent).await;

    let summary = tester(&registry).run_flow(&readiness, "session-7").await;

    // Readiness drives the verdict, not flow steps
    assert!(summary.overall_pass);
    assert_eq!(summary.steps.len(), 1 + 3 + 2);
    assert!(summary.steps.iter().all(|s| !s.succeeded));

    let turn = &summary.turns[0];
    assert!(turn.response.is_empty());
    assert_eq!(turn.follow_up_suggestions, ["Try the Indian Ocean"]);
    assert_eq!(turn.metadata["voice_compatible"], Value::Bool(true));
    assert_eq!(summary.tool_count, None);
}

#[tokio::test]
async fn test_flow_skipped_when_agent_unreachable() {
    let tools = common::serve(tools_server()).await;
    let (registry, readiness) = walk(&tools, &common::dead_address()).await;

    let outcome = tester(&registry).run_gated(&readiness, "session-0").await;

    match outcome {
        FlowOutcome::Skipped { unreachable } => assert_eq!(unreachable, ["agent"]),
        FlowOutcome::Completed(_) => panic!("flow must not run without the agent"),
    }
}
