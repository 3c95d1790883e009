//! Integration tests for probing and readiness reporting

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use float_harness::health::{HealthProber, ReadinessWalker};
use float_harness::preflight::ConfigCheckResult;
use float_harness::registry::{ServiceDescriptor, ServiceRegistry};
use float_harness::{ExitPolicy, HarnessError, ReportAggregator, aggregate};

fn prober() -> HealthProber {
    HealthProber::new(Duration::from_secs(2)).unwrap()
}

fn healthy() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

#[tokio::test]
async fn test_probe_healthy_service() {
    let base = common::serve(healthy()).await;
    let descriptor = ServiceDescriptor::new("tools", &base, "/health").unwrap();

    let result = prober().probe(&descriptor).await;

    assert!(result.reachable, "expected reachable: {:?}", result);
    assert_eq!(result.status_code, Some(200));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_probe_without_listener() {
    let descriptor = ServiceDescriptor::new("ghost", &common::dead_address(), "/health").unwrap();

    let result = prober().probe(&descriptor).await;

    assert!(!result.reachable);
    assert_eq!(result.status_code, None);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_probe_non_200_is_unreachable() {
    let router = Router::new().route(
        "/health",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = common::serve(router).await;
    let descriptor = ServiceDescriptor::new("agent", &base, "/health").unwrap();

    let result = prober().probe(&descriptor).await;

    assert!(!result.reachable);
    assert_eq!(result.status_code, Some(503));
}

#[tokio::test]
async fn test_probe_times_out() {
    let router = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let base = common::serve(router).await;
    let descriptor = ServiceDescriptor::new("slow", &base, "/health").unwrap();

    let prober = HealthProber::new(Duration::from_millis(200)).unwrap();
    let result = prober.probe(&descriptor).await;

    assert!(!result.reachable);
    assert!(result.error.unwrap().contains("timed out"));
    assert!(result.elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_dashboard_layout_path_is_probed() {
    let router = Router::new().route("/_dash-layout", get(|| async { "{}" }));
    let base = common::serve(router).await;
    let descriptor = ServiceDescriptor::new("dashboard", &base, "/_dash-layout").unwrap();

    assert!(prober().probe(&descriptor).await.reachable);
}

#[tokio::test]
async fn test_walk_returns_one_result_per_service_in_order() {
    let up = common::serve(healthy()).await;
    let down = common::dead_address();

    let registry = ServiceRegistry::from_descriptors([
        ServiceDescriptor::new("voice_pipeline", &down, "/health").unwrap(),
        ServiceDescriptor::new("mcp_server", &up, "/health").unwrap(),
        ServiceDescriptor::new("agent", &down, "/health").unwrap(),
        ServiceDescriptor::new("dashboard", &up, "/health").unwrap(),
    ])
    .unwrap();

    let walker = ReadinessWalker::new(prober());
    for report in [walker.walk(&registry).await, walker.walk_concurrent(&registry).await] {
        assert_eq!(report.len(), registry.len());
        let names: Vec<_> = report.iter().map(|r| r.service.name.as_str()).collect();
        assert_eq!(names, ["voice_pipeline", "mcp_server", "agent", "dashboard"]);
        assert_eq!(report.unreachable(), ["voice_pipeline", "agent"]);
    }
}

#[tokio::test]
async fn test_report_length_matches_registry_with_shared_address() {
    let base = common::serve(healthy()).await;
    let agent = ServiceDescriptor::new("agent", &base, "/health").unwrap();

    // Same name twice cannot form a registry
    let duplicate = ServiceRegistry::from_descriptors([agent.clone(), agent.clone()]);
    assert!(matches!(duplicate, Err(HarnessError::DuplicateService(_))));

    // Distinct names sharing one address still yield one result each
    let registry = ServiceRegistry::from_descriptors([
        agent,
        ServiceDescriptor::new("agent_replica", &base, "/health").unwrap(),
    ])
    .unwrap();
    let walker = ReadinessWalker::new(prober());
    assert_eq!(walker.walk(&registry).await.len(), registry.len());
    assert_eq!(walker.walk_concurrent(&registry).await.len(), registry.len());
}

#[tokio::test]
async fn test_two_healthy_services_exit_zero() {
    let tools = common::serve(healthy()).await;
    let agent = common::serve(healthy()).await;

    let registry = ServiceRegistry::from_descriptors([
        ServiceDescriptor::new("tools", &tools, "/health").unwrap(),
        ServiceDescriptor::new("agent", &agent, "/health").unwrap(),
    ])
    .unwrap();

    let report = ReadinessWalker::new(prober()).walk(&registry).await;

    assert!(report.get("tools").unwrap().reachable);
    assert!(report.get("agent").unwrap().reachable);

    let (summary, exit_code) = aggregate(&report, &ConfigCheckResult::default(), None);
    assert_eq!(exit_code, 0, "summary:\n{}", summary);
}

#[tokio::test]
async fn test_single_unreachable_service_fails_verdict() {
    let tools = common::serve(healthy()).await;

    let registry = ServiceRegistry::from_descriptors([
        ServiceDescriptor::new("tools", &tools, "/health").unwrap(),
        ServiceDescriptor::new("agent", &common::dead_address(), "/health").unwrap(),
    ])
    .unwrap();

    let report = ReadinessWalker::new(prober()).walk(&registry).await;
    let verdict = ReportAggregator::new(ExitPolicy::ReadinessOnly, &report).finish();

    assert_eq!(verdict.exit_code, 1);
    assert!(verdict.actions[0].contains("agent"));
}
