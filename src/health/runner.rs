//! Readiness walker for orchestrating probes across the registry

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::info;

use super::check::CheckResult;
use super::probe::{HealthProber, ProbeResult};
use crate::registry::ServiceRegistry;

/// Ordered probe outcomes, one per registry entry, in registry order
#[derive(Debug, Clone, Default)]
pub struct ReadinessReport {
    results: IndexMap<String, ProbeResult>,
}

impl ReadinessReport {
    /// Records one probe outcome under its service name
    pub(crate) fn insert(&mut self, result: ProbeResult) {
        self.results.insert(result.service.name.clone(), result);
    }

    pub fn get(&self, service: &str) -> Option<&ProbeResult> {
        self.results.get(service)
    }

    /// Iterates results in registry order
    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.values()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns true if every probed service answered 200
    pub fn all_reachable(&self) -> bool {
        self.results.values().all(|r| r.reachable)
    }

    /// Returns true if every named service is present and reachable
    pub fn are_reachable(&self, services: &[&str]) -> bool {
        services
            .iter()
            .all(|name| self.get(name).is_some_and(|r| r.reachable))
    }

    /// Names of services that did not answer 200, in registry order
    pub fn unreachable(&self) -> Vec<&str> {
        self.results
            .values()
            .filter(|r| !r.reachable)
            .map(|r| r.service.name.as_str())
            .collect()
    }

    /// Per-service reachability flags, in registry order
    pub fn pass_map(&self) -> IndexMap<String, bool> {
        self.results
            .iter()
            .map(|(name, r)| (name.clone(), r.reachable))
            .collect()
    }

    /// Converts the report into summary rows
    pub fn rows(&self) -> Vec<CheckResult> {
        self.results
            .values()
            .map(|r| {
                let row = if r.reachable {
                    CheckResult::pass("readiness", &r.service.name, r.describe())
                } else {
                    CheckResult::fail("readiness", &r.service.name, r.describe())
                };
                row.with_duration(r.elapsed)
                    .with_details(format!("  GET {}", r.service.health_url()))
            })
            .collect()
    }
}

impl FromIterator<ProbeResult> for ReadinessReport {
    fn from_iter<I: IntoIterator<Item = ProbeResult>>(iter: I) -> Self {
        let mut report = Self::default();
        for result in iter {
            report.insert(result);
        }
        report
    }
}

/// Probes every registry entry and collects a [`ReadinessReport`]
pub struct ReadinessWalker {
    prober: HealthProber,
}

impl ReadinessWalker {
    pub fn new(prober: HealthProber) -> Self {
        Self { prober }
    }

    /// Probes services one at a time, in registry order, never short-circuiting
    pub async fn walk(&self, registry: &ServiceRegistry) -> ReadinessReport {
        let mut report = ReadinessReport::default();

        for descriptor in registry.iter() {
            let result = self.prober.probe(descriptor).await;
            info!(
                service = %descriptor.name,
                reachable = result.reachable,
                "service probed"
            );
            report.insert(result);
        }

        report
    }

    /// Probes all services at once; the report keeps registry order
    pub async fn walk_concurrent(&self, registry: &ServiceRegistry) -> ReadinessReport {
        let probes = registry.iter().map(|d| self.prober.probe(d));
        join_all(probes).await.into_iter().collect()
    }
}
