//! Combines every stage into one verdict and exit code

use colored::Colorize;

use crate::flow::FlowOutcome;
use crate::health::reporter::{format_details, format_table, format_verdict};
use crate::health::{CheckResult, CheckStatus, ReadinessReport};
use crate::preflight::ConfigCheckResult;
use crate::sample_data::LoadOutcome;

/// What a command requires for a zero exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Every probed service reachable
    ReadinessOnly,
    /// Every probed service reachable and nothing missing from configuration
    ReadinessAndConfig,
}

/// Final decision for a command
#[derive(Debug, Clone)]
pub struct Verdict {
    pub exit_code: i32,
    pub summary_text: String,
    pub rows: Vec<CheckResult>,
    /// Corrective actions for the operator, empty on success
    pub actions: Vec<String>,
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Collects stage results and renders the verdict
pub struct ReportAggregator<'a> {
    policy: ExitPolicy,
    readiness: &'a ReadinessReport,
    config: Option<&'a ConfigCheckResult>,
    load: Option<&'a LoadOutcome>,
    flow: Option<&'a FlowOutcome>,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(policy: ExitPolicy, readiness: &'a ReadinessReport) -> Self {
        Self {
            policy,
            readiness,
            config: None,
            load: None,
            flow: None,
        }
    }

    pub fn config(mut self, config: &'a ConfigCheckResult) -> Self {
        self.config = Some(config);
        self
    }

    pub fn load(mut self, load: Option<&'a LoadOutcome>) -> Self {
        self.load = load;
        self
    }

    pub fn flow(mut self, flow: &'a FlowOutcome) -> Self {
        self.flow = Some(flow);
        self
    }

    pub fn finish(self) -> Verdict {
        let mut rows = self.readiness.rows();
        if let Some(config) = self.config {
            rows.extend(config.rows());
        }
        if let Some(load) = self.load {
            rows.push(load.row());
        }
        if let Some(flow) = self.flow {
            rows.extend(flow.rows());
        }

        let services_ready = self.readiness.all_reachable();
        let config_complete = self.config.is_none_or(|c| c.is_complete());

        let success = match self.policy {
            ExitPolicy::ReadinessOnly => services_ready,
            ExitPolicy::ReadinessAndConfig => services_ready && config_complete,
        };

        let mut actions = Vec::new();
        if !services_ready {
            actions.push(format!(
                "start missing services: {}",
                self.readiness.unreachable().join(", ")
            ));
        }
        if let Some(config) = self.config {
            if !config.missing.is_empty() {
                let keys: Vec<&str> = config.missing.keys().map(String::as_str).collect();
                actions.push(format!("set missing environment keys: {}", keys.join(", ")));
            }
            if !config.missing_artifacts.is_empty() {
                let names: Vec<&str> =
                    config.missing_artifacts.keys().map(String::as_str).collect();
                actions.push(format!("provide missing artifacts: {}", names.join(", ")));
            }
        }

        let summary_text = self.render(&rows, success, &actions);

        Verdict {
            exit_code: if success { 0 } else { 1 },
            summary_text,
            rows,
            actions,
        }
    }

    fn render(&self, rows: &[CheckResult], success: bool, actions: &[String]) -> String {
        let mut output = format_table(rows);
        output.push('\n');
        output.push_str(&format_details(rows));

        output.push_str(&format!("\n{}\n", "Summary".bold().underline()));
        let reachable = self.readiness.iter().filter(|r| r.reachable).count();
        output.push_str(&format!(
            "  Services reachable: {}/{}\n",
            reachable,
            self.readiness.len()
        ));

        if let Some(config) = self.config {
            output.push_str(&format!(
                "  Environment keys missing: {}\n",
                config.missing.len()
            ));
            output.push_str(&format!(
                "  Artifacts missing: {}\n",
                config.missing_artifacts.len()
            ));
        }
        if let Some(load) = self.load {
            output.push_str(&format!(
                "  Sample data: {} of {} rows committed\n",
                load.committed, load.attempted
            ));
        }

        let warnings = rows
            .iter()
            .filter(|r| r.status == CheckStatus::Warn)
            .count();
        if warnings > 0 {
            output.push_str(&format!("  {} Warnings: {}\n", "⚠".yellow(), warnings));
        }

        output.push('\n');
        let label = match (success, warnings > 0) {
            (true, false) => "Overall: READY",
            (true, true) => "Overall: READY (with warnings)",
            (false, _) => "Overall: NOT READY",
        };
        output.push_str(&format!("  {}\n", format_verdict(success, label)));

        for action in actions {
            output.push_str(&format!("  → {}\n", action));
        }

        output
    }
}

/// Aggregates readiness, configuration and an optional load outcome
///
/// The exit code follows readiness alone; configuration and load problems are
/// surfaced as warnings.
pub fn aggregate(
    readiness: &ReadinessReport,
    config: &ConfigCheckResult,
    load: Option<&LoadOutcome>,
) -> (String, i32) {
    let verdict = ReportAggregator::new(ExitPolicy::ReadinessOnly, readiness)
        .config(config)
        .load(load)
        .finish();
    (verdict.summary_text, verdict.exit_code)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use indexmap::IndexMap;

    use super::*;
    use crate::health::ProbeResult;
    use crate::registry::ServiceDescriptor;

    fn probe(name: &str, reachable: bool) -> ProbeResult {
        ProbeResult {
            service: ServiceDescriptor::new(name, "http://localhost:9", "/health").unwrap(),
            reachable,
            status_code: reachable.then_some(200),
            error: (!reachable).then(|| "connection refused".to_string()),
            elapsed: Duration::ZERO,
        }
    }

    fn report(flags: &[bool]) -> ReadinessReport {
        flags
            .iter()
            .enumerate()
            .map(|(i, reachable)| probe(&format!("svc{}", i), *reachable))
            .collect()
    }

    fn missing_groq() -> ConfigCheckResult {
        let mut missing = IndexMap::new();
        missing.insert("GROQ_API_KEY".to_string(), "groq".to_string());
        ConfigCheckResult {
            missing,
            ..ConfigCheckResult::default()
        }
    }

    #[test]
    fn exit_code_zero_iff_all_reachable() {
        let config = ConfigCheckResult::default();
        assert_eq!(aggregate(&report(&[true, true, true]), &config, None).1, 0);

        for flipped in 0..3 {
            let mut flags = [true, true, true];
            flags[flipped] = false;
            assert_ne!(aggregate(&report(&flags), &config, None).1, 0);
        }
    }

    #[test]
    fn config_problems_do_not_flip_readiness_policy() {
        let (text, code) = aggregate(&report(&[true, true]), &missing_groq(), None);
        assert_eq!(code, 0);
        assert!(text.contains("set missing environment keys: GROQ_API_KEY"));
    }

    #[test]
    fn strict_policy_requires_complete_config() {
        let readiness = report(&[true, true]);
        let config = missing_groq();
        let verdict = ReportAggregator::new(ExitPolicy::ReadinessAndConfig, &readiness)
            .config(&config)
            .finish();
        assert_eq!(verdict.exit_code, 1);

        let complete = ConfigCheckResult::default();
        let verdict = ReportAggregator::new(ExitPolicy::ReadinessAndConfig, &readiness)
            .config(&complete)
            .finish();
        assert!(verdict.is_success());
    }

    #[test]
    fn failed_load_is_a_warning_only() {
        let load = LoadOutcome {
            attempted: 0,
            committed: 0,
            error: Some("dataset not found".to_string()),
        };
        let (text, code) = aggregate(
            &report(&[true]),
            &ConfigCheckResult::default(),
            Some(&load),
        );
        assert_eq!(code, 0);
        assert!(text.contains("0 of 0 rows committed"));
    }

    #[test]
    fn unreachable_services_name_corrective_action() {
        let verdict = ReportAggregator::new(ExitPolicy::ReadinessOnly, &report(&[true, false]))
            .finish();
        assert_eq!(verdict.actions, vec!["start missing services: svc1".to_string()]);
        assert!(verdict.summary_text.contains("NOT READY"));
    }
}
