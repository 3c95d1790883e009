//! Scripted conversation against the agent and tool server

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::schema::{
    ChatRequest, ChatResponse, InitializeResponse, MetadataStats, ToolDescriptions,
};
use crate::config::TimeoutConfig;
use crate::error::{HarnessError, Result};
use crate::health::{CheckResult, ReadinessReport};
use crate::registry::{AGENT_SERVICE, ServiceDescriptor, ServiceRegistry, TOOLS_SERVICE};

/// Queries sent to the agent, in order
pub const SAMPLE_QUERIES: &[&str] = &[
    "What is the average temperature in the Arabian Sea?",
    "Show me salinity profiles near the equator in 2023",
    "Which floats are active in the Bay of Bengal?",
];

/// Services that must be reachable before the flow is attempted
pub const FLOW_DEPENDENCIES: &[&str] = &[TOOLS_SERVICE, AGENT_SERVICE];

const PREVIEW_CHARS: usize = 100;

/// One query/response exchange
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    pub metadata: Map<String, Value>,
    pub follow_up_suggestions: Vec<String>,
}

/// Outcome of one HTTP interaction in the flow
#[derive(Debug, Clone)]
pub struct FlowStep {
    pub name: String,
    pub succeeded: bool,
    pub detail: String,
    pub elapsed: Duration,
}

impl FlowStep {
    fn ok(name: impl Into<String>, detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            detail: detail.into(),
            elapsed,
        }
    }

    fn failed(name: impl Into<String>, detail: impl Into<String>, elapsed: Duration) -> Self {
        let step = Self {
            name: name.into(),
            succeeded: false,
            detail: detail.into(),
            elapsed,
        };
        warn!(step = %step.name, detail = %step.detail, "flow step failed");
        step
    }

    /// Flow steps are diagnostic: failures show as warnings
    pub fn row(&self) -> CheckResult {
        let row = if self.succeeded {
            CheckResult::pass("flow", &self.name, &self.detail)
        } else {
            CheckResult::warn("flow", &self.name, &self.detail)
        };
        row.with_duration(self.elapsed)
    }
}

/// Result of a completed flow
#[derive(Debug, Clone, Default)]
pub struct FlowSummary {
    /// Reachability of each probed service, in registry order
    pub per_service_pass: IndexMap<String, bool>,
    /// True iff every entry of `per_service_pass` is true
    pub overall_pass: bool,
    pub steps: Vec<FlowStep>,
    pub turns: Vec<ConversationTurn>,
    pub tool_count: Option<usize>,
    pub total_embeddings: Option<u64>,
}

impl FlowSummary {
    pub fn rows(&self) -> Vec<CheckResult> {
        self.steps.iter().map(FlowStep::row).collect()
    }
}

/// Whether the flow ran
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// Dependencies were unreachable; nothing was attempted
    Skipped { unreachable: Vec<String> },
    Completed(FlowSummary),
}

impl FlowOutcome {
    pub fn rows(&self) -> Vec<CheckResult> {
        match self {
            FlowOutcome::Skipped { unreachable } => vec![CheckResult::skip(
                "flow",
                "end-to-end",
                format!("not attempted, unreachable: {}", unreachable.join(", ")),
            )],
            FlowOutcome::Completed(summary) => summary.rows(),
        }
    }
}

/// Drives the scripted conversation
pub struct FlowTester {
    client: reqwest::Client,
    agent: ServiceDescriptor,
    tools: ServiceDescriptor,
    timeouts: TimeoutConfig,
}

impl FlowTester {
    pub fn new(
        client: reqwest::Client,
        agent: ServiceDescriptor,
        tools: ServiceDescriptor,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            client,
            agent,
            tools,
            timeouts,
        }
    }

    /// Takes the agent and tool-server descriptors from `registry`
    pub fn from_registry(
        client: reqwest::Client,
        registry: &ServiceRegistry,
        timeouts: TimeoutConfig,
    ) -> Result<Self> {
        let lookup = |name: &str| {
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| HarnessError::FatalSetup(format!("service '{}' not registered", name)))
        };
        Ok(Self::new(
            client,
            lookup(AGENT_SERVICE)?,
            lookup(TOOLS_SERVICE)?,
            timeouts,
        ))
    }

    /// Runs the flow only if its dependencies were reported reachable
    pub async fn run_gated(&self, readiness: &ReadinessReport, session_id: &str) -> FlowOutcome {
        if !readiness.are_reachable(FLOW_DEPENDENCIES) {
            let unreachable: Vec<String> = FLOW_DEPENDENCIES
                .iter()
                .filter(|name| !readiness.get(name).is_some_and(|r| r.reachable))
                .map(|name| name.to_string())
                .collect();
            info!(?unreachable, "skipping end-to-end flow");
            return FlowOutcome::Skipped { unreachable };
        }
        FlowOutcome::Completed(self.run_flow(readiness, session_id).await)
    }

    /// Runs every flow step; step failures never stop later steps
    pub async fn run_flow(&self, readiness: &ReadinessReport, session_id: &str) -> FlowSummary {
        let per_service_pass = readiness.pass_map();
        let overall_pass = per_service_pass.values().all(|pass| *pass);

        let mut summary = FlowSummary {
            per_service_pass,
            overall_pass,
            ..FlowSummary::default()
        };

        info!(session_id, "starting end-to-end flow");
        summary.steps.push(self.initialize().await);

        for query in SAMPLE_QUERIES {
            let (step, turn) = self.chat(session_id, query).await;
            summary.steps.push(step);
            summary.turns.extend(turn);
        }

        let (step, tool_count) = self.list_tools().await;
        summary.steps.push(step);
        summary.tool_count = tool_count;

        let (step, total_embeddings) = self.stats().await;
        summary.steps.push(step);
        summary.total_embeddings = total_embeddings;

        summary
    }

    /// `POST /agent/initialize`
    pub async fn initialize(&self) -> FlowStep {
        let start = Instant::now();
        let url = self.agent.endpoint("/agent/initialize");
        let request = self.client.post(&url).timeout(self.timeouts.initialize());

        match fetch_json::<InitializeResponse>(request).await {
            Ok(reply) => {
                let message = reply.message.unwrap_or_else(|| "initialized".to_string());
                info!(%message, "agent initialized");
                FlowStep::ok("initialize", message, start.elapsed())
            }
            Err(e) => FlowStep::failed("initialize", e, start.elapsed()),
        }
    }

    /// `POST /agent/chat` for one query
    pub async fn chat(&self, session_id: &str, query: &str) -> (FlowStep, Option<ConversationTurn>) {
        let start = Instant::now();
        let url = self.agent.endpoint("/agent/chat");
        let request = self
            .client
            .post(&url)
            .timeout(self.timeouts.chat())
            .json(&ChatRequest {
                message: query,
                session_id,
            });
        let step_name = format!("chat: {}", preview(query, 40));

        let reply = match fetch_json::<ChatResponse>(request).await {
            Ok(reply) => reply,
            Err(e) => return (FlowStep::failed(step_name, e, start.elapsed()), None),
        };
        let elapsed = start.elapsed();

        let voice_compatible = reply.voice_compatible();
        let suggestions = reply.follow_up_suggestions.unwrap_or_default();
        let metadata = reply.metadata.map(|m| m.into_map()).unwrap_or_default();

        let Some(response) = reply.response else {
            let turn = ConversationTurn {
                query: query.to_string(),
                response: String::new(),
                metadata,
                follow_up_suggestions: suggestions,
            };
            return (
                FlowStep::failed(step_name, "no response", elapsed),
                Some(turn),
            );
        };

        info!(
            query,
            response = %preview(&response, PREVIEW_CHARS),
            suggestions = suggestions.len(),
            voice_compatible = ?voice_compatible,
            "chat turn completed"
        );

        let mut detail = format!("{} chars", response.chars().count());
        if !suggestions.is_empty() {
            detail.push_str(&format!(", {} follow-ups", suggestions.len()));
        }
        if let Some(flag) = voice_compatible {
            detail.push_str(&format!(", voice compatible: {}", flag));
        }

        let turn = ConversationTurn {
            query: query.to_string(),
            response,
            metadata,
            follow_up_suggestions: suggestions,
        };
        (FlowStep::ok(step_name, detail, elapsed), Some(turn))
    }

    /// `GET /mcp/tools/descriptions`
    pub async fn list_tools(&self) -> (FlowStep, Option<usize>) {
        let start = Instant::now();
        let url = self.tools.endpoint("/mcp/tools/descriptions");
        let request = self.client.get(&url).timeout(self.timeouts.chat());

        match fetch_json::<ToolDescriptions>(request).await {
            Ok(ToolDescriptions { tools: Some(tools) }) => {
                let names: Vec<&str> = tools.iter().filter_map(|t| t.name.as_deref()).collect();
                info!(count = tools.len(), ?names, "tool listing received");
                (
                    FlowStep::ok("tools", format!("{} tools available", tools.len()), start.elapsed()),
                    Some(tools.len()),
                )
            }
            Ok(ToolDescriptions { tools: None }) => (
                FlowStep::failed("tools", "no tools field in listing", start.elapsed()),
                None,
            ),
            Err(e) => (FlowStep::failed("tools", e, start.elapsed()), None),
        }
    }

    /// `GET /metadata/stats`
    pub async fn stats(&self) -> (FlowStep, Option<u64>) {
        let start = Instant::now();
        let url = self.tools.endpoint("/metadata/stats");
        let request = self.client.get(&url).timeout(self.timeouts.chat());

        match fetch_json::<MetadataStats>(request).await {
            Ok(MetadataStats {
                total_embeddings: Some(total),
            }) => {
                info!(total_embeddings = total, "metadata stats received");
                (
                    FlowStep::ok("stats", format!("{} embeddings", total), start.elapsed()),
                    Some(total),
                )
            }
            Ok(MetadataStats {
                total_embeddings: None,
            }) => (
                FlowStep::failed("stats", "no total_embeddings field", start.elapsed()),
                None,
            ),
            Err(e) => (FlowStep::failed("stats", e, start.elapsed()), None),
        }
    }
}

/// Sends a request and decodes a JSON reply, folding every failure into a message
async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> std::result::Result<T, String> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            "timed out".to_string()
        } else {
            format!("request failed: {}", e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("malformed reply: {}", e))
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("température", 4), "temp...");
        assert_eq!(preview("ñññññ", 2), "ññ...");
    }

    #[test]
    fn skipped_outcome_names_unreachable_services() {
        let outcome = FlowOutcome::Skipped {
            unreachable: vec!["agent".to_string()],
        };
        let rows = outcome.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].message.contains("agent"));
        assert!(!rows[0].status.is_fail());
    }
}
