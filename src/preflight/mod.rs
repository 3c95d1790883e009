//! Configuration and environment validation
//!
//! Checks that the credential catalog is set and that required artifacts
//! exist, without mutating anything. Sensitive values are only ever shown
//! masked. Validation never aborts: it reports what is missing.

pub mod capability;
pub mod mask;
pub mod requirements;

pub use capability::{CapabilityCheck, ExecutableOnPath, FileArtifact};
pub use mask::mask_secret;
pub use requirements::{ConfigRequirement, EnvSource, ProcessEnv, default_requirements};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::HarnessConfig;
use crate::health::CheckResult;

/// Diagnostic view of one checked requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementStatus {
    pub key: String,
    pub present: bool,
    /// Value as it may be displayed: masked when sensitive, `None` when absent
    pub display: Option<String>,
}

/// What the validator found missing
#[derive(Debug, Clone, Default)]
pub struct ConfigCheckResult {
    /// Missing requirement key mapped to its description, in catalog order
    pub missing: IndexMap<String, String>,
    /// Missing artifact name mapped to its description
    pub missing_artifacts: IndexMap<String, String>,
    /// Every requirement with its displayable value
    pub statuses: Vec<RequirementStatus>,
    /// Number of artifacts checked
    pub artifacts_checked: usize,
}

impl ConfigCheckResult {
    /// Returns true if nothing is missing
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.missing_artifacts.is_empty()
    }

    /// Converts the result into summary rows
    pub fn rows(&self) -> Vec<CheckResult> {
        let mut rows = Vec::new();

        for status in &self.statuses {
            let row = match (&status.display, self.missing.get(&status.key)) {
                (Some(display), _) => CheckResult::pass("config", &status.key, display.clone()),
                (None, Some(description)) => {
                    CheckResult::warn("config", &status.key, format!("not set ({})", description))
                }
                (None, None) => CheckResult::warn("config", &status.key, "not set"),
            };
            rows.push(row);
        }

        for (name, description) in &self.missing_artifacts {
            rows.push(CheckResult::warn(
                "artifact",
                name,
                format!("missing ({})", description),
            ));
        }

        let found = self.artifacts_checked - self.missing_artifacts.len();
        if found > 0 {
            rows.push(CheckResult::pass(
                "artifact",
                "artifacts",
                format!("{} of {} present", found, self.artifacts_checked),
            ));
        }

        rows
    }
}

/// Validates environment keys and artifacts
///
/// A requirement counts as present only when the lookup yields a non-empty
/// value. Artifacts are checked through [`CapabilityCheck`] and never
/// modified.
pub fn validate(
    requirements: &[ConfigRequirement],
    env: &dyn EnvSource,
    artifacts: &[Box<dyn CapabilityCheck>],
) -> ConfigCheckResult {
    let mut result = ConfigCheckResult::default();

    for requirement in requirements {
        let value = env.get(&requirement.key).filter(|v| !v.is_empty());

        let display = value.as_deref().map(|v| {
            if requirement.sensitive {
                mask_secret(v)
            } else {
                v.to_string()
            }
        });

        match &display {
            Some(shown) => debug!(key = %requirement.key, value = %shown, "requirement set"),
            None => {
                warn!(key = %requirement.key, "required environment key missing");
                result
                    .missing
                    .insert(requirement.key.clone(), requirement.description.clone());
            }
        }

        result.statuses.push(RequirementStatus {
            key: requirement.key.clone(),
            present: display.is_some(),
            display,
        });
    }

    for artifact in artifacts {
        result.artifacts_checked += 1;
        if !artifact.is_available() {
            warn!(artifact = %artifact.name(), "required artifact missing");
            result
                .missing_artifacts
                .insert(artifact.name(), artifact.description());
        }
    }

    result
}

/// Artifacts the fleet needs on the local host
///
/// The sample dataset file, then every configured tool in order.
pub fn default_artifacts(config: &HarnessConfig) -> Vec<Box<dyn CapabilityCheck>> {
    let mut artifacts: Vec<Box<dyn CapabilityCheck>> = vec![Box::new(FileArtifact::new(
        &config.sample_data.dataset_path,
        "sample float dataset",
    ))];
    artifacts.extend(config.preflight.required_tools.iter().map(|tool| {
        Box::new(ExecutableOnPath::new(tool, "required tool on PATH")) as Box<dyn CapabilityCheck>
    }));
    artifacts
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Always(bool);

    impl CapabilityCheck for Always {
        fn name(&self) -> String {
            format!("always-{}", self.0)
        }
        fn description(&self) -> String {
            "fixed".to_string()
        }
        fn is_available(&self) -> bool {
            self.0
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_is_exactly_the_absent_or_empty_keys() {
        let requirements = vec![
            ConfigRequirement::new("A", "first", false),
            ConfigRequirement::new("B", "second", true),
            ConfigRequirement::new("C", "third", false),
        ];
        let env = env(&[("A", "set"), ("C", "")]);

        let result = validate(&requirements, &env, &[]);

        let missing: Vec<_> = result.missing.keys().cloned().collect();
        assert_eq!(missing, ["B", "C"]);
        assert_eq!(result.missing["B"], "second");
        assert!(!result.is_complete());
    }

    #[test]
    fn unset_groq_key_is_reported_and_never_shown() {
        let result = validate(&default_requirements(), &env(&[]), &[]);

        assert!(result.missing.contains_key("GROQ_API_KEY"));
        let status = result
            .statuses
            .iter()
            .find(|s| s.key == "GROQ_API_KEY")
            .unwrap();
        assert!(!status.present);
        assert_eq!(status.display, None);
    }

    #[test]
    fn sensitive_values_are_masked() {
        let secret = "gsk_live_0123456789abcdef";
        let requirements = vec![ConfigRequirement::new("GROQ_API_KEY", "groq", true)];
        let result = validate(&requirements, &env(&[("GROQ_API_KEY", secret)]), &[]);

        assert!(result.is_complete());
        let shown = result.statuses[0].display.clone().unwrap();
        assert_ne!(shown, secret);
        assert!(!shown.contains("0123456789"));

        for row in result.rows() {
            assert!(!row.message.contains(secret));
        }
    }

    #[test]
    fn plain_values_are_shown_verbatim() {
        let requirements = vec![ConfigRequirement::new("LIVEKIT_URL", "livekit", false)];
        let result = validate(&requirements, &env(&[("LIVEKIT_URL", "wss://lk.local")]), &[]);
        assert_eq!(result.statuses[0].display.as_deref(), Some("wss://lk.local"));
    }

    #[test]
    fn missing_artifacts_are_collected() {
        let artifacts: Vec<Box<dyn CapabilityCheck>> =
            vec![Box::new(Always(true)), Box::new(Always(false))];
        let result = validate(&[], &env(&[]), &artifacts);

        assert_eq!(result.artifacts_checked, 2);
        assert_eq!(result.missing_artifacts.len(), 1);
        assert!(result.missing_artifacts.contains_key("always-false"));
        assert!(result.missing.is_empty());
        assert!(!result.is_complete());
    }

    #[test]
    fn configured_tools_are_checked_on_path() {
        let mut config = HarnessConfig::default();
        config.sample_data.dataset_path = "/definitely/not/here.parquet".into();
        config.preflight.required_tools = vec!["float-harness-no-such-tool".to_string()];

        let artifacts = default_artifacts(&config);
        let names: Vec<_> = artifacts.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            ["/definitely/not/here.parquet", "float-harness-no-such-tool"]
        );

        let result = validate(&[], &env(&[]), &artifacts);
        assert_eq!(result.artifacts_checked, 2);
        assert!(result.missing_artifacts.contains_key("float-harness-no-such-tool"));
    }
}
