//! Harness configuration
//!
//! Supports multiple profiles (local, docker, ...) with different service
//! locations. Built once at startup and passed explicitly to every component.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::sample_data::DEFAULT_ROW_CAP;

/// Locations of the services the harness verifies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Tool server (MCP) base URL
    pub tools_url: String,
    /// Conversational agent base URL
    pub agent_url: String,
    /// Voice pipeline base URL
    pub voice_url: String,
    /// Dashboard base URL
    pub dashboard_url: String,
}

/// Per-call timeouts, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Health probe timeout
    pub probe_ms: u64,
    /// Agent initialization timeout
    pub initialize_ms: u64,
    /// Single chat turn timeout
    pub chat_ms: u64,
}

impl TimeoutConfig {
    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    pub fn initialize(&self) -> Duration {
        Duration::from_millis(self.initialize_ms)
    }

    pub fn chat(&self) -> Duration {
        Duration::from_millis(self.chat_ms)
    }
}

/// Sample data loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDataConfig {
    /// Parquet file holding float profiles
    pub dataset_path: PathBuf,
    /// Connection string for the relational store
    pub database_url: String,
    /// Maximum number of rows loaded per invocation
    pub row_cap: usize,
}

/// Host prerequisites checked by the config validator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreflightConfig {
    /// Executables that must be found on `PATH`
    #[serde(default)]
    pub required_tools: Vec<String>,
}

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// The active profile (local, docker, etc.)
    pub profile: String,
    pub services: ServicesConfig,
    pub timeouts: TimeoutConfig,
    pub sample_data: SampleDataConfig,
    #[serde(default)]
    pub preflight: PreflightConfig,
}

impl HarnessConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Sources are layered in the following order:
    /// 1. Built-in defaults
    /// 2. config/{profile}.toml (profile-specific overrides)
    /// 3. Environment variables with prefix HARNESS_ (e.g., HARNESS_SERVICES__AGENT_URL)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("services.tools_url", "http://localhost:8000")?
            .set_default("services.agent_url", "http://localhost:8001")?
            .set_default("services.voice_url", "http://localhost:8002")?
            .set_default("services.dashboard_url", "http://localhost:8050")?
            .set_default("timeouts.probe_ms", 2_000)?
            .set_default("timeouts.initialize_ms", 10_000)?
            .set_default("timeouts.chat_ms", 15_000)?
            .set_default("sample_data.dataset_path", "data/argo_sample.parquet")?
            .set_default("sample_data.database_url", "sqlite://data/argo.db")?
            .set_default("sample_data.row_cap", DEFAULT_ROW_CAP as i64)?
            .set_default("preflight.required_tools", Vec::<String>::new())?;

        // Profile file is optional
        let profile_path = match Self::find_config_dir() {
            Some(dir) => dir.join(profile),
            None => PathBuf::from(format!("config/{}", profile)),
        };
        builder = builder.add_source(File::from(profile_path.as_path()).required(false));

        // Use __ as separator for nested fields (e.g., HARNESS_TIMEOUTS__PROBE_MS);
        // HARNESS_PREFLIGHT__REQUIRED_TOOLS is comma separated
        builder = builder.add_source(
            Environment::with_prefix("HARNESS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("preflight.required_tools"),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Finds the config directory next to the executable, then in the working directory
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the HARNESS_PROFILE environment variable,
    /// defaulting to "local"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("HARNESS_PROFILE").unwrap_or_else(|_| "local".to_string());
        Self::load(&profile)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            profile: "local".to_string(),
            services: ServicesConfig {
                tools_url: "http://localhost:8000".to_string(),
                agent_url: "http://localhost:8001".to_string(),
                voice_url: "http://localhost:8002".to_string(),
                dashboard_url: "http://localhost:8050".to_string(),
            },
            timeouts: TimeoutConfig {
                probe_ms: 2_000,
                initialize_ms: 10_000,
                chat_ms: 15_000,
            },
            sample_data: SampleDataConfig {
                dataset_path: PathBuf::from("data/argo_sample.parquet"),
                database_url: "sqlite://data/argo.db".to_string(),
                row_cap: DEFAULT_ROW_CAP,
            },
            preflight: PreflightConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_profile_file() {
        let config = HarnessConfig::load("no-such-profile").expect("defaults should load");
        assert_eq!(config.profile, "no-such-profile");
        assert_eq!(config.timeouts.probe(), Duration::from_secs(2));
        assert_eq!(config.sample_data.row_cap, 100);
        assert!(config.preflight.required_tools.is_empty());
    }

    #[test]
    fn default_timeouts_match_flow_budgets() {
        let config = HarnessConfig::default();
        assert_eq!(config.timeouts.initialize(), Duration::from_secs(10));
        assert_eq!(config.timeouts.chat(), Duration::from_secs(15));
    }
}
