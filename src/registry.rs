//! Service descriptor registry
//!
//! The static, ordered list of services the harness verifies. Order matters:
//! it is the order probes run in and the order the report is printed in.

use serde::Serialize;
use url::Url;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// Name of the tool server entry
pub const TOOLS_SERVICE: &str = "mcp_server";
/// Name of the conversational agent entry
pub const AGENT_SERVICE: &str = "agent";
/// Name of the voice pipeline entry
pub const VOICE_SERVICE: &str = "voice_pipeline";
/// Name of the dashboard entry
pub const DASHBOARD_SERVICE: &str = "dashboard";

/// Static address and identity record for one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub base_address: Url,
    pub health_path: String,
}

impl ServiceDescriptor {
    /// Creates a descriptor, validating the base address
    pub fn new(
        name: impl Into<String>,
        base_address: &str,
        health_path: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let base_address = Url::parse(base_address).map_err(|source| {
            HarnessError::InvalidAddress {
                service: name.clone(),
                source,
            }
        })?;
        Ok(Self {
            name,
            base_address,
            health_path: health_path.into(),
        })
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        self.endpoint(&self.health_path)
    }

    /// Joins `path` onto the base address without dropping a base path prefix
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_address.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Ordered collection of service descriptors
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor; later entries are probed after earlier ones
    ///
    /// Names identify report entries, so a repeated name is rejected.
    pub fn with(mut self, descriptor: ServiceDescriptor) -> Result<Self> {
        if self.get(&descriptor.name).is_some() {
            return Err(HarnessError::DuplicateService(descriptor.name));
        }
        self.services.push(descriptor);
        Ok(self)
    }

    /// Builds a registry from descriptors in the given order
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<Self> {
        descriptors
            .into_iter()
            .try_fold(Self::new(), |registry, descriptor| registry.with(descriptor))
    }

    /// Builds the full fleet registry from configuration
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let services = &config.services;
        Self::from_descriptors([
            ServiceDescriptor::new(TOOLS_SERVICE, &services.tools_url, "/health")?,
            ServiceDescriptor::new(AGENT_SERVICE, &services.agent_url, "/health")?,
            ServiceDescriptor::new(VOICE_SERVICE, &services.voice_url, "/health")?,
            ServiceDescriptor::new(DASHBOARD_SERVICE, &services.dashboard_url, "/_dash-layout")?,
        ])
    }

    /// Services the end-to-end flow and the voice pipeline depend on
    pub fn flow_dependencies(config: &HarnessConfig) -> Result<Self> {
        let services = &config.services;
        Self::from_descriptors([
            ServiceDescriptor::new(TOOLS_SERVICE, &services.tools_url, "/health")?,
            ServiceDescriptor::new(AGENT_SERVICE, &services.agent_url, "/health")?,
        ])
    }

    /// Looks a descriptor up by name
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
