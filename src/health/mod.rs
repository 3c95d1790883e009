//! Service health probing and readiness reporting
//!
//! This module determines whether each service in the fleet answers its
//! health endpoint, useful for:
//! - Gating a voice-pipeline launch on its dependencies
//! - CI/CD smoke checks against a deployed stack
//! - Debugging which service in a chain is down
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use float_harness::health::{HealthProber, ReadinessWalker};
//! use float_harness::registry::{ServiceDescriptor, ServiceRegistry};
//!
//! # async fn demo() -> float_harness::error::Result<()> {
//! let registry = ServiceRegistry::from_descriptors([
//!     ServiceDescriptor::new("mcp_server", "http://localhost:8000", "/health")?,
//!     ServiceDescriptor::new("agent", "http://localhost:8001", "/health")?,
//! ])?;
//!
//! let walker = ReadinessWalker::new(HealthProber::new(Duration::from_secs(2))?);
//! let report = walker.walk(&registry).await;
//!
//! if report.all_reachable() {
//!     println!("All services reachable!");
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod probe;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus};
pub use probe::{HealthProber, ProbeResult};
pub use runner::{ReadinessReport, ReadinessWalker};
