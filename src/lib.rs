//! Float Harness
//!
//! Readiness and integration verification for the float-chat service fleet:
//! health probing, configuration validation, sample data loading and an
//! end-to-end conversation test.

/// Report aggregation and exit codes
pub mod aggregate;

/// Build-time information (timestamp, target, compiler)
pub mod build_info;

/// Layered harness configuration
pub mod config;

pub mod error;

/// End-to-end conversational flow test
pub mod flow;

/// Service health probing and readiness reports
pub mod health;

/// Environment and artifact validation
pub mod preflight;

/// Static service descriptors
pub mod registry;

/// Transactional sample data loading
pub mod sample_data;

/// Tracing subscriber setup
pub mod telemetry;

pub use aggregate::{ExitPolicy, ReportAggregator, Verdict, aggregate};
pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
