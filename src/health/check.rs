//! Report row types shared by every verification stage

use std::time::Duration;

/// Status of a single verified item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Item verified
    Pass,
    /// Item has a problem that does not affect the verdict
    Warn,
    /// Item failed verification
    Fail,
    /// Item was not attempted because a precondition did not hold
    Skip,
}

impl CheckStatus {
    /// Returns true unless the item failed
    pub fn is_ok(&self) -> bool {
        !self.is_fail()
    }

    /// Returns true if the item failed
    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => "PASS".green().to_string(),
            CheckStatus::Warn => "WARN".yellow().to_string(),
            CheckStatus::Fail => "FAIL".red().to_string(),
            CheckStatus::Skip => "SKIP".dimmed().to_string(),
        }
    }
}

/// One row of the readiness summary
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Which stage produced the row (readiness, config, load, flow)
    pub stage: &'static str,
    /// Name of the checked item
    pub name: String,
    pub status: CheckStatus,
    /// Brief message describing the result
    pub message: String,
    /// Optional detailed information
    pub details: Option<String>,
    /// How long the check took, when it was timed
    pub duration: Option<Duration>,
}

impl CheckResult {
    fn new(
        stage: &'static str,
        name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            name: name.into(),
            status,
            message: message.into(),
            details: None,
            duration: None,
        }
    }

    /// Creates a passing row
    pub fn pass(stage: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(stage, name, CheckStatus::Pass, message)
    }

    /// Creates a warning row
    pub fn warn(stage: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(stage, name, CheckStatus::Warn, message)
    }

    /// Creates a failing row
    pub fn fail(stage: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(stage, name, CheckStatus::Fail, message)
    }

    /// Creates a row for an item that was not attempted
    pub fn skip(stage: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(stage, name, CheckStatus::Skip, message)
    }

    /// Adds optional details to the row
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Sets the duration for this row
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}
