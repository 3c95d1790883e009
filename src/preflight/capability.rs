//! Read-only artifact and capability checks

use std::path::{Path, PathBuf};

/// A required artifact or installed component
///
/// Implementations must not mutate anything; they only observe.
pub trait CapabilityCheck: Send + Sync {
    /// Name shown in the report
    fn name(&self) -> String;

    /// What the artifact is needed for
    fn description(&self) -> String;

    /// Returns true if the artifact is present and usable
    fn is_available(&self) -> bool;
}

/// A file that must exist
#[derive(Debug, Clone)]
pub struct FileArtifact {
    path: PathBuf,
    description: String,
}

impl FileArtifact {
    pub fn new(path: impl Into<PathBuf>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }
}

impl CapabilityCheck for FileArtifact {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }
}

/// An executable that must be found on `PATH`
#[derive(Debug, Clone)]
pub struct ExecutableOnPath {
    program: String,
    description: String,
    search_path: Option<std::ffi::OsString>,
}

impl ExecutableOnPath {
    pub fn new(program: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            description: description.into(),
            search_path: None,
        }
    }

    /// Searches `search_path` instead of the process `PATH`
    pub fn with_search_path(mut self, search_path: impl Into<std::ffi::OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    fn locate(&self) -> Option<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))?;

        std::env::split_paths(&search_path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| is_executable(candidate))
    }
}

impl CapabilityCheck for ExecutableOnPath {
    fn name(&self) -> String {
        self.program.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn is_available(&self) -> bool {
        self.locate().is_some()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
