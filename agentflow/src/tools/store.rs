//! Report persistence collaborator.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Protocol for persisting finished reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Saves a report and returns its stored location.
    async fn save(&self, name: &str, content: &str) -> anyhow::Result<String>;
}

/// Stores reports as files under a root directory.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created on first save if it does not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn save(&self, name: &str, content: &str) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, content).await?;

        tracing::info!(path = %path.display(), bytes = content.len(), "report saved");
        Ok(path.display().to_string())
    }
}

/// A store that discards reports.
///
/// Used when persistence is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReportStore;

impl NullReportStore {
    /// Creates a new discarding store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportStore for NullReportStore {
    async fn save(&self, name: &str, _content: &str) -> anyhow::Result<String> {
        Ok(name.to_string())
    }
}
