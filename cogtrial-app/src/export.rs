//! JSON export of a finished session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cogtrial_core::{SessionContext, TaskKind, TrialDefinition, TrialResult};
use cogtrial_stats::TaskSummary;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    pub session: SessionContext,
    pub task: TaskKind,
    pub practice: Vec<TrialResult<TrialDefinition>>,
    pub results: Vec<TrialResult<TrialDefinition>>,
    pub practice_summary: Option<TaskSummary>,
    pub summary: TaskSummary,
}

impl SessionExport {
    pub fn new(
        session: SessionContext,
        task: TaskKind,
        main: &[TrialResult<TrialDefinition>],
        practice: &[TrialResult<TrialDefinition>],
    ) -> Self {
        Self {
            session,
            task,
            practice: practice.to_vec(),
            results: main.to_vec(),
            practice_summary: (!practice.is_empty())
                .then(|| TaskSummary::compute(task, practice)),
            summary: TaskSummary::compute(task, main),
        }
    }

    /// Writes the export to `path`. If that fails, retries under the
    /// system temp directory with the same file name and returns where
    /// the data actually landed.
    pub fn persist(&self, path: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self).context("serialising session export")?;
        match std::fs::write(path, &json) {
            Ok(()) => {
                info!(path = %path.display(), results = self.results.len(), "session exported");
                Ok(path.to_path_buf())
            }
            Err(err) => {
                let file_name = path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("cogtrial-session.json"));
                let fallback = std::env::temp_dir().join(file_name);
                warn!(
                    path = %path.display(),
                    fallback = %fallback.display(),
                    %err,
                    "export failed, writing to temp dir"
                );
                std::fs::write(&fallback, &json)
                    .with_context(|| format!("writing {}", fallback.display()))?;
                Ok(fallback)
            }
        }
    }
}
