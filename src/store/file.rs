//! File-backed [`SubmissionStore`].
//!
//! All records live in one snapshot file rewritten after every mutation.
//! Supports both JSON (human-readable) and bincode (compact binary) formats,
//! chosen by file extension.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{EvaluatorError, Result};
use crate::submission::{Assignment, AssignmentId, EvaluationResult, Submission, SubmissionId};

use super::{StoreState, SubmissionStore};

/// Save format for store snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json, // Default to JSON
        }
    }

    fn encode(self, state: &StoreState) -> Result<Vec<u8>> {
        match self {
            SaveFormat::Json => serde_json::to_vec_pretty(state)
                .map_err(|e| EvaluatorError::Serialization(e.to_string())),
            SaveFormat::Bincode => {
                bincode::serde::encode_to_vec(state, bincode::config::standard())
                    .map_err(|e| EvaluatorError::Serialization(e.to_string()))
            }
        }
    }

    fn decode(self, data: &[u8]) -> Result<StoreState> {
        match self {
            SaveFormat::Json => serde_json::from_slice(data)
                .map_err(|e| EvaluatorError::Serialization(e.to_string())),
            SaveFormat::Bincode => {
                let (state, _): (StoreState, usize) =
                    bincode::serde::decode_from_slice(data, bincode::config::standard())
                        .map_err(|e| EvaluatorError::Serialization(e.to_string()))?;
                Ok(state)
            }
        }
    }
}

/// Store persisting a snapshot of all records to a single file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    format: SaveFormat,
    state: Mutex<StoreState>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = SaveFormat::from_path(&path);
        let state = load_state(&path, format)?;

        Ok(Self {
            path,
            format,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state, persist it, then publish it.
    ///
    /// If the change or the write fails, the in-memory state is untouched.
    async fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState) -> Result<()>,
    {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        change(&mut next)?;
        self.write(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn write(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| EvaluatorError::io(parent, e))?;
            }
        }

        let data = self.format.encode(state)?;

        // Write next to the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| EvaluatorError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| EvaluatorError::io(&self.path, e))?;

        Ok(())
    }
}

fn load_state(path: &Path, format: SaveFormat) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::default());
    }
    let data = fs::read(path).map_err(|e| EvaluatorError::io(path, e))?;
    format.decode(&data)
}

#[async_trait]
impl SubmissionStore for FileStore {
    async fn insert_assignment(&self, assignment: Assignment) -> Result<()> {
        self.mutate(|state| state.insert_assignment(assignment)).await
    }

    async fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>> {
        Ok(self.state.lock().await.assignments.get(id).cloned())
    }

    async fn assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.state.lock().await.assignments_newest_first())
    }

    async fn insert_submission(&self, submission: Submission) -> Result<()> {
        self.mutate(|state| state.insert_submission(submission)).await
    }

    async fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        Ok(self.state.lock().await.submissions.get(id).cloned())
    }

    async fn submissions_for_assignment(&self, id: &AssignmentId) -> Result<Vec<Submission>> {
        Ok(self.state.lock().await.submissions_for_assignment(id))
    }

    async fn evaluated_contents(
        &self,
        assignment: &AssignmentId,
        excluding: &SubmissionId,
    ) -> Result<Vec<String>> {
        Ok(self
            .state
            .lock()
            .await
            .evaluated_contents(assignment, excluding))
    }

    async fn pending_submissions(&self) -> Result<Vec<SubmissionId>> {
        Ok(self.state.lock().await.pending_submissions())
    }

    async fn complete_evaluation(&self, result: EvaluationResult) -> Result<()> {
        self.mutate(|state| state.complete_evaluation(result)).await
    }

    async fn mark_failed(&self, id: &SubmissionId) -> Result<()> {
        self.mutate(|state| state.mark_failed(id)).await
    }

    async fn evaluation(&self, id: &SubmissionId) -> Result<Option<EvaluationResult>> {
        Ok(self.state.lock().await.evaluations.get(id).cloned())
    }
}
