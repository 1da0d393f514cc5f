//! Error types for the evaluator.

use std::path::PathBuf;
use thiserror::Error;

use crate::submission::{AssignmentId, SubmissionId, SubmissionStatus};

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvaluatorError>;

/// Errors that can occur while evaluating submissions.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input rejected before it reaches the evaluation core.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The assignment does not exist.
    #[error("Assignment '{0}' not found")]
    AssignmentNotFound(AssignmentId),

    /// The submission does not exist.
    #[error("Submission '{0}' not found")]
    SubmissionNotFound(SubmissionId),

    /// A status change that the submission lifecycle does not allow.
    #[error("Submission '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: SubmissionId,
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    /// The store refused or failed a read/write.
    #[error("Store error: {0}")]
    Store(String),

    /// The evaluation queue is closed.
    #[error("Evaluation queue is closed")]
    QueueClosed,

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// The LLM call did not finish in time.
    #[error("LLM request timed out after {0}s")]
    LlmTimeout(u64),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EvaluatorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the external evaluator rather than local state.
    pub fn is_evaluator_error(&self) -> bool {
        matches!(
            self,
            Self::LlmApi(_) | Self::LlmParse(_) | Self::LlmTimeout(_) | Self::Http(_)
        )
    }
}

impl From<reqwest::Error> for EvaluatorError {
    fn from(err: reqwest::Error) -> Self {
        EvaluatorError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for EvaluatorError {
    fn from(err: serde_json::Error) -> Self {
        EvaluatorError::LlmParse(err.to_string())
    }
}
