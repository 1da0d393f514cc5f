//! Assignment, submission and evaluation records.
//!
//! These are the records the evaluation core reads from and writes to the
//! store. A submission starts `pending` and ends either `evaluated` (with
//! exactly one [`EvaluationResult`]) or `failed` (with none).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{EvaluatorError, Result};
use crate::similarity::PlagiarismRisk;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = EvaluatorError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| EvaluatorError::InvalidInput(format!("bad id '{}': {}", s, e)))
            }
        }
    };
}

id_type!(
    /// Identifier of an assignment.
    AssignmentId
);
id_type!(
    /// Identifier of a submission. Also keys its evaluation result.
    SubmissionId
);

/// An assignment students submit against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    /// Used for keyword relevance and embedded in the evaluator prompt.
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Create an assignment; title and description are trimmed and required.
    pub fn new(title: &str, description: &str) -> Result<Self> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(EvaluatorError::InvalidInput(
                "title and description are required".to_string(),
            ));
        }

        Ok(Self {
            id: AssignmentId::new(),
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Lifecycle state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Evaluated,
    Failed,
}

impl SubmissionStatus {
    /// Only `pending -> evaluated` and `pending -> failed` are allowed.
    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Pending, SubmissionStatus::Evaluated)
                | (SubmissionStatus::Pending, SubmissionStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Evaluated => "evaluated",
            SubmissionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student's submission to an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_name: String,
    pub content: String,
    /// Source file the content was extracted from, if any.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    /// Create a new `pending` submission. Name and content are trimmed;
    /// blank content is rejected.
    pub fn new(assignment_id: AssignmentId, student_name: &str, content: &str) -> Result<Self> {
        let student_name = student_name.trim();
        let content = content.trim();

        if student_name.is_empty() {
            return Err(EvaluatorError::InvalidInput(
                "student name is required".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(EvaluatorError::InvalidInput(
                "content cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: SubmissionId::new(),
            assignment_id,
            student_name: student_name.to_string(),
            content: content.to_string(),
            file_path: None,
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
        })
    }

    /// Record the file the content came from.
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Apply a status change, enforcing the lifecycle.
    pub fn transition(&mut self, next: SubmissionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EvaluatorError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Feedback record produced when a submission reaches `evaluated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub submission_id: SubmissionId,
    pub plagiarism_risk: PlagiarismRisk,
    pub feedback_summary: String,
    pub score: u8,
    pub evaluated_at: DateTime<Utc>,
}
