//! Storage abstraction for assignments, submissions and evaluation results.
//!
//! The [`SubmissionStore`] trait is the only way the pipeline touches
//! persisted records. Implementations must keep an evaluation result and the
//! `evaluated` status together: [`SubmissionStore::complete_evaluation`]
//! writes both or neither.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod file;
pub mod memory;

pub use file::{FileStore, SaveFormat};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EvaluatorError, Result};
use crate::submission::{
    Assignment, AssignmentId, EvaluationResult, Submission, SubmissionId, SubmissionStatus,
};

/// Persistence operations used by the evaluation pipeline and the CLI.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_assignment(&self, assignment: Assignment) -> Result<()>;

    async fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>>;

    /// All assignments, newest first.
    async fn assignments(&self) -> Result<Vec<Assignment>>;

    /// Insert a new submission. Its assignment must exist.
    async fn insert_submission(&self, submission: Submission) -> Result<()>;

    async fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// Submissions for an assignment, newest first.
    async fn submissions_for_assignment(&self, id: &AssignmentId) -> Result<Vec<Submission>>;

    /// Content of every `evaluated` submission for `assignment`, except `excluding`.
    async fn evaluated_contents(
        &self,
        assignment: &AssignmentId,
        excluding: &SubmissionId,
    ) -> Result<Vec<String>>;

    /// Ids of submissions still `pending`, oldest first.
    async fn pending_submissions(&self) -> Result<Vec<SubmissionId>>;

    /// Store the result and move its submission to `evaluated`, atomically.
    async fn complete_evaluation(&self, result: EvaluationResult) -> Result<()>;

    /// Move a submission to `failed`.
    async fn mark_failed(&self, id: &SubmissionId) -> Result<()>;

    async fn evaluation(&self, id: &SubmissionId) -> Result<Option<EvaluationResult>>;
}

/// Plain record state shared by the store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub assignments: BTreeMap<AssignmentId, Assignment>,
    pub submissions: BTreeMap<SubmissionId, Submission>,
    pub evaluations: BTreeMap<SubmissionId, EvaluationResult>,
}

impl StoreState {
    fn insert_assignment(&mut self, assignment: Assignment) -> Result<()> {
        if self.assignments.contains_key(&assignment.id) {
            return Err(EvaluatorError::Store(format!(
                "assignment '{}' already exists",
                assignment.id
            )));
        }
        self.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    fn assignments_newest_first(&self) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> = self.assignments.values().cloned().collect();
        assignments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assignments
    }

    fn insert_submission(&mut self, submission: Submission) -> Result<()> {
        if !self.assignments.contains_key(&submission.assignment_id) {
            return Err(EvaluatorError::AssignmentNotFound(submission.assignment_id));
        }
        if self.submissions.contains_key(&submission.id) {
            return Err(EvaluatorError::Store(format!(
                "submission '{}' already exists",
                submission.id
            )));
        }
        self.submissions.insert(submission.id, submission);
        Ok(())
    }

    fn submissions_for_assignment(&self, id: &AssignmentId) -> Vec<Submission> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .values()
            .filter(|s| s.assignment_id == *id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        submissions
    }

    fn evaluated_contents(&self, assignment: &AssignmentId, excluding: &SubmissionId) -> Vec<String> {
        self.submissions
            .values()
            .filter(|s| {
                s.assignment_id == *assignment
                    && s.id != *excluding
                    && s.status == SubmissionStatus::Evaluated
            })
            .map(|s| s.content.clone())
            .collect()
    }

    fn pending_submissions(&self) -> Vec<SubmissionId> {
        let mut pending: Vec<&Submission> = self
            .submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        pending.into_iter().map(|s| s.id).collect()
    }

    fn complete_evaluation(&mut self, result: EvaluationResult) -> Result<()> {
        let id = result.submission_id;
        let submission = self
            .submissions
            .get_mut(&id)
            .ok_or(EvaluatorError::SubmissionNotFound(id))?;

        // A non-pending submission is an InvalidTransition even when a result exists.
        if !submission.status.can_transition_to(SubmissionStatus::Evaluated) {
            return Err(EvaluatorError::InvalidTransition {
                id,
                from: submission.status,
                to: SubmissionStatus::Evaluated,
            });
        }
        if self.evaluations.contains_key(&id) {
            return Err(EvaluatorError::Store(format!(
                "submission '{}' already has an evaluation",
                id
            )));
        }

        submission.transition(SubmissionStatus::Evaluated)?;
        self.evaluations.insert(id, result);
        Ok(())
    }

    fn mark_failed(&mut self, id: &SubmissionId) -> Result<()> {
        let submission = self
            .submissions
            .get_mut(id)
            .ok_or(EvaluatorError::SubmissionNotFound(*id))?;
        submission.transition(SubmissionStatus::Failed)
    }
}
