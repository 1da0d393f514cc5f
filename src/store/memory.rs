//! In-memory [`SubmissionStore`] for tests and one-shot runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::submission::{Assignment, AssignmentId, EvaluationResult, Submission, SubmissionId};

use super::{StoreState, SubmissionStore};

/// Store keeping every record in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_assignment(&self, assignment: Assignment) -> Result<()> {
        self.state.write().await.insert_assignment(assignment)
    }

    async fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>> {
        Ok(self.state.read().await.assignments.get(id).cloned())
    }

    async fn assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.state.read().await.assignments_newest_first())
    }

    async fn insert_submission(&self, submission: Submission) -> Result<()> {
        self.state.write().await.insert_submission(submission)
    }

    async fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        Ok(self.state.read().await.submissions.get(id).cloned())
    }

    async fn submissions_for_assignment(&self, id: &AssignmentId) -> Result<Vec<Submission>> {
        Ok(self.state.read().await.submissions_for_assignment(id))
    }

    async fn evaluated_contents(
        &self,
        assignment: &AssignmentId,
        excluding: &SubmissionId,
    ) -> Result<Vec<String>> {
        Ok(self
            .state
            .read()
            .await
            .evaluated_contents(assignment, excluding))
    }

    async fn pending_submissions(&self) -> Result<Vec<SubmissionId>> {
        Ok(self.state.read().await.pending_submissions())
    }

    async fn complete_evaluation(&self, result: EvaluationResult) -> Result<()> {
        self.state.write().await.complete_evaluation(result)
    }

    async fn mark_failed(&self, id: &SubmissionId) -> Result<()> {
        self.state.write().await.mark_failed(id)
    }

    async fn evaluation(&self, id: &SubmissionId) -> Result<Option<EvaluationResult>> {
        Ok(self.state.read().await.evaluations.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SubmissionStatus;

    #[tokio::test]
    async fn test_round_trip_records() {
        let store = MemoryStore::new();
        let assignment = Assignment::new("Essay", "Write about rivers.").unwrap();
        let assignment_id = assignment.id;
        store.insert_assignment(assignment).await.unwrap();

        let submission = Submission::new(assignment_id, "Ada", "Rivers flow.").unwrap();
        let id = submission.id;
        store.insert_submission(submission).await.unwrap();

        let loaded = store.submission(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SubmissionStatus::Pending);
        assert_eq!(store.pending_submissions().await.unwrap(), vec![id]);
        assert_eq!(store.assignments().await.unwrap().len(), 1);
        assert!(store.evaluation(&id).await.unwrap().is_none());

        store.mark_failed(&id).await.unwrap();
        assert!(store.pending_submissions().await.unwrap().is_empty());
        assert!(store.mark_failed(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = MemoryStore::new();
        assert!(store.submission(&SubmissionId::new()).await.unwrap().is_none());
        assert!(store.assignment(&AssignmentId::new()).await.unwrap().is_none());
        assert!(store.mark_failed(&SubmissionId::new()).await.is_err());
    }
}
