//! Per-submission evaluation state machine.
//!
//! A run takes a `pending` submission to `evaluated` (with its result) or to
//! `failed` (without one). The corpus is read without locking, so two
//! submissions to the same assignment evaluated at the same time do not
//! see each other; only submissions already `evaluated` count.

use chrono::Utc;
use std::sync::Arc;

use crate::error::{EvaluatorError, Result};
use crate::scoring::FeedbackScorer;
use crate::similarity::SimilarityReport;
use crate::store::SubmissionStore;
use crate::submission::{EvaluationResult, Submission, SubmissionId, SubmissionStatus};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The submission was evaluated and its result stored.
    Evaluated(EvaluationResult),
    /// The run failed and the submission was marked `failed`.
    Failed,
    /// Nothing to do: the submission is gone, already terminal, or was
    /// completed by a concurrent run of the same id.
    Skipped,
}

/// Drives submissions through evaluation.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn SubmissionStore>,
    scorer: FeedbackScorer,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn SubmissionStore>, scorer: FeedbackScorer) -> Self {
        Self { store, scorer }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    /// Run one evaluation to a terminal state.
    ///
    /// Never returns an error: failures are recorded on the submission and
    /// in the log.
    pub async fn run(&self, id: SubmissionId) -> RunOutcome {
        let submission = match self.store.submission(&id).await {
            Ok(Some(submission)) => submission,
            Ok(None) => {
                tracing::debug!(submission = %id, "submission not found, nothing to evaluate");
                return RunOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!(submission = %id, error = %e, "failed to load submission");
                return self.fail(id).await;
            }
        };

        if submission.status != SubmissionStatus::Pending {
            tracing::debug!(
                submission = %id,
                status = %submission.status,
                "submission already evaluated or failed"
            );
            return RunOutcome::Skipped;
        }

        match self.evaluate(&submission).await {
            Ok(result) => {
                tracing::info!(
                    submission = %id,
                    plagiarism_risk = %result.plagiarism_risk,
                    score = result.score,
                    "submission evaluated"
                );
                RunOutcome::Evaluated(result)
            }
            Err(EvaluatorError::InvalidTransition { from, .. }) => {
                // Another run of the same id committed first.
                tracing::debug!(
                    submission = %id,
                    status = %from,
                    "submission completed by a concurrent run"
                );
                RunOutcome::Skipped
            }
            Err(e) => {
                tracing::error!(submission = %id, error = %e, "evaluation failed");
                self.fail(id).await
            }
        }
    }

    /// Compute and commit the result for a pending submission.
    async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResult> {
        let assignment = self
            .store
            .assignment(&submission.assignment_id)
            .await?
            .ok_or(EvaluatorError::AssignmentNotFound(submission.assignment_id))?;

        let corpus = self
            .store
            .evaluated_contents(&submission.assignment_id, &submission.id)
            .await?;

        let report = SimilarityReport::compute(&submission.content, &corpus);
        tracing::debug!(
            submission = %submission.id,
            corpus_size = corpus.len(),
            closest_match = ?report.closest_match(),
            "similarity computed"
        );

        let feedback = self
            .scorer
            .evaluate(&submission.content, &assignment.description)
            .await;

        let result = EvaluationResult {
            submission_id: submission.id,
            plagiarism_risk: report.risk(),
            feedback_summary: feedback.summary,
            score: feedback.score,
            evaluated_at: Utc::now(),
        };

        self.store.complete_evaluation(result.clone()).await?;
        Ok(result)
    }

    async fn fail(&self, id: SubmissionId) -> RunOutcome {
        if let Err(e) = self.store.mark_failed(&id).await {
            tracing::error!(
                submission = %id,
                error = %e,
                "could not mark submission as failed; it stays in its last stored state"
            );
        }
        RunOutcome::Failed
    }
}
