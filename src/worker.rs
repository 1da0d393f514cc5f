//! Bounded worker pool running evaluations in the background.
//!
//! Submission ids go into one bounded queue; a fixed number of workers take
//! ids off it and run them through the [`Orchestrator`]. Dispatching returns
//! as soon as the id is queued, so the submitter sees `pending` right away.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::error::{EvaluatorError, Result};
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::submission::SubmissionId;

/// Counts of run outcomes seen by a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub evaluated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PoolStats {
    fn record(&mut self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Evaluated(_) => self.evaluated += 1,
            RunOutcome::Failed => self.failed += 1,
            RunOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Background evaluation workers.
pub struct WorkerPool {
    sender: mpsc::Sender<SubmissionId>,
    workers: Vec<JoinHandle<PoolStats>>,
    orchestrator: Orchestrator,
}

impl WorkerPool {
    /// Spawn `workers` tasks sharing a queue of `queue_capacity` ids.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(orchestrator: Orchestrator, workers: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    let mut stats = PoolStats::default();
                    loop {
                        // Hold the lock only while waiting for the next id.
                        let next = receiver.lock().await.recv().await;
                        let Some(id) = next else { break };

                        tracing::debug!(worker, submission = %id, "evaluation started");
                        let outcome = orchestrator.run(id).await;
                        stats.record(&outcome);
                    }
                    tracing::debug!(worker, ?stats, "worker stopped");
                    stats
                })
            })
            .collect();

        Self {
            sender,
            workers,
            orchestrator,
        }
    }

    /// Queue a submission for evaluation.
    ///
    /// Waits only for queue space, never for the evaluation itself.
    pub async fn dispatch(&self, id: SubmissionId) -> Result<()> {
        self.sender
            .send(id)
            .await
            .map_err(|_| EvaluatorError::QueueClosed)
    }

    /// Re-queue every submission still `pending` in the store.
    ///
    /// Runs interrupted by a crash leave submissions `pending`; call this on
    /// startup to finish them. Returns how many were queued.
    pub async fn recover_pending(&self) -> Result<usize> {
        let pending = self.orchestrator.store().pending_submissions().await?;
        let count = pending.len();
        for id in pending {
            self.dispatch(id).await?;
        }
        if count > 0 {
            tracing::info!(count, "re-queued pending submissions");
        }
        Ok(count)
    }

    /// Stop accepting work, let the queue drain, and wait for the workers.
    pub async fn shutdown(self) -> PoolStats {
        drop(self.sender);

        let mut total = PoolStats::default();
        for handle in self.workers {
            match handle.await {
                Ok(stats) => {
                    total.evaluated += stats.evaluated;
                    total.failed += stats.failed;
                    total.skipped += stats.skipped;
                }
                Err(e) => tracing::error!(error = %e, "evaluation worker panicked"),
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::FeedbackScorer;
    use crate::store::{MemoryStore, SubmissionStore};
    use crate::submission::{Assignment, Submission, SubmissionStatus};

    async fn seeded(count: usize) -> (Arc<MemoryStore>, Vec<SubmissionId>) {
        let store = Arc::new(MemoryStore::new());
        let assignment = Assignment::new("Essay", "Discuss renewable energy sources.").unwrap();
        let assignment_id = assignment.id;
        store.insert_assignment(assignment).await.unwrap();

        let mut ids = Vec::new();
        for i in 0..count {
            let content = format!("Solar and wind power are renewable energy number {}.", i);
            let submission = Submission::new(assignment_id, "Student", &content).unwrap();
            ids.push(submission.id);
            store.insert_submission(submission).await.unwrap();
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_pool_evaluates_everything_dispatched() {
        let (store, ids) = seeded(10).await;
        let orchestrator = Orchestrator::new(store.clone(), FeedbackScorer::heuristic_only());
        let pool = WorkerPool::start(orchestrator, 3, 4);

        for id in &ids {
            pool.dispatch(*id).await.unwrap();
        }
        let stats = pool.shutdown().await;

        assert_eq!(stats.evaluated, 10);
        assert_eq!(stats.failed, 0);
        for id in &ids {
            let submission = store.submission(id).await.unwrap().unwrap();
            assert_eq!(submission.status, SubmissionStatus::Evaluated);
            assert!(store.evaluation(id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_recover_pending() {
        let (store, ids) = seeded(3).await;
        let orchestrator = Orchestrator::new(store.clone(), FeedbackScorer::heuristic_only());
        let pool = WorkerPool::start(orchestrator, 2, 8);

        assert_eq!(pool.recover_pending().await.unwrap(), 3);
        let stats = pool.shutdown().await;

        assert_eq!(stats.evaluated, 3);
        assert!(store.pending_submissions().await.unwrap().is_empty());
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_dispatch_is_skipped() {
        let (store, ids) = seeded(1).await;
        let orchestrator = Orchestrator::new(store.clone(), FeedbackScorer::heuristic_only());
        let pool = WorkerPool::start(orchestrator, 1, 4);

        pool.dispatch(ids[0]).await.unwrap();
        pool.dispatch(ids[0]).await.unwrap();
        let stats = pool.shutdown().await;

        assert_eq!(stats.evaluated, 1);
        assert_eq!(stats.skipped, 1);
    }
}
