//! Assignment Evaluator - plagiarism risk and feedback scoring for student submissions.
//!
//! Each submission to an assignment is compared against the submissions
//! already evaluated for that assignment, and graded either by an external
//! LLM or, when that is unavailable or misbehaves, by a deterministic
//! rule-based heuristic.
//!
//! # Overview
//!
//! 1. Submission text is tokenized and weighted with TF-IDF over the
//!    submission plus its comparison corpus
//! 2. The closest prior submission by cosine similarity sets the
//!    plagiarism risk (0-100%)
//! 3. The feedback scorer produces a summary and a score (0-100)
//! 4. The orchestrator stores the result and marks the submission
//!    `evaluated`, or marks it `failed`
//!
//! # Quick Start
//!
//! ```no_run
//! use assignment_evaluator::{
//!     config::Config,
//!     llm::LlmClient,
//!     orchestrator::Orchestrator,
//!     scoring::FeedbackScorer,
//!     store::{MemoryStore, SubmissionStore},
//!     submission::{Assignment, Submission},
//!     worker::WorkerPool,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let scorer = FeedbackScorer::new(Arc::new(LlmClient::new(config.llm.clone())));
//!     let pool = WorkerPool::start(
//!         Orchestrator::new(store.clone(), scorer),
//!         config.evaluation.workers,
//!         config.evaluation.queue_capacity,
//!     );
//!
//!     let assignment = Assignment::new("Climate", "Discuss climate change and emissions.")?;
//!     let submission = Submission::new(assignment.id, "Ada", "Emissions drive climate change.")?;
//!     let id = submission.id;
//!     store.insert_assignment(assignment).await?;
//!     store.insert_submission(submission).await?;
//!
//!     pool.dispatch(id).await?;
//!     pool.shutdown().await;
//!
//!     if let Some(result) = store.evaluation(&id).await? {
//!         println!("{} risk, score {}", result.plagiarism_risk, result.score);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **vectorizer**: run-scoped TF-IDF term vectors
//! - **similarity**: cosine similarity and max-reduced plagiarism risk
//! - **scoring**: LLM feedback with rule-based fallback
//! - **orchestrator**: the `pending -> evaluated | failed` state machine
//! - **worker**: bounded background pool feeding the orchestrator
//! - **store**: persistence seam (in-memory and file-backed)

pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod submission;
pub mod telemetry;
pub mod vectorizer;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use document::Document;
pub use error::{EvaluatorError, Result};
pub use llm::LlmClient;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use scoring::{Feedback, FeedbackScorer};
pub use similarity::{PlagiarismRisk, plagiarism_risk};
pub use store::{FileStore, MemoryStore, SubmissionStore};
pub use submission::{Assignment, EvaluationResult, Submission, SubmissionStatus};
pub use worker::WorkerPool;
