//! End-to-end evaluation through the public API.

use assignment_evaluator::llm::Evaluator;
use assignment_evaluator::scoring::{FeedbackScorer, Strategy, heuristic};
use assignment_evaluator::store::{FileStore, MemoryStore, SubmissionStore};
use assignment_evaluator::submission::{Assignment, Submission, SubmissionId, SubmissionStatus};
use assignment_evaluator::{Orchestrator, Result, WorkerPool};
use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

/// Evaluator that always answers with the same text.
struct Canned(&'static str);

#[async_trait]
impl Evaluator for Canned {
    async fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

fn climate_essay() -> String {
    // 20 sentences of 10 words each.
    vec!["Climate change raises emissions across many regions of the world."; 20].join(" ")
}

#[tokio::test]
async fn test_short_unformatted_text_without_keywords() {
    let content = vec!["the quick brown fox jumps over lazy dogs"; 5].join(" ");
    let report = heuristic::analyze(&content, "Do it.");

    assert_eq!(report.word_count, 40);
    assert_eq!(report.keyword_coverage, None);
    assert_eq!(report.components.len(), 3);
    // length 10, one 40-word sentence 10, formatting 5
    assert_eq!(report.total(), 25);

    let scorer = FeedbackScorer::heuristic_only();
    let (feedback, strategy) = scorer.evaluate_with_strategy(&content, "Do it.").await;
    assert_eq!(strategy, Strategy::Heuristic);
    assert_eq!(feedback.score, 25);
    assert_eq!(feedback.summary, report.summary());
    assert!(!feedback.summary.contains("relevance"));
}

#[tokio::test]
async fn test_well_formed_relevant_essay_scores_ninety() {
    let content = climate_essay();
    let description = "Climate change emissions";

    let report = heuristic::analyze(&content, description);
    assert_eq!(report.word_count, 200);
    assert_eq!(report.keyword_coverage, Some((3, 3)));

    let feedback = FeedbackScorer::heuristic_only()
        .evaluate(&content, description)
        .await;
    assert_eq!(feedback.score, 90);
    assert!(feedback.summary.contains("covers 3 of 3 key topic(s)"));
}

#[tokio::test]
async fn test_model_score_is_clamped() {
    let scorer = FeedbackScorer::new(Arc::new(Canned(
        r#"{"feedback_summary": "Good work", "score": 150}"#,
    )));
    let (feedback, strategy) = scorer
        .evaluate_with_strategy("Some essay.", "Write an essay.")
        .await;

    assert_eq!(strategy, Strategy::Model);
    assert_eq!(feedback.score, 100);
    assert_eq!(feedback.summary, "Good work");
}

#[tokio::test]
async fn test_unparseable_model_reply_matches_heuristic() {
    let content = climate_essay();
    let description = "Discuss climate change and emissions.";

    let scorer = FeedbackScorer::new(Arc::new(Canned("I'd give this a solid B+")));
    let (feedback, strategy) = scorer.evaluate_with_strategy(&content, description).await;

    assert_eq!(strategy, Strategy::Heuristic);
    assert_eq!(feedback, heuristic::evaluate(&content, description));
}

#[tokio::test]
async fn test_identical_resubmission_through_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let store = Arc::new(FileStore::open(&path).unwrap());

    let assignment = Assignment::new("Climate", "Climate change emissions").unwrap();
    let assignment_id = assignment.id;
    store.insert_assignment(assignment).await.unwrap();

    let first = Submission::new(assignment_id, "Ada", &climate_essay()).unwrap();
    let second = Submission::new(assignment_id, "Bob", &climate_essay()).unwrap();
    let (first_id, second_id) = (first.id, second.id);
    store.insert_submission(first).await.unwrap();
    store.insert_submission(second).await.unwrap();

    // One worker, so the second run sees the first as evaluated.
    let orchestrator = Orchestrator::new(store.clone(), FeedbackScorer::heuristic_only());
    let pool = WorkerPool::start(orchestrator, 1, 4);
    pool.dispatch(first_id).await.unwrap();
    pool.dispatch(second_id).await.unwrap();
    let stats = pool.shutdown().await;
    assert_eq!(stats.evaluated, 2);

    let reopened = FileStore::open(&path).unwrap();
    let first = reopened.evaluation(&first_id).await.unwrap().unwrap();
    let second = reopened.evaluation(&second_id).await.unwrap().unwrap();
    assert_eq!(first.plagiarism_risk.to_string(), "0%");
    assert_eq!(second.plagiarism_risk.to_string(), "100%");
    assert_eq!(second.score, 90);
}

#[tokio::test]
async fn test_result_exists_only_for_evaluated_submissions() {
    let store = Arc::new(MemoryStore::new());
    let assignment = Assignment::new("Rivers", "Explain river erosion and sediment.").unwrap();
    let assignment_id = assignment.id;
    store.insert_assignment(assignment).await.unwrap();

    let texts = [
        "Rivers erode their beds.",
        "Sediment settles where water slows down.",
        "Floods move large boulders downstream.",
        "Erosion is faster on steep slopes.",
    ];
    let mut ids: Vec<SubmissionId> = Vec::new();
    for text in texts {
        let submission = Submission::new(assignment_id, "Student", text).unwrap();
        ids.push(submission.id);
        store.insert_submission(submission).await.unwrap();
    }

    // Only dispatch half; the rest stay pending.
    let orchestrator = Orchestrator::new(store.clone(), FeedbackScorer::heuristic_only());
    let pool = WorkerPool::start(orchestrator, 2, 2);
    for id in &ids[..2] {
        pool.dispatch(*id).await.unwrap();
    }
    pool.shutdown().await;

    for id in &ids {
        let submission = store.submission(id).await.unwrap().unwrap();
        let result = store.evaluation(id).await.unwrap();
        assert_eq!(
            submission.status == SubmissionStatus::Evaluated,
            result.is_some()
        );
    }
    assert_eq!(store.pending_submissions().await.unwrap().len(), 2);
}
