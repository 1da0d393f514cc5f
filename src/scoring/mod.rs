//! Feedback scoring.
//!
//! [`FeedbackScorer`] asks the external evaluator for a grade first and
//! falls back to the rule-based [`heuristic`] whenever the call, the
//! parsing, or the response shape fails. Callers always get a
//! [`Feedback`]; which strategy produced it is only visible in logs.

pub mod heuristic;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{EvaluatorError, Result};
use crate::llm::{Evaluator, Prompts, extract_json};

/// Summary used when the model omits one.
pub const DEFAULT_SUMMARY: &str = "Evaluation complete.";

/// Score used when the model's score cannot be read as a number.
pub const DEFAULT_SCORE: u8 = 50;

/// Narrative feedback and a score in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub summary: String,
    pub score: u8,
}

/// Which strategy produced a [`Feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Model,
    Heuristic,
}

/// Result of the primary attempt, resolved before leaving the scorer.
enum Outcome {
    Model(Feedback),
    Fallback(EvaluatorError),
}

/// Scores submissions with the external evaluator, or the heuristic.
#[derive(Clone)]
pub struct FeedbackScorer {
    evaluator: Option<Arc<dyn Evaluator>>,
}

impl FeedbackScorer {
    /// Create a scorer backed by an external evaluator.
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            evaluator: Some(evaluator),
        }
    }

    /// Create a scorer that only uses the heuristic.
    pub fn heuristic_only() -> Self {
        Self { evaluator: None }
    }

    /// Evaluate `content` against the assignment description.
    pub async fn evaluate(&self, content: &str, assignment_description: &str) -> Feedback {
        self.evaluate_with_strategy(content, assignment_description)
            .await
            .0
    }

    /// Evaluate and report which strategy was used.
    pub async fn evaluate_with_strategy(
        &self,
        content: &str,
        assignment_description: &str,
    ) -> (Feedback, Strategy) {
        match self.try_model(content, assignment_description).await {
            Outcome::Model(feedback) => {
                tracing::debug!(score = feedback.score, "feedback from evaluator model");
                (feedback, Strategy::Model)
            }
            Outcome::Fallback(reason) => {
                if reason.is_evaluator_error() {
                    tracing::warn!(error = %reason, "evaluator failed, using rule-based feedback");
                } else {
                    tracing::debug!(reason = %reason, "using rule-based feedback");
                }
                (
                    heuristic::evaluate(content, assignment_description),
                    Strategy::Heuristic,
                )
            }
        }
    }

    async fn try_model(&self, content: &str, assignment_description: &str) -> Outcome {
        let evaluator = match &self.evaluator {
            Some(evaluator) if evaluator.is_available() => evaluator,
            _ => {
                return Outcome::Fallback(EvaluatorError::Config(
                    "no evaluator configured".to_string(),
                ));
            }
        };

        let prompt = Prompts::render_evaluation(assignment_description, content);
        let response = match evaluator
            .complete(Some(Prompts::system_evaluator()), &prompt)
            .await
        {
            Ok(response) => response,
            Err(e) => return Outcome::Fallback(e),
        };

        match parse_model_response(&response) {
            Ok(feedback) => Outcome::Model(feedback),
            Err(e) => Outcome::Fallback(e),
        }
    }
}

/// Parse the model's JSON reply into feedback.
///
/// The reply must be a JSON object. A missing or unreadable score becomes
/// [`DEFAULT_SCORE`]; readable scores are clamped into `[0, 100]`. The
/// summary is kept as written; a missing or blank one becomes
/// [`DEFAULT_SUMMARY`].
pub fn parse_model_response(response: &str) -> Result<Feedback> {
    let json_str = extract_json(response);

    let value: Value = serde_json::from_str(&json_str).map_err(|e| {
        EvaluatorError::LlmParse(format!(
            "Failed to parse evaluation response: {}. Response: {}",
            e,
            truncate(response, 200)
        ))
    })?;

    let object = value.as_object().ok_or_else(|| {
        EvaluatorError::LlmParse(format!(
            "Evaluation response is not a JSON object: {}",
            truncate(response, 200)
        ))
    })?;

    let summary = object
        .get("feedback_summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    let score = object
        .get("score")
        .and_then(read_score)
        .map(|s| s.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_SCORE);

    Ok(Feedback { summary, score })
}

/// Read an integer score from a number or a numeric string.
///
/// Fractions are truncated; strings are read up to the first non-digit.
fn read_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate huge values; they are clamped afterwards anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
