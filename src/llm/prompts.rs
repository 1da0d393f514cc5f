//! Prompts sent to the external evaluator.

/// Collection of prompts used for submission evaluation.
pub struct Prompts;

impl Prompts {
    /// Prompt asking for a grade and feedback on a submission.
    ///
    /// Inputs are inserted in a single pass, so braces inside them are
    /// never treated as placeholders.
    pub fn render_evaluation(assignment_description: &str, content: &str) -> String {
        format!(
            r#"You are an academic evaluator. Evaluate the following student submission against the assignment description.

Assignment Description:
{assignment_description}

Student Submission:
{content}

Provide your evaluation in the following JSON format (no markdown, just raw JSON):
{{
  "feedback_summary": "A detailed 2-4 sentence feedback covering relevance, quality, and areas for improvement.",
  "score": <integer from 0 to 100>
}}"#
        )
    }

    /// System prompt for grading.
    pub fn system_evaluator() -> &'static str {
        "You are a fair and consistent grader of student assignments. Always respond with valid JSON when requested."
    }
}
