//! Deterministic rule-based scoring.
//!
//! Four independent criteria each add points and one sentence of
//! commentary: length, sentence structure, relevance to the assignment
//! and formatting. Relevance is skipped when the assignment description
//! yields no keywords.

use serde::{Deserialize, Serialize};

use crate::document::{sentences, word_count};

use super::Feedback;

/// Common English words ignored when extracting assignment keywords.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "shall", "can", "this", "that",
    "these", "those", "it", "its", "you", "your", "we", "our", "they", "their", "he", "she", "his",
    "her", "what", "which", "who", "how", "when", "where", "why", "all", "each", "any", "both",
    "not", "no",
];

const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// What a score component measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Length,
    SentenceStructure,
    Relevance,
    Formatting,
}

/// Points and commentary contributed by one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub criterion: Criterion,
    pub points: u8,
    pub note: String,
}

/// Full breakdown of a heuristic evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicReport {
    pub word_count: usize,
    pub average_sentence_length: f64,
    /// `(matched, total)` keyword counts, if the description had keywords.
    pub keyword_coverage: Option<(usize, usize)>,
    pub components: Vec<ScoreComponent>,
}

impl HeuristicReport {
    /// Sum of component points, clamped to `[0, 100]`.
    pub fn total(&self) -> u8 {
        let sum: u32 = self.components.iter().map(|c| u32::from(c.points)).sum();
        sum.min(100) as u8
    }

    /// Component notes joined in criterion order.
    pub fn summary(&self) -> String {
        self.components
            .iter()
            .map(|c| c.note.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_feedback(self) -> Feedback {
        Feedback {
            summary: self.summary(),
            score: self.total(),
        }
    }
}

/// Score `content` against `assignment_description` without any model.
pub fn analyze(content: &str, assignment_description: &str) -> HeuristicReport {
    let words = word_count(content);
    let sentence_count = sentences(content).count();
    let average_sentence_length = if sentence_count > 0 {
        words as f64 / sentence_count as f64
    } else {
        0.0
    };

    let mut components = vec![
        length_component(words),
        sentence_component(average_sentence_length),
    ];

    let keywords = extract_keywords(assignment_description);
    let keyword_coverage = if keywords.is_empty() {
        None
    } else {
        let content_lower = content.to_lowercase();
        let matched = keywords
            .iter()
            .filter(|kw| content_lower.contains(kw.as_str()))
            .count();
        components.push(relevance_component(matched, keywords.len()));
        Some((matched, keywords.len()))
    };

    components.push(formatting_component(content));

    HeuristicReport {
        word_count: words,
        average_sentence_length,
        keyword_coverage,
        components,
    }
}

/// Rule-based feedback for `content`.
pub fn evaluate(content: &str, assignment_description: &str) -> Feedback {
    analyze(content, assignment_description).into_feedback()
}

/// Lowercase alphanumeric words longer than three characters, minus stop words.
///
/// Repeated words are kept, so they weigh more in the coverage ratio.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

fn length_component(words: usize) -> ScoreComponent {
    let (points, note) = match words {
        0..50 => (
            10,
            "Submission is too short. Please provide more detailed content.",
        ),
        50..150 => (
            20,
            "Submission length is adequate but could be more comprehensive.",
        ),
        150..300 => (25, "Good submission length with adequate detail."),
        _ => (30, "Excellent submission length with comprehensive coverage."),
    };

    ScoreComponent {
        criterion: Criterion::Length,
        points,
        note: note.to_string(),
    }
}

fn sentence_component(average: f64) -> ScoreComponent {
    let (points, note) = if average < 5.0 {
        (5, "Sentences are too short. Try to elaborate more.")
    } else if average < 15.0 {
        (15, "Good sentence structure and clarity.")
    } else if average < 25.0 {
        (20, "Well-structured sentences with good detail.")
    } else {
        (
            10,
            "Sentences are quite long. Consider breaking them down for clarity.",
        )
    };

    ScoreComponent {
        criterion: Criterion::SentenceStructure,
        points,
        note: note.to_string(),
    }
}

fn relevance_component(matched: usize, total: usize) -> ScoreComponent {
    let coverage = matched as f64 / total as f64;

    let (points, note) = if coverage >= 0.7 {
        (
            30,
            format!(
                "Strong relevance to the assignment, covers {} of {} key topic(s).",
                matched, total
            ),
        )
    } else if coverage >= 0.4 {
        (
            18,
            format!(
                "Moderate relevance, covers {} of {} key topic(s).",
                matched, total
            ),
        )
    } else {
        (
            6,
            format!(
                "Low relevance, only {} of {} key topic(s) addressed.",
                matched, total
            ),
        )
    };

    ScoreComponent {
        criterion: Criterion::Relevance,
        points,
        note,
    }
}

fn formatting_component(content: &str) -> ScoreComponent {
    let has_uppercase = content.chars().any(|c| c.is_ascii_uppercase());
    let has_punctuation = content.contains(PUNCTUATION);

    let (points, note) = match (has_uppercase, has_punctuation) {
        (true, true) => (20, "Proper formatting and punctuation observed."),
        (true, false) | (false, true) => (12, "Basic formatting present but could be improved."),
        (false, false) => (
            5,
            "Please pay attention to proper capitalization and punctuation.",
        ),
    };

    ScoreComponent {
        criterion: Criterion::Formatting,
        points,
        note: note.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("Discuss the causes of Climate-Change and its EMISSIONS.");
        assert_eq!(keywords, vec!["discuss", "causes", "climate", "change", "emissions"]);
    }

    #[test]
    fn test_extract_keywords_skips_stop_words_and_short_words() {
        assert!(extract_keywords("What is it that they should have been?").is_empty());
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   ").is_empty());
    }

    #[test]
    fn test_length_bands() {
        assert_eq!(length_component(0).points, 10);
        assert_eq!(length_component(49).points, 10);
        assert_eq!(length_component(50).points, 20);
        assert_eq!(length_component(149).points, 20);
        assert_eq!(length_component(150).points, 25);
        assert_eq!(length_component(299).points, 25);
        assert_eq!(length_component(300).points, 30);
    }

    #[test]
    fn test_sentence_bands() {
        assert_eq!(sentence_component(0.0).points, 5);
        assert_eq!(sentence_component(4.9).points, 5);
        assert_eq!(sentence_component(5.0).points, 15);
        assert_eq!(sentence_component(14.9).points, 15);
        assert_eq!(sentence_component(15.0).points, 20);
        assert_eq!(sentence_component(24.9).points, 20);
        assert_eq!(sentence_component(25.0).points, 10);
    }

    #[test]
    fn test_relevance_bands() {
        assert_eq!(relevance_component(7, 10).points, 30);
        assert_eq!(relevance_component(4, 10).points, 18);
        assert_eq!(relevance_component(3, 10).points, 6);
        assert_eq!(relevance_component(0, 3).note, "Low relevance, only 0 of 3 key topic(s) addressed.");
    }

    #[test]
    fn test_formatting_bands() {
        assert_eq!(formatting_component("Hello, world.").points, 20);
        assert_eq!(formatting_component("Hello world").points, 12);
        assert_eq!(formatting_component("hello; world").points, 12);
        assert_eq!(formatting_component("hello world").points, 5);
    }

    #[test]
    fn test_empty_input_is_scored() {
        let report = analyze("", "");
        assert_eq!(report.word_count, 0);
        assert_eq!(report.average_sentence_length, 0.0);
        assert_eq!(report.keyword_coverage, None);
        assert_eq!(report.total(), 10 + 5 + 5);
        assert_eq!(report.components.len(), 3);
    }

    #[test]
    fn test_no_keywords_omits_relevance() {
        // 40 lowercase words, no punctuation: one 40-word sentence.
        let content = words(40);
        let report = analyze(&content, "the and of");

        assert_eq!(report.total(), 10 + 10 + 5);
        let criteria: Vec<Criterion> = report.components.iter().map(|c| c.criterion).collect();
        assert_eq!(
            criteria,
            vec![Criterion::Length, Criterion::SentenceStructure, Criterion::Formatting]
        );
        assert_eq!(
            report.summary(),
            "Submission is too short. Please provide more detailed content. \
             Sentences are quite long. Consider breaking them down for clarity. \
             Please pay attention to proper capitalization and punctuation."
        );
    }

    #[test]
    fn test_repeated_keywords_count_twice() {
        let report = analyze("biology", "Biology biology chemistry physics");
        assert_eq!(report.keyword_coverage, Some((2, 4)));
        assert_eq!(report.components[2].points, 18);
    }

    #[test]
    fn test_score_never_exceeds_100() {
        let sentence = "Climate change emissions matter greatly for everyone on earth today. ";
        let content = sentence.repeat(40);
        let feedback = evaluate(&content, "Climate change emissions");
        assert!(feedback.score <= 100);
        assert_eq!(feedback.score, 30 + 15 + 30 + 20);
    }
}
