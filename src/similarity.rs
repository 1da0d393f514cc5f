//! Cosine similarity and plagiarism-risk reduction.
//!
//! The risk of a submission is the similarity of its single closest match
//! in the corpus, expressed as a whole percentage.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::EvaluatorError;
use crate::vectorizer::{TermVector, TfIdf};

/// Plagiarism risk as a whole percentage in `[0, 100]`.
///
/// Displays and serializes as `"<n>%"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlagiarismRisk(u8);

impl PlagiarismRisk {
    pub const NONE: PlagiarismRisk = PlagiarismRisk(0);

    /// Convert a similarity in `[0, 1]` to a percentage, rounding half up.
    pub fn from_similarity(similarity: f64) -> Self {
        if !similarity.is_finite() || similarity <= 0.0 {
            return Self::NONE;
        }
        let percent = (similarity * 100.0).round().min(100.0);
        Self(percent as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PlagiarismRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for PlagiarismRisk {
    type Err = EvaluatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('%').trim();
        let value: u8 = digits
            .parse()
            .map_err(|_| EvaluatorError::Serialization(format!("bad plagiarism risk '{}'", s)))?;
        if value > 100 {
            return Err(EvaluatorError::Serialization(format!(
                "plagiarism risk out of range: {}",
                s
            )));
        }
        Ok(Self(value))
    }
}

impl Serialize for PlagiarismRisk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlagiarismRisk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Cosine of the angle between two term vectors.
///
/// Terms missing from one vector count as zero. If either vector has zero
/// magnitude the similarity is 0.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let magnitude_a = a.magnitude();
    let magnitude_b = b.magnitude();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    // Terms only in one vector contribute nothing to the dot product.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small.iter().map(|(t, w)| w * large.weight(t)).sum();

    dot / (magnitude_a * magnitude_b)
}

/// Per-document similarities of one run, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityReport {
    /// Similarity of the target to each corpus document, in corpus order.
    pub similarities: Vec<f64>,
}

impl SimilarityReport {
    /// Compare `target` against `corpus`.
    ///
    /// An empty corpus skips vectorization altogether.
    pub fn compute<S: AsRef<str>>(target: &str, corpus: &[S]) -> Self {
        if corpus.is_empty() {
            return Self {
                similarities: Vec::new(),
            };
        }

        let tfidf = TfIdf::fit(std::iter::once(target).chain(corpus.iter().map(AsRef::as_ref)));
        let target_vector = tfidf.vector(0);

        let similarities = (1..=corpus.len())
            .map(|i| cosine_similarity(&target_vector, &tfidf.vector(i)))
            .collect();

        Self { similarities }
    }

    /// Highest similarity, 0 for an empty corpus.
    pub fn max_similarity(&self) -> f64 {
        self.similarities.iter().copied().fold(0.0, f64::max)
    }

    /// Index of the closest corpus document.
    pub fn closest_match(&self) -> Option<usize> {
        self.similarities
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    pub fn risk(&self) -> PlagiarismRisk {
        PlagiarismRisk::from_similarity(self.max_similarity())
    }
}

/// Plagiarism risk of `target` against prior submissions.
pub fn plagiarism_risk<S: AsRef<str>>(target: &str, corpus: &[S]) -> PlagiarismRisk {
    SimilarityReport::compute(target, corpus).risk()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESSAY: &str = "Climate change is driven by greenhouse gas emissions \
        from burning fossil fuels. Reducing emissions requires policy and innovation.";

    #[test]
    fn test_empty_corpus_is_zero_risk() {
        let corpus: Vec<String> = Vec::new();
        assert_eq!(plagiarism_risk(ESSAY, &corpus), PlagiarismRisk::NONE);
        assert_eq!(plagiarism_risk("", &corpus).percent(), 0);
    }

    #[test]
    fn test_self_similarity_is_full_risk() {
        assert_eq!(plagiarism_risk(ESSAY, &[ESSAY]).percent(), 100);
        let short = "one";
        assert_eq!(plagiarism_risk(short, &[short]).percent(), 100);
    }

    #[test]
    fn test_case_does_not_matter() {
        let upper = ESSAY.to_uppercase();
        assert_eq!(plagiarism_risk(ESSAY, &[upper]).percent(), 100);
    }

    #[test]
    fn test_disjoint_documents_are_zero() {
        assert_eq!(plagiarism_risk("apples and pears", &["quantum flux"]).percent(), 0);
    }

    #[test]
    fn test_shared_function_words_are_zero() {
        let risk = plagiarism_risk(
            "The cat is on the mat and it is happy.",
            &["The dog was in the yard and it was there."],
        );
        assert_eq!(risk.percent(), 0);
    }

    #[test]
    fn test_blank_corpus_document_is_zero_not_nan() {
        let report = SimilarityReport::compute(ESSAY, &["   "]);
        assert_eq!(report.similarities, vec![0.0]);
        assert_eq!(report.risk().percent(), 0);
        assert_eq!(report.closest_match(), None);
    }

    #[test]
    fn test_max_reduction_is_monotonic() {
        let mut corpus = vec![
            "Completely unrelated text about cooking pasta.".to_string(),
            "Football scores from the weekend.".to_string(),
        ];
        let before = plagiarism_risk(ESSAY, &corpus);

        corpus.push(ESSAY.replace("innovation", "invention"));
        let after = plagiarism_risk(ESSAY, &corpus);

        assert!(after >= before);
        assert!(after.percent() > 80);
    }

    #[test]
    fn test_order_independent() {
        let a = "Graphs and trees in computer science.";
        let b = "Climate emissions and fossil fuel policy.";
        let forward = plagiarism_risk(ESSAY, &[a, b]);
        let reverse = plagiarism_risk(ESSAY, &[b, a]);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let tfidf = TfIdf::fit([ESSAY, "emissions policy and climate", "fossil"]);
        let v0 = tfidf.vector(0);
        let v1 = tfidf.vector(1);
        let v2 = tfidf.vector(2);

        assert!((cosine_similarity(&v0, &v1) - cosine_similarity(&v1, &v0)).abs() < 1e-12);
        assert!((cosine_similarity(&v0, &v2) - cosine_similarity(&v2, &v0)).abs() < 1e-12);
    }

    #[test]
    fn test_closest_match() {
        let corpus = ["pasta recipes", ESSAY, "climate"];
        let report = SimilarityReport::compute(ESSAY, &corpus);
        assert_eq!(report.closest_match(), Some(1));
        assert_eq!(report.risk().percent(), 100);
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(PlagiarismRisk::from_similarity(0.9951).percent(), 100);
        assert_eq!(PlagiarismRisk::from_similarity(0.994).percent(), 99);
        assert_eq!(PlagiarismRisk::from_similarity(0.125).percent(), 13);
        assert_eq!(PlagiarismRisk::from_similarity(0.0).percent(), 0);
        assert_eq!(PlagiarismRisk::from_similarity(1.0000001).percent(), 100);
        assert_eq!(PlagiarismRisk::from_similarity(f64::NAN).percent(), 0);
    }

    #[test]
    fn test_risk_display_and_serde() {
        let risk = PlagiarismRisk::from_similarity(0.42);
        assert_eq!(risk.to_string(), "42%");
        assert_eq!(serde_json::to_string(&risk).unwrap(), "\"42%\"");

        let parsed: PlagiarismRisk = serde_json::from_str("\"7%\"").unwrap();
        assert_eq!(parsed.percent(), 7);
        assert!("101%".parse::<PlagiarismRisk>().is_err());
        assert!("abc".parse::<PlagiarismRisk>().is_err());
    }
}
