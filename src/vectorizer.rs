//! TF-IDF term vectors over a run-scoped corpus.
//!
//! IDF is computed over exactly the documents handed to [`TfIdf::fit`]
//! (the target plus its comparison corpus) and is thrown away with the
//! [`TfIdf`] value. Term frequency is the raw occurrence count, so longer
//! documents carry proportionally larger weights. Function words are never
//! indexed, so texts sharing only those have no similarity.

use std::collections::HashMap;

use crate::document::tokenize;

/// English function words, single letters and digits left out of term vectors.
const INDEX_STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "am", "an", "and", "another", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "came", "can", "cannot", "come", "could", "did", "do", "does", "doing", "during",
    "each", "few", "for", "from", "further", "get", "got", "has", "had", "he", "have", "her",
    "here", "him", "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
    "like", "make", "many", "me", "might", "more", "most", "much", "must", "my", "myself",
    "never", "now", "of", "on", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "said", "same", "see", "should", "since", "so", "some", "still", "such", "take",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "way", "we", "well", "were", "what", "where", "when", "which", "while", "who", "whom", "with",
    "would", "why", "you", "your", "yours", "yourself", "a", "b", "c", "d", "e", "f", "g", "h",
    "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    "$", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "_",
];

/// Tokens of `text` that take part in TF-IDF weighting.
pub fn index_terms(text: &str) -> impl Iterator<Item = String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !INDEX_STOP_WORDS.contains(&t.as_str()))
}

/// Sparse term -> weight mapping for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: HashMap<String, f64>,
}

impl TermVector {
    /// Weight of `term`, zero if absent.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Euclidean norm of the vector.
    pub fn magnitude(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }
}

impl FromIterator<(String, f64)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().filter(|(_, w)| *w != 0.0).collect(),
        }
    }
}

/// Term counts and document frequencies for one set of documents.
#[derive(Debug, Clone)]
pub struct TfIdf {
    counts: Vec<HashMap<String, usize>>,
    document_frequency: HashMap<String, usize>,
}

impl TfIdf {
    /// Tokenize and count every document, skipping stop words.
    pub fn fit<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let counts: Vec<HashMap<String, usize>> = texts
            .into_iter()
            .map(|text| {
                let mut tf = HashMap::new();
                for token in index_terms(text) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        Self {
            counts,
            document_frequency,
        }
    }

    /// Number of documents in the run.
    pub fn document_count(&self) -> usize {
        self.counts.len()
    }

    /// Smoothed inverse document frequency: `1 + ln(N / (1 + df))`.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.counts.len() as f64;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f64;
        1.0 + (n / (1.0 + df)).ln()
    }

    /// Raw count of `term` in document `index`.
    pub fn tf(&self, index: usize, term: &str) -> usize {
        self.counts
            .get(index)
            .and_then(|tf| tf.get(term))
            .copied()
            .unwrap_or(0)
    }

    /// TF-IDF vector of the document at `index`; empty if out of range.
    pub fn vector(&self, index: usize) -> TermVector {
        match self.counts.get(index) {
            Some(tf) => tf
                .iter()
                .map(|(term, &count)| (term.clone(), count as f64 * self.idf(term)))
                .collect(),
            None => TermVector::default(),
        }
    }

    /// Vectors for every document, in input order.
    pub fn vectors(&self) -> Vec<TermVector> {
        (0..self.counts.len()).map(|i| self.vector(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_term_frequency() {
        let tfidf = TfIdf::fit(["cat sat cat mat", "dog"]);
        assert_eq!(tfidf.tf(0, "cat"), 2);
        assert_eq!(tfidf.tf(0, "mat"), 1);
        assert_eq!(tfidf.tf(1, "cat"), 0);
        assert_eq!(tfidf.tf(5, "cat"), 0);
    }

    #[test]
    fn test_idf_is_run_scoped() {
        let two = TfIdf::fit(["alpha beta", "alpha gamma"]);
        let three = TfIdf::fit(["alpha beta", "alpha gamma", "delta"]);

        // alpha: N=2, df=2 -> 1 + ln(2/3)
        assert!((two.idf("alpha") - (1.0 + (2.0f64 / 3.0).ln())).abs() < 1e-12);
        // same term, bigger run -> different idf
        assert!((three.idf("alpha") - (1.0 + (3.0f64 / 3.0).ln())).abs() < 1e-12);
        assert!(three.idf("delta") > three.idf("alpha"));
    }

    #[test]
    fn test_idf_is_positive() {
        let tfidf = TfIdf::fit(["same words", "same words", "same words"]);
        assert!(tfidf.idf("same") > 0.0);
    }

    #[test]
    fn test_vector_weights() {
        let tfidf = TfIdf::fit(["apple apple pear", "pear"]);
        let v = tfidf.vector(0);

        let expected_apple = 2.0 * (1.0 + (2.0f64 / 2.0).ln());
        assert!((v.weight("apple") - expected_apple).abs() < 1e-12);
        assert_eq!(v.weight("banana"), 0.0);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_empty_document_has_zero_magnitude() {
        let tfidf = TfIdf::fit(["   ", "words here"]);
        let v = tfidf.vector(0);
        assert!(v.is_empty());
        assert_eq!(v.magnitude(), 0.0);
    }

    #[test]
    fn test_stop_words_are_not_indexed() {
        let tfidf = TfIdf::fit(["The cat is on the mat and it is happy.", "dog"]);
        assert_eq!(tfidf.tf(0, "the"), 0);
        assert_eq!(tfidf.tf(0, "is"), 0);
        assert_eq!(tfidf.tf(0, "cat"), 1);
        assert_eq!(tfidf.vector(0).len(), 3);
    }

    #[test]
    fn test_index_terms_drops_single_characters() {
        let terms: Vec<String> = index_terms("A 4 x_y _ Plan B").collect();
        assert_eq!(terms, vec!["x_y", "plan"]);
    }

    #[test]
    fn test_only_content_words_remain() {
        let tfidf = TfIdf::fit(["It was the one that they had.", "words"]);
        assert_eq!(tfidf.vector(0).len(), 1);
        assert_eq!(tfidf.tf(0, "one"), 1);
        assert_eq!(tfidf.document_count(), 2);
        assert_eq!(tfidf.vectors().len(), 2);
    }
}
