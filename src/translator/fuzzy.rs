//! Fuzzy exemplar stage
//!
//! Scores every exemplar by character-level Levenshtein distance divided by
//! the longer string's length (0.0 identical, 1.0 nothing in common) and
//! accepts the best one when its score does not exceed the threshold.

use async_trait::async_trait;

use super::corpus::ExemplarCorpus;
use super::TranslateStage;
use crate::layout::patch::Patch;

pub struct FuzzyStage {
    corpus: ExemplarCorpus,
    threshold: f64,
}

impl FuzzyStage {
    pub fn new(corpus: ExemplarCorpus, threshold: f64) -> Self {
        Self { corpus, threshold }
    }

    /// Closest exemplar output and its score
    pub fn best_match(&self, text: &str) -> Option<(&Patch, f64)> {
        let text = normalize(text);
        self.corpus
            .exemplars()
            .iter()
            .map(|exemplar| (&exemplar.output, normalized_distance(&text, &normalize(&exemplar.input))))
            .fold(None, |best: Option<(&Patch, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
    }
}

#[async_trait]
impl TranslateStage for FuzzyStage {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    async fn attempt(&self, text: &str) -> Option<Patch> {
        let (output, score) = self.best_match(text)?;
        if score <= self.threshold {
            tracing::debug!("Fuzzy match accepted with score {:.3}", score);
            Some(output.clone())
        } else {
            None
        }
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Levenshtein distance over chars, scaled to 0.0..=1.0
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalized_distance_bounds() {
        assert_eq!(normalized_distance("abc", "abc"), 0.0);
        assert_eq!(normalized_distance("abc", "xyz"), 1.0);
        assert_eq!(normalized_distance("", ""), 0.0);
        assert!((normalized_distance("kitten", "sitting") - 3.0 / 7.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_exact_exemplar_returns_output_verbatim() {
        let stage = FuzzyStage::new(ExemplarCorpus::builtin(), 0.3);
        let patch = stage.attempt("رنگ پس زمینه رو قرمز کن").await.unwrap();
        assert_eq!(serde_json::Value::Object(patch), json!({"backgroundColor": "#FF0000"}));
    }

    #[tokio::test]
    async fn test_small_typo_still_matches() {
        let stage = FuzzyStage::new(ExemplarCorpus::builtin(), 0.3);
        let patch = stage.attempt("حاشیه  را گرد کن").await.unwrap();
        assert_eq!(patch["borderRadius"], "8px");
    }

    #[tokio::test]
    async fn test_distant_text_is_rejected() {
        let stage = FuzzyStage::new(ExemplarCorpus::builtin(), 0.3);
        assert!(stage.attempt("عرض رو 300 بذار").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_corpus_never_matches() {
        let stage = FuzzyStage::new(ExemplarCorpus::default(), 1.0);
        assert!(stage.attempt("anything").await.is_none());
    }
}
