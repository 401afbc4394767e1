//! Mood polarity scoring.
//!
//! The scorer only needs a single number in `[-1.0, 1.0]`, so analyzers sit
//! behind [`PolarityAnalyzer`] and tests can swap in a fixed value.

use std::collections::HashMap;

pub trait PolarityAnalyzer: Send + Sync {
    /// Emotional valence of `text`, -1.0 most negative.
    fn polarity(&self, text: &str) -> f64;
}

/// Word-level lexicon analyzer with intensifier and negation handling.
pub struct LexiconAnalyzer {
    polarities: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negators: &'static [&'static str],
}

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 2;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            polarities: Self::build_polarity_lexicon(),
            intensifiers: Self::build_intensifier_lexicon(),
            negators: &[
                "not", "no", "never", "don't", "dont", "can't", "cant", "cannot", "isn't",
                "wasn't", "won't", "didn't", "doesn't", "nothing", "hardly",
            ],
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .map(|token| token.trim_matches('\''))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn is_negator(&self, token: &str) -> bool {
        self.negators.contains(&token)
    }

    fn build_polarity_lexicon() -> HashMap<&'static str, f64> {
        [
            // Positive
            ("good", 0.7),
            ("great", 0.8),
            ("happy", 0.8),
            ("glad", 0.5),
            ("excited", 0.6),
            ("motivated", 0.5),
            ("confident", 0.5),
            ("calm", 0.3),
            ("fine", 0.4),
            ("okay", 0.5),
            ("ok", 0.5),
            ("positive", 0.3),
            ("hopeful", 0.5),
            ("optimistic", 0.5),
            ("proud", 0.8),
            ("love", 0.5),
            ("enjoy", 0.4),
            ("relaxed", 0.3),
            ("energetic", 0.5),
            ("focused", 0.4),
            ("amazing", 0.6),
            ("awesome", 1.0),
            ("wonderful", 1.0),
            ("better", 0.5),
            ("best", 1.0),
            ("nice", 0.6),
            ("cheerful", 0.6),
            ("content", 0.3),
            ("grateful", 0.6),
            ("interested", 0.3),
            // Negative
            ("bad", -0.7),
            ("sad", -0.5),
            ("unhappy", -0.6),
            ("tired", -0.4),
            ("exhausted", -0.6),
            ("stressed", -0.5),
            ("anxious", -0.5),
            ("worried", -0.4),
            ("lonely", -0.6),
            ("alone", -0.3),
            ("bored", -0.5),
            ("angry", -0.5),
            ("upset", -0.5),
            ("frustrated", -0.6),
            ("overwhelmed", -0.6),
            ("depressed", -0.8),
            ("miserable", -0.9),
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("worse", -0.6),
            ("hate", -0.8),
            ("lost", -0.4),
            ("scared", -0.6),
            ("afraid", -0.6),
            ("hopeless", -0.8),
            ("worthless", -0.8),
            ("useless", -0.7),
            ("empty", -0.5),
            ("broken", -0.6),
            ("failing", -0.6),
            ("failure", -0.7),
            ("pointless", -0.7),
            ("struggling", -0.5),
            ("unmotivated", -0.5),
            ("down", -0.3),
        ]
        .into_iter()
        .collect()
    }

    fn build_intensifier_lexicon() -> HashMap<&'static str, f64> {
        [
            ("very", 1.3),
            ("really", 1.3),
            ("so", 1.3),
            ("extremely", 1.5),
            ("totally", 1.4),
            ("completely", 1.4),
            ("super", 1.3),
            ("quite", 1.1),
            ("slightly", 0.6),
            ("somewhat", 0.7),
        ]
        .into_iter()
        .collect()
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        let mut scores = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            let Some(&base) = self.polarities.get(token.as_str()) else {
                continue;
            };

            let mut value = base;
            if let Some(previous) = index.checked_sub(1).map(|i| tokens[i].as_str()) {
                if let Some(&factor) = self.intensifiers.get(previous) {
                    value = (value * factor).clamp(-1.0, 1.0);
                }
            }

            let window_start = index.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..index]
                .iter()
                .any(|t| self.is_negator(t))
            {
                value *= NEGATION_FACTOR;
            }

            scores.push(value);
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}
