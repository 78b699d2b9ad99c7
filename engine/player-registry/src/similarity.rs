//! String similarity used to suggest statistics names for unresolved players

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

/// Scores how alike two names are; higher means more similar
pub trait Similarity {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Which similarity measure the resolver uses for suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    /// Edit-distance ratio over sorted name tokens (0-100)
    #[default]
    TokenSort,
    /// Skim fuzzy subsequence score
    Skim,
}

impl SimilarityKind {
    pub fn build(self) -> Box<dyn Similarity> {
        match self {
            SimilarityKind::TokenSort => Box::new(TokenSortRatio),
            SimilarityKind::Skim => Box::new(SkimSimilarity::default()),
        }
    }
}

/// Token-sort ratio: `100 * normalized_levenshtein` over the names'
/// lowercase tokens sorted alphabetically, so "Allen Josh" matches
/// "josh allen" exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl TokenSortRatio {
    fn sorted_tokens(name: &str) -> String {
        let lowered = name.to_lowercase();
        let mut tokens: Vec<&str> =
            lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
}

impl Similarity for TokenSortRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        // Both empty normalizes to 1.0
        100.0 * normalized_levenshtein(&Self::sorted_tokens(a), &Self::sorted_tokens(b))
    }
}

/// Skim matcher, the same scorer the player ID mapping tooling uses
///
/// Skim scores are asymmetric (pattern vs. choice), so both directions are
/// tried and the better one kept. No match scores 0.
#[derive(Default)]
pub struct SkimSimilarity {
    matcher: SkimMatcherV2,
}

impl Similarity for SkimSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let forward = self.matcher.fuzzy_match(b, a).unwrap_or(0);
        let backward = self.matcher.fuzzy_match(a, b).unwrap_or(0);
        forward.max(backward).max(0) as f64
    }
}
