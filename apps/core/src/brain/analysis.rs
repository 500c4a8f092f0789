//! Analysis and response records produced per request.
//!
//! Both are built fresh for every request and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::rules::Category;

/// CBT signals detected in a client utterance.
///
/// Every field is a deduplicated sequence in first-seen order, so two
/// classifications of the same text serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TccAnalysis {
    pub cognitive_patterns: Vec<String>,
    pub emotional_indicators: Vec<String>,
    pub behavioral_concerns: Vec<String>,
    /// Techniques in rule-table order
    pub suggested_techniques: Vec<String>,
    /// Raw triggers that matched the input
    pub tcc_keywords: Vec<String>,
}

impl TccAnalysis {
    pub fn is_empty(&self) -> bool {
        self.cognitive_patterns.is_empty()
            && self.emotional_indicators.is_empty()
            && self.behavioral_concerns.is_empty()
            && self.suggested_techniques.is_empty()
            && self.tcc_keywords.is_empty()
    }
}

/// Output of the classifier: the analysis plus the category policy decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// First matching category in rule order, `General` if none matched
    pub category: Category,
    /// Every matching category, in rule order
    pub matched_categories: Vec<Category>,
    pub analysis: TccAnalysis,
}

impl Classification {
    pub fn general(analysis: TccAnalysis) -> Self {
        Self {
            category: Category::General,
            matched_categories: vec![],
            analysis,
        }
    }

    /// True when no rule matched and the general fallback was used
    pub fn is_fallback(&self) -> bool {
        self.matched_categories.is_empty()
    }

    /// Categories whose homework applies to this classification
    pub fn homework_categories(&self) -> Vec<Category> {
        if self.matched_categories.is_empty() {
            vec![Category::General]
        } else {
            self.matched_categories.clone()
        }
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Category: {}, Matched: {}, Indicators: {:?}, Patterns: {}, Techniques: {}",
            self.category,
            self.matched_categories.len(),
            self.analysis.emotional_indicators,
            self.analysis.cognitive_patterns.len(),
            self.analysis.suggested_techniques.len()
        )
    }
}

/// Text returned by the backing model together with the measured call duration
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub elapsed: Duration,
}

/// Body of a successful `/inference` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TccResponse {
    pub response: String,
    /// Whitespace-delimited word count, not the model's own token accounting
    pub tokens_generated: usize,
    /// Seconds, rounded to two decimals
    pub inference_time: f64,
    pub model: String,
    /// Unix seconds at composition time
    pub timestamp: i64,
    pub tcc_analysis: TccAnalysis,
    pub homework_suggestions: Vec<String>,
    pub category: Category,
    pub demo_mode: bool,
}

/// Append `item` unless it is already present
pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique_keeps_first_seen_order() {
        let mut list = Vec::new();
        push_unique(&mut list, "b");
        push_unique(&mut list, "a");
        push_unique(&mut list, "b");
        assert_eq!(list, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_general_classification() {
        let classification = Classification::general(TccAnalysis::default());
        assert!(classification.is_fallback());
        assert!(classification.analysis.is_empty());
        assert_eq!(classification.homework_categories(), vec![Category::General]);
        assert!(classification.summary().contains("Category: general"));
    }
}
