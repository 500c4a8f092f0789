//! TCC Text Classification using the static rule table.
//!
//! Maps a client utterance to detected cognitive patterns, emotional
//! indicators, behavioral concerns and suggested techniques.
//! Pure keyword matching: no model, no I/O, no mutable state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use super::analysis::{push_unique, Classification, TccAnalysis};
use super::rules::{
    distortion_label, DISTORTION_TRIGGERS, GENERAL_TECHNIQUES, RESTRUCTURING_TECHNIQUE, RULES,
};

/// How triggers are located in the normalized text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain containment: a trigger inside a longer word still counts
    #[default]
    Substring,
    /// The trigger must start a word ("tenso" no longer matches "intenso")
    WordPrefix,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "word_prefix" | "whole_word" | "word" => Ok(MatchMode::WordPrefix),
            other => Err(format!("unknown match mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub match_mode: MatchMode,
}

// Triggers are static and escaped, so building these cannot fail at runtime
static RULE_WORD_PATTERNS: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| rule.triggers.iter().map(|t| word_prefix_regex(t)).collect())
        .collect()
});

static DISTORTION_WORD_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| DISTORTION_TRIGGERS.iter().map(|t| word_prefix_regex(t)).collect());

fn word_prefix_regex(trigger: &str) -> Regex {
    Regex::new(&format!(r"\b{}", regex::escape(trigger)))
        .expect("Invalid regex: escaped trigger pattern")
}

/// Rule-table classifier
#[derive(Debug, Clone, Default)]
pub struct TccClassifier {
    config: ClassifierConfig,
}

impl TccClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn match_mode(&self) -> MatchMode {
        self.config.match_mode
    }

    /// Triggers from `triggers` found in `text`
    fn hits(
        &self,
        text: &str,
        triggers: &'static [&'static str],
        patterns: &[Regex],
    ) -> Vec<&'static str> {
        match self.config.match_mode {
            MatchMode::Substring => triggers
                .iter()
                .copied()
                .filter(|trigger| text.contains(trigger))
                .collect(),
            MatchMode::WordPrefix => triggers
                .iter()
                .copied()
                .zip(patterns)
                .filter(|(_, pattern)| pattern.is_match(text))
                .map(|(trigger, _)| trigger)
                .collect(),
        }
    }

    /// Classify a client utterance. Never fails; the worst case is the general fallback.
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = text.trim().to_lowercase();

        if normalized.is_empty() {
            return Classification::general(TccAnalysis::default());
        }

        let mut analysis = TccAnalysis::default();
        let mut matched_categories = Vec::new();

        let no_patterns: &[Regex] = &[];
        for (index, rule) in RULES.iter().enumerate() {
            let patterns = match self.config.match_mode {
                MatchMode::WordPrefix => RULE_WORD_PATTERNS[index].as_slice(),
                MatchMode::Substring => no_patterns,
            };
            let hits = self.hits(&normalized, rule.triggers, patterns);
            if hits.is_empty() {
                continue;
            }

            matched_categories.push(rule.category);
            push_unique(&mut analysis.emotional_indicators, rule.emotional_indicator);
            for pattern in rule.cognitive_patterns {
                push_unique(&mut analysis.cognitive_patterns, pattern);
            }
            for concern in rule.behavioral_concerns {
                push_unique(&mut analysis.behavioral_concerns, concern);
            }
            for technique in rule.techniques {
                push_unique(&mut analysis.suggested_techniques, technique);
            }
            for hit in hits {
                push_unique(&mut analysis.tcc_keywords, hit);
            }
        }

        if matched_categories.is_empty() {
            for technique in GENERAL_TECHNIQUES {
                push_unique(&mut analysis.suggested_techniques, technique);
            }
        }

        let patterns = match self.config.match_mode {
            MatchMode::WordPrefix => DISTORTION_WORD_PATTERNS.as_slice(),
            MatchMode::Substring => no_patterns,
        };
        let distortions = self.hits(&normalized, DISTORTION_TRIGGERS, patterns);
        for trigger in &distortions {
            push_unique(&mut analysis.cognitive_patterns, &distortion_label(trigger));
            push_unique(&mut analysis.tcc_keywords, trigger);
        }
        if !distortions.is_empty() {
            push_unique(&mut analysis.suggested_techniques, RESTRUCTURING_TECHNIQUE);
        }

        match matched_categories.first().copied() {
            Some(category) => Classification {
                category,
                matched_categories,
                analysis,
            },
            None => Classification::general(analysis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::rules::Category;

    #[test]
    fn test_anxiety_detection() {
        let classifier = TccClassifier::default();

        let result = classifier.classify("Estou muito ansioso com a prova de amanhã");
        assert_eq!(result.category, Category::Anxiety);
        assert!(result.analysis.emotional_indicators.contains(&"ansiedade".to_string()));
        assert!(result.analysis.tcc_keywords.contains(&"ansios".to_string()));
    }

    #[test]
    fn test_case_folding() {
        let classifier = TccClassifier::default();

        let result = classifier.classify("ESTOU TRISTE");
        assert_eq!(result.category, Category::Depression);
    }

    #[test]
    fn test_empty_input() {
        let classifier = TccClassifier::default();

        for input in ["", "   ", "\n\t"] {
            let result = classifier.classify(input);
            assert_eq!(result.category, Category::General);
            assert!(result.analysis.is_empty(), "expected empty analysis for {:?}", input);
            assert!(result.matched_categories.is_empty());
        }
    }

    #[test]
    fn test_substring_matches_inside_words() {
        let classifier = TccClassifier::default();

        // "tenso" is embedded in "intenso"
        let result = classifier.classify("O trabalho está intenso");
        assert_eq!(result.category, Category::Anxiety);
        assert_eq!(
            result.matched_categories,
            vec![Category::Anxiety, Category::WorkStress]
        );
    }

    #[test]
    fn test_word_prefix_mode() {
        let classifier = TccClassifier::new(ClassifierConfig {
            match_mode: MatchMode::WordPrefix,
        });

        let result = classifier.classify("O trabalho está intenso");
        assert_eq!(result.category, Category::WorkStress);
        assert_eq!(result.matched_categories, vec![Category::WorkStress]);

        // Stems still match at the start of a word
        let result = classifier.classify("Estou ansiosa");
        assert_eq!(result.category, Category::Anxiety);
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("substring".parse::<MatchMode>(), Ok(MatchMode::Substring));
        assert_eq!("WHOLE_WORD".parse::<MatchMode>(), Ok(MatchMode::WordPrefix));
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
