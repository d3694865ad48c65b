//! Scoring Engine
//!
//! Maps free-text objectives to ranked suggestions drawn from a static
//! knowledge base.
//!
//! `score = category bonus + 2 * distinct keyword hits`
//!
//! - Keyword matching is case-insensitive substring containment
//! - Each keyword counts once, however often it occurs in the text
//! - Ranking is descending by score; ties keep declaration order
//! - Entries scoring above the selection threshold are auto-selected

use crate::types::SuggestionCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default auto-selection threshold (strictly greater than)
pub const DEFAULT_SELECTION_THRESHOLD: f64 = 1.0;

/// Score added per matching keyword
pub const KEYWORD_WEIGHT: f64 = 2.0;

/// One candidate suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Label shown to the user
    pub label: String,
    /// Category tag
    pub category: SuggestionCategory,
    /// Keywords, matched case-insensitively
    pub keywords: Vec<String>,
}

impl KnowledgeEntry {
    /// Create new entry
    #[must_use]
    pub fn new(label: impl Into<String>, category: SuggestionCategory, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            category,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Ordered table of knowledge entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Create from entries in declaration order
    #[must_use]
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Success metrics offered at stages 1 and 3
    #[must_use]
    pub fn success_metrics() -> Self {
        use SuggestionCategory::{Business, Ethical, Quality, Technical};
        Self::new(vec![
            KnowledgeEntry::new(
                "Churn Rate",
                Business,
                &["churn", "retention", "customer", "cancel"],
            ),
            KnowledgeEntry::new(
                "Customer Lifetime Value",
                Business,
                &["lifetime", "revenue", "upsell", "loyalty"],
            ),
            KnowledgeEntry::new(
                "Engagement Score",
                Business,
                &["engagement", "sentiment", "active", "behavior"],
            ),
            KnowledgeEntry::new(
                "Model F1 Score",
                Technical,
                &["predict", "model", "classif", "accuracy"],
            ),
            KnowledgeEntry::new(
                "Anomaly Detection Rate",
                Technical,
                &["anomal", "outlier", "fraud", "unusual"],
            ),
            KnowledgeEntry::new("Fairness Score", Ethical, &["fair", "bias", "churn", "customer"]),
            KnowledgeEntry::new(
                "Consent Coverage",
                Ethical,
                &["consent", "privacy", "gdpr", "tracking"],
            ),
            KnowledgeEntry::new(
                "Data Quality Index",
                Quality,
                &["quality", "data", "customer", "clean"],
            ),
            KnowledgeEntry::new("Data Completeness", Quality, &["missing", "complete", "coverage"]),
        ])
    }

    /// Stakeholder roles
    #[must_use]
    pub fn stakeholders() -> Self {
        use SuggestionCategory::{Business, Ethical, Technical};
        Self::new(vec![
            KnowledgeEntry::new(
                "Product Owner / Manager",
                Business,
                &["product", "churn", "growth", "engagement"],
            ),
            KnowledgeEntry::new(
                "Customer Success Team",
                Business,
                &["customer", "retention", "support", "satisfaction"],
            ),
            KnowledgeEntry::new(
                "Data Engineer",
                Technical,
                &["pipeline", "ingest", "etl", "quality"],
            ),
            KnowledgeEntry::new(
                "Data Scientist / Analyst",
                Technical,
                &["predict", "model", "behavior", "anomal"],
            ),
            KnowledgeEntry::new(
                "Legal / Compliance Officer",
                Ethical,
                &["compliance", "gdpr", "audit", "legal"],
            ),
            KnowledgeEntry::new(
                "Users / Community Representative",
                Ethical,
                &["user", "community", "fair", "tracking"],
            ),
        ])
    }

    /// Ethical constraints
    #[must_use]
    pub fn ethical_constraints() -> Self {
        use SuggestionCategory::{Ethical, Quality};
        Self::new(vec![
            KnowledgeEntry::new(
                "GDPR/CCPA compliance check",
                Ethical,
                &["gdpr", "ccpa", "privacy", "personal", "customer"],
            ),
            KnowledgeEntry::new(
                "Bias detection in ML models",
                Ethical,
                &["bias", "model", "churn", "segment"],
            ),
            KnowledgeEntry::new(
                "Data minimization principles",
                Quality,
                &["tracking", "behavior", "collect", "usage"],
            ),
            KnowledgeEntry::new(
                "Transparency & consent management",
                Ethical,
                &["consent", "transparen", "sentiment", "tracking"],
            ),
            KnowledgeEntry::new(
                "Fairness in prediction outputs",
                Ethical,
                &["predict", "fair", "churn", "scoring"],
            ),
        ])
    }

    /// Entries in declaration order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ranked suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Entry label
    pub label: String,
    /// Entry category
    pub category: SuggestionCategory,
    /// Relevance score, never negative
    pub score: f64,
    /// Auto-selection flag (user may toggle it afterwards)
    pub selected: bool,
}

/// Number of distinct keywords present in `text`
#[must_use]
pub fn keyword_hits(text: &str, keywords: &[String]) -> usize {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .count()
}

/// Rank the knowledge base against `text` with the default threshold
#[must_use]
pub fn suggest(text: &str, knowledge_base: &KnowledgeBase) -> Vec<Suggestion> {
    suggest_with_threshold(text, knowledge_base, DEFAULT_SELECTION_THRESHOLD)
}

/// Rank the knowledge base against `text`
///
/// Blank text scores every entry at its category bonus and selects nothing.
#[must_use]
pub fn suggest_with_threshold(
    text: &str,
    knowledge_base: &KnowledgeBase,
    threshold: f64,
) -> Vec<Suggestion> {
    let blank = text.trim().is_empty();

    let mut ranked: Vec<Suggestion> = knowledge_base
        .entries()
        .iter()
        .map(|entry| {
            let hits = if blank { 0 } else { keyword_hits(text, &entry.keywords) };
            #[allow(clippy::cast_precision_loss)]
            let score = entry.category.base_bonus() + KEYWORD_WEIGHT * hits as f64;
            Suggestion {
                label: entry.label.clone(),
                category: entry.category,
                score,
                selected: !blank && score > threshold,
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Suggestion list bound to one input field
///
/// Recomputes from scratch whenever the text changes, discarding the
/// previous ranking and any manual toggles.
#[derive(Debug, Clone)]
pub struct SuggestionBoard {
    knowledge_base: KnowledgeBase,
    threshold: f64,
    input: String,
    suggestions: Vec<Suggestion>,
}

impl SuggestionBoard {
    /// Create board over a knowledge base, scored for empty input
    #[must_use]
    pub fn new(knowledge_base: KnowledgeBase) -> Self {
        let suggestions = suggest("", &knowledge_base);
        Self {
            knowledge_base,
            threshold: DEFAULT_SELECTION_THRESHOLD,
            input: String::new(),
            suggestions,
        }
    }

    /// With selection threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self.suggestions = suggest_with_threshold(&self.input, &self.knowledge_base, threshold);
        self
    }

    /// Feed the current text; returns whether the ranking was recomputed
    pub fn update(&mut self, text: &str) -> bool {
        if text == self.input {
            return false;
        }
        self.input = text.to_string();
        self.suggestions = suggest_with_threshold(text, &self.knowledge_base, self.threshold);
        tracing::debug!(
            selected = self.suggestions.iter().filter(|s| s.selected).count(),
            "suggestions recomputed"
        );
        true
    }

    /// Flip a suggestion's selection; `None` if no entry has that label
    pub fn toggle(&mut self, label: &str) -> Option<bool> {
        let suggestion = self.suggestions.iter_mut().find(|s| s.label == label)?;
        suggestion.selected = !suggestion.selected;
        Some(suggestion.selected)
    }

    /// Last text fed to the board
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current ranking
    #[inline]
    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Labels currently selected, in rank order
    #[must_use]
    pub fn selected(&self) -> Vec<String> {
        self.suggestions
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn repeated_keyword_counts_once() {
        let keywords = vec!["churn".to_string(), "Churn".to_string(), " churn ".to_string()];
        assert_eq!(keyword_hits("reduce churn", &keywords), 1);

        let knowledge_base = KnowledgeBase::new(vec![KnowledgeEntry::new(
            "Churn Rate",
            SuggestionCategory::Business,
            &["churn", "churn"],
        )]);
        let ranked = suggest("churn churn", &knowledge_base);
        assert_eq!(ranked[0].score, 2.0);
    }

    fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.label.as_str())
            .collect()
    }

    #[test]
    fn churn_objective_selects_foundation_metrics() {
        let ranked = suggest("reduce customer churn", &KnowledgeBase::success_metrics());
        let selected = labels(&ranked);

        for expected in ["Churn Rate", "Fairness Score", "Data Quality Index"] {
            assert!(selected.contains(&expected), "{expected} not selected: {selected:?}");
        }
    }

    #[test]
    fn single_hit_without_bonus_is_selected() {
        let kb = KnowledgeBase::new(vec![KnowledgeEntry::new(
            "Churn Rate",
            SuggestionCategory::Business,
            &["churn"],
        )]);
        let ranked = suggest("churn", &kb);
        assert_eq!(ranked[0].score, 2.0);
        assert!(ranked[0].selected);
    }

    #[test]
    fn bonus_alone_is_not_selected() {
        let kb = KnowledgeBase::new(vec![KnowledgeEntry::new(
            "Consent Coverage",
            SuggestionCategory::Ethical,
            &["consent"],
        )]);
        let ranked = suggest("reduce customer churn", &kb);
        assert_eq!(ranked[0].score, 0.5);
        assert!(!ranked[0].selected);
    }

    #[test]
    fn keywords_count_once_and_ignore_case() {
        let keywords = vec!["churn".to_string(), "customer".to_string()];
        assert_eq!(keyword_hits("CHURN churn Churn", &keywords), 1);
        assert_eq!(keyword_hits("Customer churn", &keywords), 2);
    }

    #[test]
    fn blank_input_scores_base_bonus_only() {
        let kb = KnowledgeBase::success_metrics();
        let ranked = suggest_with_threshold("   ", &kb, 0.0);

        assert!(ranked.iter().all(|s| !s.selected));
        assert!(ranked
            .iter()
            .all(|s| (s.score - s.category.base_bonus()).abs() < f64::EPSILON));
    }

    #[test]
    fn ties_keep_declaration_order() {
        let kb = KnowledgeBase::new(vec![
            KnowledgeEntry::new("first", SuggestionCategory::Technical, &["x"]),
            KnowledgeEntry::new("second", SuggestionCategory::Business, &["x"]),
            KnowledgeEntry::new("third", SuggestionCategory::Quality, &["y"]),
        ]);
        let order: Vec<_> = suggest("x", &kb).into_iter().map(|s| s.label).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn board_resets_selection_on_new_text() {
        let mut board = SuggestionBoard::new(KnowledgeBase::success_metrics());
        assert!(board.update("reduce customer churn"));
        assert_eq!(board.toggle("Consent Coverage"), Some(true));
        assert!(board.selected().contains(&"Consent Coverage".to_string()));

        assert!(!board.update("reduce customer churn"));
        assert!(board.selected().contains(&"Consent Coverage".to_string()));

        assert!(board.update("detect fraud"));
        assert!(!board.selected().contains(&"Consent Coverage".to_string()));
        assert!(!board.selected().contains(&"Churn Rate".to_string()));
    }

    #[test]
    fn board_toggle_unknown_label() {
        let mut board = SuggestionBoard::new(KnowledgeBase::stakeholders());
        assert_eq!(board.toggle("Astronaut"), None);
    }

    #[test]
    fn default_tables_are_populated() {
        assert!(!KnowledgeBase::success_metrics().is_empty());
        assert_eq!(KnowledgeBase::stakeholders().len(), 6);
        assert_eq!(KnowledgeBase::ethical_constraints().len(), 5);
    }

    proptest! {
        #[test]
        fn suggest_is_deterministic(text in ".{0,64}") {
            let kb = KnowledgeBase::success_metrics();
            prop_assert_eq!(suggest(&text, &kb), suggest(&text, &kb));
        }

        #[test]
        fn ranking_is_sorted_and_non_negative(text in "[a-z ]{0,48}") {
            let kb = KnowledgeBase::ethical_constraints();
            let ranked = suggest(&text, &kb);
            prop_assert_eq!(ranked.len(), kb.len());
            prop_assert!(ranked.iter().all(|s| s.score >= 0.0));
            prop_assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
