//! Project scope (stage 1)
//!
//! A project is drafted locally: title, objective and two label sets that
//! the user toggles. Submission freezes it into a [`Project`] once the
//! service has assigned an identifier.

use crate::error::DraftError;
use crate::types::ProjectId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preset objectives offered in the project scope step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetObjective {
    /// Predict which customers will leave
    ChurnPrediction,
    /// Understand how users behave
    BehavioralAnalysis,
    /// Track sentiment and engagement
    SentimentTracking,
    /// Spot unusual usage
    UsageAnomalyDetection,
    /// Audit data practices against ethical rules
    EthicalComplianceAuditing,
}

impl PresetObjective {
    /// All presets in display order
    pub const ALL: [PresetObjective; 5] = [
        PresetObjective::ChurnPrediction,
        PresetObjective::BehavioralAnalysis,
        PresetObjective::SentimentTracking,
        PresetObjective::UsageAnomalyDetection,
        PresetObjective::EthicalComplianceAuditing,
    ];

    /// Display label (also sent to the service)
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PresetObjective::ChurnPrediction => "Churn Prediction",
            PresetObjective::BehavioralAnalysis => "Behavioral Analysis",
            PresetObjective::SentimentTracking => "Sentiment & Engagement Tracking",
            PresetObjective::UsageAnomalyDetection => "Anomaly Detection in Usage",
            PresetObjective::EthicalComplianceAuditing => "Ethical Compliance Auditing",
        }
    }
}

/// Project objective: a fixed selection or free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// One of the preset objectives
    Preset(PresetObjective),
    /// User-written objective
    Custom(String),
}

impl Objective {
    /// Objective text as scored and submitted
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Objective::Preset(preset) => preset.label(),
            Objective::Custom(text) => text.as_str(),
        }
    }
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Custom(String::new())
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Preset ethical constraints
pub const PRESET_CONSTRAINTS: [&str; 5] = [
    "GDPR/CCPA compliance check",
    "Bias detection in ML models",
    "Data minimization principles",
    "Transparency & consent management",
    "Fairness in prediction outputs",
];

/// Preset stakeholder roles
pub const PRESET_STAKEHOLDERS: [&str; 5] = [
    "Product Owner / Manager",
    "Data Engineer",
    "Data Scientist / Analyst",
    "Legal / Compliance Officer",
    "Users / Community Representative",
];

/// Unique, order-insensitive label set
///
/// Keeps insertion order for display; equality ignores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(IndexSet<String>);

impl LabelSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the label if absent, remove it if present
    ///
    /// Labels are trimmed; blank labels are ignored. Returns whether the
    /// label is selected afterwards.
    pub fn toggle(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        if self.0.shift_remove(label) {
            false
        } else {
            self.0.insert(label.to_string());
            true
        }
    }

    /// Insert without toggling
    pub fn insert(&mut self, label: &str) -> bool {
        let label = label.trim();
        !label.is_empty() && self.0.insert(label.to_string())
    }

    /// Whether the label is selected
    #[inline]
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label.trim())
    }

    /// Number of labels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no label is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Labels not present in `catalogue` (user-added entries)
    pub fn custom<'a>(&'a self, catalogue: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        self.iter().filter(move |label| !catalogue.contains(label))
    }

    /// Owned copy of the labels in insertion order
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl PartialEq for LabelSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|label| other.0.contains(label))
    }
}

impl Eq for LabelSet {}

impl<S: AsRef<str>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label.as_ref());
        }
        set
    }
}

/// Project being edited in stage 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Project title
    pub title: String,
    /// Objective
    pub objective: Objective,
    /// Stakeholder labels
    pub stakeholders: LabelSet,
    /// Ethical-constraint labels
    pub ethical_constraints: LabelSet,
}

impl ProjectDraft {
    /// Create new draft
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// With objective
    #[inline]
    #[must_use]
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// With stakeholder selected
    #[inline]
    #[must_use]
    pub fn with_stakeholder(mut self, label: &str) -> Self {
        self.stakeholders.insert(label);
        self
    }

    /// With ethical constraint selected
    #[inline]
    #[must_use]
    pub fn with_constraint(mut self, label: &str) -> Self {
        self.ethical_constraints.insert(label);
        self
    }

    /// Check the draft can be submitted
    ///
    /// # Errors
    /// - `DraftError::BlankTitle` if the title is blank
    /// - `DraftError::BlankObjective` if a custom objective is blank
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::BlankTitle);
        }
        if let Objective::Custom(text) = &self.objective {
            if text.trim().is_empty() {
                return Err(DraftError::BlankObjective);
            }
        }
        Ok(())
    }

    /// Freeze the draft under the identifier the service assigned
    #[must_use]
    pub fn into_project(self, id: ProjectId) -> Project {
        Project {
            id,
            title: self.title,
            objective: self.objective,
            stakeholders: self.stakeholders,
            ethical_constraints: self.ethical_constraints,
        }
    }
}

/// Submitted project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Service-assigned identifier
    pub id: ProjectId,
    /// Project title
    pub title: String,
    /// Objective
    pub objective: Objective,
    /// Stakeholder labels
    pub stakeholders: LabelSet,
    /// Ethical-constraint labels
    pub ethical_constraints: LabelSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = LabelSet::new();
        assert!(set.toggle("Data Engineer"));
        assert!(set.contains("Data Engineer"));
        assert!(!set.toggle(" Data Engineer "));
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_ignores_blank_labels() {
        let mut set = LabelSet::new();
        assert!(!set.toggle("   "));
        assert!(set.is_empty());
    }

    #[test]
    fn label_set_equality_ignores_order() {
        let a: LabelSet = ["x", "y"].into_iter().collect();
        let b: LabelSet = ["y", "x", "y"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn custom_labels_exclude_catalogue() {
        let set: LabelSet = [PRESET_CONSTRAINTS[0], "No dark patterns"].into_iter().collect();
        let custom: Vec<_> = set.custom(&PRESET_CONSTRAINTS).collect();
        assert_eq!(custom, vec!["No dark patterns"]);
    }

    #[test]
    fn draft_requires_title() {
        let draft = ProjectDraft::new("  ")
            .with_objective(Objective::Preset(PresetObjective::ChurnPrediction));
        assert_eq!(draft.validate(), Err(DraftError::BlankTitle));
    }

    #[test]
    fn draft_requires_custom_objective_text() {
        let draft = ProjectDraft::new("Q4 churn");
        assert_eq!(draft.validate(), Err(DraftError::BlankObjective));

        let draft = draft.with_objective(Objective::Custom("reduce customer churn".into()));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_freezes_into_project() {
        let project = ProjectDraft::new("Q4 churn")
            .with_objective(Objective::Preset(PresetObjective::ChurnPrediction))
            .with_stakeholder("Data Engineer")
            .into_project(ProjectId::new("7"));

        assert_eq!(project.id.as_str(), "7");
        assert_eq!(project.objective.text(), "Churn Prediction");
        assert!(project.stakeholders.contains("Data Engineer"));
    }
}
