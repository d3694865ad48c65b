//! Core types for Aether
//!
//! Defines the identity chain and the records the wizard threads through
//! its stages:
//! - Project, dataset and story identifiers
//! - Dataset references and data inventory drafts
//! - Suggestion categories shared by the scoring engine
//! - Enrichment kinds shared by configuration and the orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier as the analysis service sends it (integer or string)
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id
    Number(i64),
    /// String id
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "RawId", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            #[inline]
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the identifier text
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<RawId> for $name {
            fn from(raw: RawId) -> Self {
                Self(String::from(raw))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Project identifier, assigned by the service at stage 1 submission
    ProjectId
);
opaque_id!(
    /// Dataset identifier, assigned when an upload completes
    DatasetId
);
opaque_id!(
    /// Story identifier, assigned at story submission
    StoryId
);
opaque_id!(
    /// Data inventory entry identifier
    InventoryId
);

/// Uploaded dataset reference
///
/// Later stages hold this reference; the dataset itself is never copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset identifier
    pub id: DatasetId,
    /// Name of the uploaded source file
    pub source_file: String,
}

/// Sensitivity level declared in the data inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sensitivity {
    /// Open data
    Public,
    /// Company only
    #[default]
    Internal,
    /// PII or otherwise sensitive
    Restricted,
}

/// Data inventory entry described before upload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryDraft {
    /// Human name of the dataset
    pub dataset_name: String,
    /// Where the data comes from (CRM export, public API, ...)
    pub source: String,
    /// Declared sensitivity
    pub sensitivity: Sensitivity,
}

impl InventoryDraft {
    /// Create new inventory draft
    #[inline]
    #[must_use]
    pub fn new(dataset_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            source: source.into(),
            sensitivity: Sensitivity::default(),
        }
    }

    /// With sensitivity
    #[inline]
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

/// Category tag carried by every knowledge-base entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionCategory {
    /// Model and pipeline metrics
    Technical,
    /// Business outcome metrics
    Business,
    /// Fairness, consent and compliance
    Ethical,
    /// Data health
    Quality,
}

impl SuggestionCategory {
    /// Baseline score every entry of this category starts from
    ///
    /// Foundation categories are nudged upward regardless of text match.
    #[inline]
    #[must_use]
    pub fn base_bonus(self) -> f64 {
        match self {
            Self::Ethical | Self::Quality => 0.5,
            Self::Technical | Self::Business => 0.0,
        }
    }
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Technical => "Technical",
            Self::Business => "Business",
            Self::Ethical => "Ethical",
            Self::Quality => "Quality",
        };
        f.write_str(name)
    }
}

/// Enrichment payload kinds, each held in its own slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    /// Pairwise correlations, fetched automatically
    Correlations,
    /// Recommended actions, fetched automatically
    Recommendations,
    /// Clustering, fetched on demand
    Clusters,
    /// Anomaly detection, fetched on demand
    Anomalies,
}

impl EnrichmentKind {
    /// All kinds
    pub const ALL: [EnrichmentKind; 4] = [
        EnrichmentKind::Correlations,
        EnrichmentKind::Recommendations,
        EnrichmentKind::Clusters,
        EnrichmentKind::Anomalies,
    ];

    /// Kinds loaded right after the primary payload
    pub const AUTOMATIC: [EnrichmentKind; 2] =
        [EnrichmentKind::Correlations, EnrichmentKind::Recommendations];

    /// Kinds only loaded on explicit discovery
    pub const ON_DEMAND: [EnrichmentKind; 2] =
        [EnrichmentKind::Clusters, EnrichmentKind::Anomalies];

    /// Slot name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EnrichmentKind::Correlations => "correlations",
            EnrichmentKind::Recommendations => "recommendations",
            EnrichmentKind::Clusters => "clusters",
            EnrichmentKind::Anomalies => "anomalies",
        }
    }

    /// Whether the kind is expensive and only loaded on demand
    #[inline]
    #[must_use]
    pub fn is_on_demand(self) -> bool {
        matches!(self, EnrichmentKind::Clusters | EnrichmentKind::Anomalies)
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let from_number: DatasetId = serde_json::from_str("42").unwrap();
        let from_text: DatasetId = serde_json::from_str("\"42\"").unwrap();

        assert_eq!(from_number, from_text);
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = StoryId::new("S1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"S1\"");
    }

    #[test]
    fn base_bonus_only_for_foundation_categories() {
        assert_eq!(SuggestionCategory::Ethical.base_bonus(), 0.5);
        assert_eq!(SuggestionCategory::Quality.base_bonus(), 0.5);
        assert_eq!(SuggestionCategory::Business.base_bonus(), 0.0);
        assert_eq!(SuggestionCategory::Technical.base_bonus(), 0.0);
    }

    #[test]
    fn enrichment_kind_partitions() {
        assert!(EnrichmentKind::ON_DEMAND.iter().all(|k| k.is_on_demand()));
        assert!(EnrichmentKind::AUTOMATIC.iter().all(|k| !k.is_on_demand()));
        assert_eq!(
            serde_json::to_string(&EnrichmentKind::Clusters).unwrap(),
            "\"clusters\""
        );
    }

    #[test]
    fn inventory_defaults_to_internal() {
        let draft = InventoryDraft::new("crm", "CRM Export");
        assert_eq!(draft.sensitivity, Sensitivity::Internal);
    }
}
