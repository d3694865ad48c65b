//! Aether Core - wizard state and heuristics
//!
//! The synchronous half of the analytics wizard:
//! - Threads the project -> dataset -> story identity chain through seven stages
//! - Ranks success metrics, stakeholders and ethical constraints for an objective
//! - Raises a single risk callout per objective
//! - Loads and validates configuration
//!
//! # Example
//!
//! ```rust
//! use aether_core::prelude::*;
//!
//! let ranked = suggest("reduce customer churn", &KnowledgeBase::success_metrics());
//! assert!(ranked.iter().any(|s| s.label == "Churn Rate" && s.selected));
//!
//! let risk = assess_risk("reduce customer churn").unwrap();
//! assert_eq!(risk.severity, Severity::High);
//!
//! let mut pipeline = StagePipeline::new();
//! pipeline.advance(StagePayload::Project(ProjectId::new("1"))).unwrap();
//! assert_eq!(pipeline.current(), Stage::DataInventory);
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod project;
pub mod risk;
pub mod scoring;
pub mod story;
pub mod types;

pub use config::{
    load_config, validate_config, AetherConfig, ApiConfig, KnowledgeOverrides, LoggingConfig,
    OrchestratorConfig, RiskConfig, ScoringConfig,
};
pub use error::{ConfigError, DraftError, PipelineError};
pub use pipeline::{
    allowed_transitions, validate_transition, IdentityKind, PipelineState, Stage, StagePayload,
    StagePipeline,
};
pub use project::{
    LabelSet, Objective, PresetObjective, Project, ProjectDraft, PRESET_CONSTRAINTS,
    PRESET_STAKEHOLDERS,
};
pub use risk::{assess_risk, RiskMonitor, RiskRecord, RiskRule, RiskRuleset, Severity};
pub use scoring::{
    keyword_hits, suggest, suggest_with_threshold, KnowledgeBase, KnowledgeEntry, Suggestion,
    SuggestionBoard, DEFAULT_SELECTION_THRESHOLD,
};
pub use story::{AnalysisDepth, Audience, Story, StoryDraft, StoryType};
pub use types::{
    Dataset, DatasetId, EnrichmentKind, InventoryDraft, InventoryId, ProjectId, Sensitivity,
    StoryId, SuggestionCategory,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Aether Core
    pub use crate::{
        assess_risk, suggest, DatasetId, KnowledgeBase, ProjectId, Severity, Stage, StagePayload,
        StagePipeline, StoryId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
