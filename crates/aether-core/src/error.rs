//! Error types for Aether Core
//!
//! Provides error handling for:
//! - Stage transitions attempted without their required identifier
//! - Draft validation before submission
//! - Configuration loading

use crate::pipeline::Stage;

/// Stage pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Advance attempted without the identifier the stage requires,
    /// or with a payload that belongs to another stage
    #[error("invalid transition from {stage}: {reason}")]
    InvalidTransition {
        /// Stage the advance was attempted from
        stage: Stage,
        /// What was missing or mismatched
        reason: String,
    },

    /// Advance attempted from the terminal stage
    #[error("{0} is the final stage")]
    TerminalStage(Stage),
}

impl PipelineError {
    /// Create invalid transition error
    #[inline]
    pub fn invalid(stage: Stage, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            stage,
            reason: reason.into(),
        }
    }

    /// Stage the failed transition was attempted from
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidTransition { stage, .. } | Self::TerminalStage(stage) => *stage,
        }
    }
}

/// Draft validation errors raised before a submission is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// Project or story title is blank
    #[error("title must not be blank")]
    BlankTitle,

    /// Custom objective chosen but left empty
    #[error("custom objective must not be blank")]
    BlankObjective,

    /// Metrics confirmed with nothing selected
    #[error("at least one success metric must be selected")]
    NoMetricsSelected,

    /// Analysis depth outside 1..=3
    #[error("analysis depth must be between 1 and 3, got {0}")]
    InvalidDepth(u8),

    /// Cleaning operation without a target column
    #[error("cleaning operation `{0}` needs a column")]
    MissingColumn(&'static str),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File extension is neither YAML nor TOML
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Semantically invalid value
    #[error("invalid config: {0}")]
    Invalid(String),
}
