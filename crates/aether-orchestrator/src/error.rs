//! Error types for orchestration
//!
//! Provides error handling for:
//! - Primary and enrichment fetch failures
//! - Operations attempted before their preconditions hold
//! - Wizard submissions (pipeline, draft and transport failures)
//! - Unknown dashboard tab identifiers

use aether_client::ClientError;
use aether_core::{DraftError, EnrichmentKind, IdentityKind, PipelineError, Stage, StoryId};

/// Analysis orchestrator errors
///
/// A fetch that resolves after its story was deactivated is not an error;
/// it yields [`Resolution::Discarded`](crate::orchestrator::Resolution).
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Primary payload request failed; the stage shows its failure view
    #[error("primary analysis for story {story} failed: {source}")]
    PrimaryFetchFailure {
        /// Story the request was for
        story: StoryId,
        /// Transport cause
        #[source]
        source: ClientError,
    },

    /// One enrichment request failed; its slot stays empty
    #[error("{kind} for story {story} unavailable: {source}")]
    EnrichmentFetchFailure {
        /// Slot affected
        kind: EnrichmentKind,
        /// Story the request was for
        story: StoryId,
        /// Transport cause
        #[source]
        source: ClientError,
    },

    /// Enrichments requested before the primary payload loaded
    #[error("primary analysis for story {0} is not loaded")]
    PrimaryNotLoaded(StoryId),

    /// No story is active
    #[error("no active story")]
    NoActiveStory,
}

impl AnalysisError {
    /// Whether the whole stage must show its failure view
    #[must_use]
    pub fn is_fatal_to_stage(&self) -> bool {
        matches!(self, Self::PrimaryFetchFailure { .. })
    }

    /// Whether a manual retry could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PrimaryFetchFailure { source, .. }
            | Self::EnrichmentFetchFailure { source, .. } => source.is_retryable(),
            Self::PrimaryNotLoaded(_) | Self::NoActiveStory => false,
        }
    }
}

/// Wizard session errors
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Stage transition refused
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Draft failed local validation
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Service request failed
    #[error("service request failed: {0}")]
    Client(#[from] ClientError),

    /// Dashboard operation failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Operation belongs to another stage
    #[error("operation belongs to {expected}, current stage is {actual}")]
    WrongStage {
        /// Stage the operation needs
        expected: Stage,
        /// Stage the session is at
        actual: Stage,
    },

    /// Identity link missing for the operation
    #[error("{0} is not known yet")]
    MissingIdentity(IdentityKind),
}

/// Tab identifier not among the eight dashboard tabs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dashboard tab '{0}'")]
pub struct UnknownTab(pub String);

impl WizardError {
    /// Whether the user can fix the input and try again
    #[must_use]
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Self::Draft(_) | Self::Pipeline(PipelineError::InvalidTransition { .. })
        )
    }

    /// Whether resubmitting unchanged could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(err) => err.is_retryable(),
            Self::Analysis(err) => err.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_failure_is_fatal_enrichment_is_not() {
        let primary = AnalysisError::PrimaryFetchFailure {
            story: StoryId::new("S1"),
            source: ClientError::Status {
                status: 500,
                body: String::new(),
            },
        };
        let enrichment = AnalysisError::EnrichmentFetchFailure {
            kind: EnrichmentKind::Correlations,
            story: StoryId::new("S1"),
            source: ClientError::Timeout(100),
        };

        assert!(primary.is_fatal_to_stage());
        assert!(primary.is_retryable());
        assert!(!enrichment.is_fatal_to_stage());
        assert!(enrichment.to_string().contains("correlations"));
    }

    #[test]
    fn draft_errors_need_user_action() {
        let err = WizardError::from(DraftError::BlankTitle);
        assert!(err.requires_user_action());
        assert!(!err.is_retryable());

        let err = WizardError::WrongStage {
            expected: Stage::UploadData,
            actual: Stage::ProjectScope,
        };
        assert!(err.to_string().contains("Upload Data"));
    }
}
