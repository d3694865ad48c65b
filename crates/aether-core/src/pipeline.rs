//! Stage Pipeline Controller
//!
//! Holds the current wizard stage and the identity chain
//! (project id -> dataset id -> story id).
//!
//! The stage graph is strictly linear: every stage may move one step
//! forward (when its identifier is known) or one step back. Going back never
//! clears stored identifiers; only [`StagePipeline::reset`] does.

use crate::error::PipelineError;
use crate::types::{DatasetId, ProjectId, StoryId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard stage
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Stage {
    /// 1. Declare title, objective, stakeholders and constraints
    #[default]
    ProjectScope,
    /// 2. Describe the data source and its sensitivity
    DataInventory,
    /// 3. Confirm success metrics
    SuccessMetrics,
    /// 4. Upload the dataset
    UploadData,
    /// 5. Interactive cleaning
    CleanPrep,
    /// 6. Define the data story
    DefineStory,
    /// 7. Analytics dashboard (terminal)
    DeepInsights,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 7] = [
        Stage::ProjectScope,
        Stage::DataInventory,
        Stage::SuccessMetrics,
        Stage::UploadData,
        Stage::CleanPrep,
        Stage::DefineStory,
        Stage::DeepInsights,
    ];

    /// One-based position in the pipeline
    #[inline]
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Stage::ProjectScope => 1,
            Stage::DataInventory => 2,
            Stage::SuccessMetrics => 3,
            Stage::UploadData => 4,
            Stage::CleanPrep => 5,
            Stage::DefineStory => 6,
            Stage::DeepInsights => 7,
        }
    }

    /// Stage at a one-based position
    #[inline]
    #[must_use]
    pub fn from_index(index: u8) -> Option<Stage> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::ProjectScope => "Project Scope",
            Stage::DataInventory => "Data Inventory",
            Stage::SuccessMetrics => "Success Metrics",
            Stage::UploadData => "Upload Data",
            Stage::CleanPrep => "Clean & Prep",
            Stage::DefineStory => "Define Story",
            Stage::DeepInsights => "Deep Insights",
        }
    }

    /// Following stage, `None` at the terminal stage
    #[inline]
    #[must_use]
    pub fn next(self) -> Option<Stage> {
        Self::from_index(self.index() + 1)
    }

    /// Preceding stage, `None` at the first stage
    #[inline]
    #[must_use]
    pub fn previous(self) -> Option<Stage> {
        Self::from_index(self.index() - 1)
    }

    /// Whether this stage has no forward transition
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Identifier that must be known before leaving this stage
    #[must_use]
    pub fn required_identifier(self) -> Option<IdentityKind> {
        match self {
            Stage::ProjectScope | Stage::DataInventory | Stage::SuccessMetrics => {
                Some(IdentityKind::Project)
            }
            Stage::UploadData | Stage::CleanPrep => Some(IdentityKind::Dataset),
            Stage::DefineStory => Some(IdentityKind::Story),
            Stage::DeepInsights => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which link of the identity chain a stage depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    /// Project id
    Project,
    /// Dataset id
    Dataset,
    /// Story id
    Story,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityKind::Project => "project id",
            IdentityKind::Dataset => "dataset id",
            IdentityKind::Story => "story id",
        };
        f.write_str(name)
    }
}

/// Stages reachable from `from` in one transition
#[must_use]
pub fn allowed_transitions(from: Stage) -> Vec<Stage> {
    from.next().into_iter().chain(from.previous()).collect()
}

/// Validates a stage-graph edge (ignores identifier requirements)
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), PipelineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else if from.is_terminal() && to > from {
        Err(PipelineError::TerminalStage(from))
    } else {
        Err(PipelineError::invalid(from, format!("no edge to {to}")))
    }
}

/// Data produced by a successful stage submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePayload {
    /// Nothing new; carry the chain forward
    Continue,
    /// Project created (stage 1)
    Project(ProjectId),
    /// Success metrics confirmed (stage 3)
    Metrics(Vec<String>),
    /// Upload completed (stage 4)
    Dataset(DatasetId),
    /// Story created (stage 6)
    Story(StoryId),
}

impl StagePayload {
    /// Stage this payload belongs to, `None` for [`StagePayload::Continue`]
    #[must_use]
    pub fn origin(&self) -> Option<Stage> {
        match self {
            StagePayload::Continue => None,
            StagePayload::Project(_) => Some(Stage::ProjectScope),
            StagePayload::Metrics(_) => Some(Stage::SuccessMetrics),
            StagePayload::Dataset(_) => Some(Stage::UploadData),
            StagePayload::Story(_) => Some(Stage::DefineStory),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            StagePayload::Continue => "continue",
            StagePayload::Project(_) => "project",
            StagePayload::Metrics(_) => "metrics",
            StagePayload::Dataset(_) => "dataset",
            StagePayload::Story(_) => "story",
        }
    }
}

/// Snapshot of the session's position and identity chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    /// Current stage
    pub current: Stage,
    /// Project id (stage 1 output)
    pub project_id: Option<ProjectId>,
    /// Dataset id (stage 4 output)
    pub dataset_id: Option<DatasetId>,
    /// Story id (stage 6 output)
    pub story_id: Option<StoryId>,
    /// Metrics confirmed at stage 3
    pub selected_metrics: Vec<String>,
}

impl PipelineState {
    /// Whether the given identity link is set
    #[must_use]
    pub fn has(&self, kind: IdentityKind) -> bool {
        match kind {
            IdentityKind::Project => self.project_id.is_some(),
            IdentityKind::Dataset => self.dataset_id.is_some(),
            IdentityKind::Story => self.story_id.is_some(),
        }
    }
}

/// Stage pipeline controller
///
/// The session context object passed to every stage. Mutation happens only
/// through [`advance`](Self::advance), [`retreat`](Self::retreat) and
/// [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct StagePipeline {
    state: PipelineState,
}

impl StagePipeline {
    /// Create pipeline at stage 1 with an empty identity chain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage
    #[inline]
    #[must_use]
    pub fn current(&self) -> Stage {
        self.state.current
    }

    /// Full state snapshot
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Project id, if stage 1 has succeeded
    #[inline]
    #[must_use]
    pub fn project_id(&self) -> Option<&ProjectId> {
        self.state.project_id.as_ref()
    }

    /// Dataset id, if an upload has completed
    #[inline]
    #[must_use]
    pub fn dataset_id(&self) -> Option<&DatasetId> {
        self.state.dataset_id.as_ref()
    }

    /// Story id, if a story has been created
    #[inline]
    #[must_use]
    pub fn story_id(&self) -> Option<&StoryId> {
        self.state.story_id.as_ref()
    }

    /// Metrics confirmed at stage 3
    #[inline]
    #[must_use]
    pub fn selected_metrics(&self) -> &[String] {
        &self.state.selected_metrics
    }

    /// Move exactly one stage forward
    ///
    /// Stores the identifier carried by `payload`, then requires the current
    /// stage's identifier to be known. Nothing is mutated on failure.
    ///
    /// # Errors
    /// - `PipelineError::TerminalStage` at stage 7
    /// - `PipelineError::InvalidTransition` if the payload belongs to another
    ///   stage or the stage's required identifier is still missing
    pub fn advance(&mut self, payload: StagePayload) -> Result<Stage, PipelineError> {
        let from = self.state.current;
        let Some(to) = from.next() else {
            return Err(PipelineError::TerminalStage(from));
        };

        if let Some(origin) = payload.origin() {
            if origin != from {
                return Err(PipelineError::invalid(
                    from,
                    format!("{} payload belongs to {origin}", payload.describe()),
                ));
            }
        }

        let mut next = self.state.clone();
        match payload {
            StagePayload::Continue => {}
            StagePayload::Project(id) => next.project_id = Some(id),
            StagePayload::Metrics(metrics) => next.selected_metrics = metrics,
            StagePayload::Dataset(id) => {
                if next.dataset_id.as_ref() != Some(&id) {
                    next.story_id = None;
                }
                next.dataset_id = Some(id);
            }
            StagePayload::Story(id) => next.story_id = Some(id),
        }

        if let Some(required) = from.required_identifier() {
            if !next.has(required) {
                tracing::warn!(stage = %from, missing = %required, "advance refused");
                return Err(PipelineError::invalid(from, format!("{required} missing")));
            }
        }

        validate_transition(from, to)?;
        next.current = to;
        self.state = next;

        tracing::info!(from = %from, to = %to, "stage advanced");
        Ok(to)
    }

    /// Move one stage back, keeping stored identifiers
    ///
    /// No-op at stage 1.
    pub fn retreat(&mut self) -> Stage {
        if let Some(previous) = self.state.current.previous() {
            tracing::info!(from = %self.state.current, to = %previous, "stage retreated");
            self.state.current = previous;
        }
        self.state.current
    }

    /// Clear the identity chain and return to stage 1
    pub fn reset(&mut self) {
        tracing::info!(from = %self.state.current, "pipeline reset");
        self.state = PipelineState::default();
    }
}
