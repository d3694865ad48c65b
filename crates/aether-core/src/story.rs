//! Data story definition (stage 6)

use crate::error::DraftError;
use crate::types::{DatasetId, StoryId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of narrative the analysis should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    /// Open-ended exploration
    #[default]
    Exploratory,
    /// Change over time
    Trend,
    /// Segment against segment
    Comparative,
    /// Why something happened
    RootCause,
    /// What happens next
    Predictive,
}

impl StoryType {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoryType::Exploratory => "exploratory",
            StoryType::Trend => "trend",
            StoryType::Comparative => "comparative",
            StoryType::RootCause => "root_cause",
            StoryType::Predictive => "predictive",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the story is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Decision makers
    #[default]
    Executive,
    /// Analysts and engineers
    Technical,
    /// Everyone else
    General,
}

impl Audience {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Executive => "executive",
            Audience::Technical => "technical",
            Audience::General => "general",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis depth, ordinal 1..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AnalysisDepth(u8);

impl AnalysisDepth {
    /// Light cleaning, basic EDA, fast report
    pub const QUICK_SCAN: AnalysisDepth = AnalysisDepth(1);
    /// Full cleaning, feature engineering, pit-stop report
    pub const DEEP_ANALYSIS: AnalysisDepth = AnalysisDepth(2);
    /// Models, explainability, ethical checks
    pub const ADVANCED_ML: AnalysisDepth = AnalysisDepth(3);

    /// Numeric level
    #[inline]
    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    /// Display name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Quick Scan",
            2 => "Deep Analysis",
            _ => "Advanced ML/DL",
        }
    }
}

impl Default for AnalysisDepth {
    fn default() -> Self {
        Self::DEEP_ANALYSIS
    }
}

impl TryFrom<u8> for AnalysisDepth {
    type Error = DraftError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (1..=3).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DraftError::InvalidDepth(level))
        }
    }
}

impl From<AnalysisDepth> for u8 {
    fn from(depth: AnalysisDepth) -> Self {
        depth.0
    }
}

/// Story being edited in stage 6
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDraft {
    /// Story title
    pub title: String,
    /// Business objective the story answers
    pub business_objective: String,
    /// Analysis depth
    pub level: AnalysisDepth,
    /// Free-form context
    pub context: String,
    /// Hypotheses to test
    pub hypotheses: Vec<String>,
    /// Story type
    pub story_type: StoryType,
    /// Target audience
    pub target_audience: Audience,
}

impl StoryDraft {
    /// Create new draft
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, business_objective: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            business_objective: business_objective.into(),
            ..Self::default()
        }
    }

    /// With analysis depth
    #[inline]
    #[must_use]
    pub fn with_level(mut self, level: AnalysisDepth) -> Self {
        self.level = level;
        self
    }

    /// With story type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, story_type: StoryType) -> Self {
        self.story_type = story_type;
        self
    }

    /// With target audience
    #[inline]
    #[must_use]
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.target_audience = audience;
        self
    }

    /// Apply a service-suggested title and context
    ///
    /// The context doubles as the business objective.
    pub fn apply_suggestion(&mut self, title: &str, context: &str) {
        self.title = title.to_string();
        self.context = context.to_string();
        self.business_objective = context.to_string();
    }

    /// Attach a hypothesis, ignoring blanks and duplicates
    pub fn add_hypothesis(&mut self, hypothesis: &str) {
        let hypothesis = hypothesis.trim();
        if !hypothesis.is_empty() && !self.hypotheses.iter().any(|h| h == hypothesis) {
            self.hypotheses.push(hypothesis.to_string());
        }
    }

    /// Check the draft can be submitted
    ///
    /// # Errors
    /// `DraftError::BlankTitle` if the title is blank
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::BlankTitle);
        }
        Ok(())
    }

    /// Freeze the draft under the identifier the service assigned
    #[must_use]
    pub fn into_story(self, id: StoryId, dataset_id: DatasetId) -> Story {
        Story {
            id,
            dataset_id,
            draft: self,
        }
    }
}

/// Submitted story, read-only afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    /// Service-assigned identifier
    pub id: StoryId,
    /// Dataset the story analyses
    pub dataset_id: DatasetId,
    draft: StoryDraft,
}

impl Story {
    /// Title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.draft.title
    }

    /// Business objective
    #[inline]
    #[must_use]
    pub fn objective(&self) -> &str {
        &self.draft.business_objective
    }

    /// Analysis depth
    #[inline]
    #[must_use]
    pub fn level(&self) -> AnalysisDepth {
        self.draft.level
    }

    /// Story type
    #[inline]
    #[must_use]
    pub fn story_type(&self) -> StoryType {
        self.draft.story_type
    }

    /// Target audience
    #[inline]
    #[must_use]
    pub fn audience(&self) -> Audience {
        self.draft.target_audience
    }

    /// Hypotheses submitted with the story
    #[inline]
    #[must_use]
    pub fn hypotheses(&self) -> &[String] {
        &self.draft.hypotheses
    }
}
