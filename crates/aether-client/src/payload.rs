//! Wire payloads exchanged with the analysis service
//!
//! Request bodies are built from the core drafts. Response types keep every
//! optional part as `Option` or a defaulted collection so a partially
//! populated answer still decodes.

use aether_core::{
    Audience, DatasetId, DraftError, InventoryId, ProjectDraft, ProjectId, StoryDraft, StoryType,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Response carrying only a service-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Created<I> {
    /// Assigned identifier
    pub id: I,
}

/// `POST /projects` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    /// Project title
    pub title: String,
    /// Objective text
    pub objective: String,
    /// Stakeholder labels
    pub stakeholders: Vec<String>,
    /// Ethical-constraint labels
    pub ethical_constraints: Vec<String>,
}

impl From<&ProjectDraft> for NewProject {
    fn from(draft: &ProjectDraft) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            objective: draft.objective.text().to_string(),
            stakeholders: draft.stakeholders.to_vec(),
            ethical_constraints: draft.ethical_constraints.to_vec(),
        }
    }
}

/// `POST /projects/{id}/inventory` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryResponse {
    /// Stored inventory entry
    pub inventory: Created<InventoryId>,
    /// Human-readable risk lines derived from the declared sensitivity
    #[serde(default)]
    pub risk_assessment: Vec<String>,
}

/// File to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// File name sent with the multipart part
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
    /// Owning project, if known
    pub project_id: Option<ProjectId>,
}

impl UploadRequest {
    /// Create new upload
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            project_id: None,
        }
    }

    /// With owning project
    #[must_use]
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// Note attached to an upload by the privacy scan
///
/// The scan reports findings as `{type, column}` objects, scan failures as
/// `{error}` objects and unsupported formats as bare strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadWarning {
    /// Sensitive data found in a column
    Finding {
        /// Finding kind (Email, Phone, ...)
        #[serde(rename = "type")]
        kind: String,
        /// Affected column
        #[serde(default)]
        column: Option<String>,
    },
    /// The scan itself failed
    ScanError {
        /// Failure description
        error: String,
    },
    /// Plain message
    Message(String),
    /// Any other shape, kept verbatim
    Other(Value),
}

impl fmt::Display for UploadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finding {
                kind,
                column: Some(column),
            } => write!(f, "{kind} detected in column '{column}'"),
            Self::Finding { kind, column: None } => write!(f, "{kind} detected"),
            Self::ScanError { error } => f.write_str(error),
            Self::Message(message) => f.write_str(message),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// `POST /upload` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    /// Preferred identifier field
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    /// Fallback identifier field
    #[serde(default)]
    pub id: Option<DatasetId>,
    /// Free-form storage note
    #[serde(default)]
    pub info: Value,
    /// Privacy findings
    #[serde(default)]
    pub warnings: Vec<UploadWarning>,
}

impl UploadResponse {
    /// Dataset id from `dataset_id`, else `id`
    #[must_use]
    pub fn resolved_id(&self) -> Option<&DatasetId> {
        self.dataset_id.as_ref().or(self.id.as_ref())
    }
}

/// Imputation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeMethod {
    /// Column mean (numeric only)
    #[default]
    Mean,
    /// Column median (numeric only)
    Median,
    /// Most frequent value
    Mode,
    /// Caller-supplied value
    Constant,
}

/// `POST /datasets/{id}/clean` body
///
/// Serializes as `{"operation": ..., "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "snake_case")]
pub enum CleaningOperation {
    /// Remove duplicate rows; idempotent
    DropDuplicates {},
    /// Remove a column
    DropColumn {
        /// Column to drop
        column: String,
    },
    /// Rename a column
    RenameColumn {
        /// Current name
        old_name: String,
        /// New name
        new_name: String,
    },
    /// Fill missing values
    Impute {
        /// Column to fill
        column: String,
        /// Strategy
        method: ImputeMethod,
        /// Fill value for [`ImputeMethod::Constant`]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Mask a PII column
    Anonymize {
        /// Column to mask
        column: String,
    },
}

impl CleaningOperation {
    /// Operation name on the wire
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DropDuplicates {} => "drop_duplicates",
            Self::DropColumn { .. } => "drop_column",
            Self::RenameColumn { .. } => "rename_column",
            Self::Impute { .. } => "impute",
            Self::Anonymize { .. } => "anonymize",
        }
    }

    /// Check required parameters before sending
    ///
    /// # Errors
    /// `DraftError::MissingColumn` if a column parameter is blank
    pub fn validate(&self) -> Result<(), DraftError> {
        let columns: Vec<&str> = match self {
            Self::DropDuplicates {} => Vec::new(),
            Self::DropColumn { column }
            | Self::Anonymize { column }
            | Self::Impute { column, .. } => {
                vec![column.as_str()]
            }
            Self::RenameColumn { old_name, new_name } => vec![old_name.as_str(), new_name.as_str()],
        };
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(DraftError::MissingColumn(self.name()));
        }
        Ok(())
    }
}

/// `POST /datasets/{id}/clean` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CleanOutcome {
    /// Status word
    #[serde(default)]
    pub status: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Column flagged as personal data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PiiWarning {
    /// Column name
    pub column: String,
    /// PII kind, if reported
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// `GET /datasets/{id}/preview` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Preview {
    /// Column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Sample rows keyed by column
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
    /// Personal data findings
    #[serde(default)]
    pub pii_warnings: Vec<PiiWarning>,
}

/// `POST /stories` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStory {
    /// Title
    pub title: String,
    /// Business objective
    pub business_objective: String,
    /// Depth level 1..=3
    pub level: u8,
    /// Free-form context
    pub context: String,
    /// Hypotheses
    pub hypotheses: Vec<String>,
    /// Story type
    pub story_type: StoryType,
    /// Target audience
    pub target_audience: Audience,
    /// Dataset analysed
    pub dataset_id: DatasetId,
}

impl NewStory {
    /// Build from a draft and the dataset it analyses
    #[must_use]
    pub fn new(draft: &StoryDraft, dataset_id: DatasetId) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            business_objective: draft.business_objective.clone(),
            level: draft.level.level(),
            context: draft.context.clone(),
            hypotheses: draft.hypotheses.clone(),
            story_type: draft.story_type,
            target_audience: draft.target_audience,
            dataset_id,
        }
    }
}

/// `POST /stories/suggest/{dataset_id}` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySuggestion {
    /// Suggested title
    pub title: String,
    /// Suggested context
    pub context: String,
}

/// Generated hypothesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Hypothesis family (trend, comparison, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Question to test
    pub question: String,
    /// Why the question is worth testing
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HypothesesEnvelope {
    #[serde(default)]
    pub(crate) hypotheses: Vec<Hypothesis>,
}

/// Dataset shape after automatic cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetInfo {
    /// Rows after cleaning
    pub rows: u64,
    /// Column count
    pub columns: u64,
    /// Rows before cleaning
    pub initial_rows: u64,
    /// Duplicates dropped
    pub duplicates_removed: u64,
    /// Missing cells per column (only non-zero entries)
    pub missing_values: BTreeMap<String, u64>,
}

/// Data health percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthScores {
    /// Overall health
    pub overall: f64,
    /// Share of non-missing cells
    pub completeness: f64,
    /// Share of unique rows
    pub uniqueness: f64,
    /// Share of valid values
    pub validity: f64,
}

/// Automatic insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Insight family (volume, quality, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Finding text
    #[serde(default)]
    pub finding: String,
    /// low | medium | high
    #[serde(default)]
    pub priority: String,
}

/// `GET /analysis/{story_id}` response (primary payload)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    /// Dataset shape
    #[serde(default)]
    pub dataset_info: DatasetInfo,
    /// Column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Chart description
    #[serde(default)]
    pub visualization: Option<Value>,
    /// Automatic insights
    #[serde(default)]
    pub auto_insights: Vec<Insight>,
    /// Health scores
    #[serde(default)]
    pub health_scores: HealthScores,
    /// Describe-style summary statistics
    #[serde(default)]
    pub summary_stats: Option<Value>,
    /// Bias findings
    #[serde(default)]
    pub bias_warnings: Option<Vec<Value>>,
    /// Fairness metrics
    #[serde(default)]
    pub fairness_scores: Option<Value>,
    /// Data card
    #[serde(default)]
    pub data_card: Option<Value>,
    /// Skewness, kurtosis and quantiles
    #[serde(default)]
    pub advanced_stats: Option<Value>,
    /// Histograms
    #[serde(default)]
    pub distributions: Option<Value>,
    /// Correlation heatmap
    #[serde(default)]
    pub correlations: Option<Value>,
}

/// Discovered correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// First variable
    pub var1: String,
    /// Second variable
    pub var2: String,
    /// Coefficient
    pub correlation: f64,
    /// positive | negative
    #[serde(default)]
    pub direction: String,
    /// moderate | strong
    #[serde(default)]
    pub strength: String,
    /// Plain-language summary
    #[serde(default)]
    pub insight: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrelationsEnvelope {
    #[serde(default)]
    pub(crate) correlations: Vec<Correlation>,
}

/// Recommended action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short action title
    pub action: String,
    /// low | medium | high
    #[serde(default)]
    pub priority: String,
    /// Details
    #[serde(default)]
    pub description: String,
    /// Grouping (Data Quality, Business, ...)
    #[serde(default)]
    pub category: String,
    /// Expected effect
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsEnvelope {
    #[serde(default)]
    pub(crate) recommendations: Vec<Recommendation>,
}

/// One discovered cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Share of rows in the cluster
    #[serde(default)]
    pub percentage: f64,
    /// Distinguishing features
    #[serde(default)]
    pub characteristics: Value,
}

/// `GET /ml/cluster/{story_id}` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterResult {
    /// Clusters
    pub clusters: Vec<Cluster>,
    /// Scatter points
    pub plot_data: Vec<Value>,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
}

/// `GET /ml/anomalies/{story_id}` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyResult {
    /// Number of anomalous rows
    pub anomaly_count: u64,
    /// Share of anomalous rows
    pub anomaly_percentage: f64,
    /// Highest-scoring anomalies
    pub top_anomalies: Vec<Value>,
}
