//! Analysis service contract
//!
//! Every endpoint the wizard consumes, as one async trait. The HTTP
//! implementation lives in [`crate::http`]; tests script it in memory.

use crate::error::ClientResult;
use crate::payload::{
    AnalysisPayload, AnomalyResult, CleanOutcome, CleaningOperation, ClusterResult, Correlation,
    Hypothesis, InventoryResponse, NewProject, NewStory, Preview, Recommendation,
    StorySuggestion, UploadRequest, UploadResponse,
};
use aether_core::{Audience, DatasetId, InventoryDraft, ProjectId, StoryId, StoryType};

/// Remote analysis service
///
/// Implement this trait to back the wizard with a real or scripted service.
#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `POST /projects`
    async fn create_project(&self, project: &NewProject) -> ClientResult<ProjectId>;

    /// `POST /projects/{id}/inventory`
    async fn create_inventory(
        &self,
        project_id: &ProjectId,
        inventory: &InventoryDraft,
    ) -> ClientResult<InventoryResponse>;

    /// `POST /upload` (multipart)
    async fn upload(&self, upload: &UploadRequest) -> ClientResult<UploadResponse>;

    /// `POST /datasets/{id}/clean`
    async fn clean(
        &self,
        dataset_id: &DatasetId,
        operation: &CleaningOperation,
    ) -> ClientResult<CleanOutcome>;

    /// `GET /datasets/{id}/preview`
    async fn preview(&self, dataset_id: &DatasetId) -> ClientResult<Preview>;

    /// `POST /stories/suggest/{dataset_id}`
    async fn suggest_stories(&self, dataset_id: &DatasetId) -> ClientResult<Vec<StorySuggestion>>;

    /// `GET /ai/hypotheses/{dataset_id}`
    async fn hypotheses(
        &self,
        dataset_id: &DatasetId,
        story_type: StoryType,
        audience: Audience,
    ) -> ClientResult<Vec<Hypothesis>>;

    /// `POST /stories`
    async fn create_story(&self, story: &NewStory) -> ClientResult<StoryId>;

    /// `GET /analysis/{story_id}` (primary payload)
    async fn analysis(&self, story_id: &StoryId) -> ClientResult<AnalysisPayload>;

    /// `GET /ai/correlations/{story_id}`
    async fn correlations(&self, story_id: &StoryId) -> ClientResult<Vec<Correlation>>;

    /// `GET /ai/recommendations/{story_id}`
    async fn recommendations(&self, story_id: &StoryId) -> ClientResult<Vec<Recommendation>>;

    /// `GET /ml/cluster/{story_id}`
    async fn clusters(&self, story_id: &StoryId) -> ClientResult<ClusterResult>;

    /// `GET /ml/anomalies/{story_id}`
    async fn anomalies(&self, story_id: &StoryId) -> ClientResult<AnomalyResult>;

    /// Address of `GET /reports/{story_id}`; opening it is up to the caller
    fn report_url(&self, story_id: &StoryId) -> String;
}
