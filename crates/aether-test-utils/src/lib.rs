//! Testing utilities for the Aether workspace
//!
//! Shared test helpers and fixtures:
//! - [`ScriptedApi`]: in-memory [`AnalysisApi`] with per-endpoint scripts
//!   (payload, HTTP failure, delay, never-resolving) and a call log
//! - [`fixtures`]: realistic response bodies

#![allow(missing_docs)]

pub mod fixtures;

use aether_client::{
    AnalysisApi, AnalysisPayload, AnomalyResult, CleanOutcome, CleaningOperation, ClientError,
    ClientResult, ClusterResult, Correlation, Created, Hypothesis, InventoryResponse, NewProject,
    NewStory, Preview, Recommendation, StorySuggestion, UploadRequest, UploadResponse,
};
use aether_core::{Audience, DatasetId, InventoryDraft, ProjectId, StoryId, StoryType};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Key used for endpoints without a path identifier
pub const NO_ID: &str = "";

/// Key matching any identifier not scripted explicitly
pub const ANY_ID: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateProject,
    CreateInventory,
    Upload,
    Clean,
    Preview,
    SuggestStories,
    Hypotheses,
    CreateStory,
    Analysis,
    Correlations,
    Recommendations,
    Clusters,
    Anomalies,
}

#[derive(Debug, Clone)]
enum Outcome {
    Respond(Value),
    Status(u16),
    Hang,
}

#[derive(Debug, Clone)]
struct Script {
    outcome: Outcome,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub key: String,
}

#[derive(Debug, Default)]
struct State {
    scripts: HashMap<(Endpoint, String), Script>,
    calls: Vec<Call>,
}

impl State {
    fn lookup(&self, endpoint: Endpoint, key: &str) -> Option<Script> {
        self.scripts
            .get(&(endpoint, key.to_string()))
            .or_else(|| self.scripts.get(&(endpoint, ANY_ID.to_string())))
            .cloned()
    }
}

/// Scripted analysis service
///
/// Unscripted calls answer HTTP 404. Re-scripting an endpoint replaces the
/// previous script, which is how retries are exercised.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    state: Mutex<State>,
    base_url: String,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            base_url: "http://scripted".to_string(),
        }
    }

    fn script(&self, endpoint: Endpoint, key: &str, outcome: Outcome) -> &Self {
        let mut state = self.state.lock();
        let delay = state
            .scripts
            .get(&(endpoint, key.to_string()))
            .and_then(|s| s.delay);
        state
            .scripts
            .insert((endpoint, key.to_string()), Script { outcome, delay });
        self
    }

    /// Answer with `body`
    pub fn respond(&self, endpoint: Endpoint, key: &str, body: Value) -> &Self {
        self.script(endpoint, key, Outcome::Respond(body))
    }

    /// Answer with an HTTP error status
    pub fn fail(&self, endpoint: Endpoint, key: &str, status: u16) -> &Self {
        self.script(endpoint, key, Outcome::Status(status))
    }

    /// Never answer
    pub fn hang(&self, endpoint: Endpoint, key: &str) -> &Self {
        self.script(endpoint, key, Outcome::Hang)
    }

    /// Delay the scripted answer (applies to the current and later scripts)
    pub fn delay(&self, endpoint: Endpoint, key: &str, delay: Duration) -> &Self {
        let mut state = self.state.lock();
        let script = state
            .scripts
            .entry((endpoint, key.to_string()))
            .or_insert(Script {
                outcome: Outcome::Status(404),
                delay: None,
            });
        script.delay = Some(delay);
        drop(state);
        self
    }

    /// Every call so far, in issue order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Number of calls to an endpoint
    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    /// Whether an endpoint was called for a key
    pub fn called(&self, endpoint: Endpoint, key: &str) -> bool {
        self.state
            .lock()
            .calls
            .iter()
            .any(|c| c.endpoint == endpoint && c.key == key)
    }

    /// Script every dashboard endpoint of `story` with the fixtures
    pub fn with_dashboard(self, story: &str) -> Self {
        self.respond(Endpoint::Analysis, story, fixtures::analysis_payload())
            .respond(Endpoint::Correlations, story, fixtures::correlations())
            .respond(Endpoint::Recommendations, story, fixtures::recommendations())
            .respond(Endpoint::Clusters, story, fixtures::clusters())
            .respond(Endpoint::Anomalies, story, fixtures::anomalies());
        self
    }

    async fn play<T: DeserializeOwned>(&self, endpoint: Endpoint, key: &str) -> ClientResult<T> {
        let script = {
            let mut state = self.state.lock();
            state.calls.push(Call {
                endpoint,
                key: key.to_string(),
            });
            state.lookup(endpoint, key)
        };

        let Some(script) = script else {
            return Err(ClientError::Status {
                status: 404,
                body: format!("no script for {endpoint:?} {key}"),
            });
        };

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        match script.outcome {
            Outcome::Respond(body) => Ok(serde_json::from_value(body)?),
            Outcome::Status(status) => Err(ClientError::Status {
                status,
                body: format!("scripted failure for {endpoint:?} {key}"),
            }),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl AnalysisApi for ScriptedApi {
    async fn create_project(&self, _project: &NewProject) -> ClientResult<ProjectId> {
        let created: Created<ProjectId> = self.play(Endpoint::CreateProject, NO_ID).await?;
        Ok(created.id)
    }

    async fn create_inventory(
        &self,
        project_id: &ProjectId,
        _inventory: &InventoryDraft,
    ) -> ClientResult<InventoryResponse> {
        self.play(Endpoint::CreateInventory, project_id.as_str()).await
    }

    async fn upload(&self, upload: &UploadRequest) -> ClientResult<UploadResponse> {
        let response: UploadResponse = self.play(Endpoint::Upload, &upload.file_name).await?;
        if response.resolved_id().is_none() {
            return Err(ClientError::MissingField("dataset_id"));
        }
        Ok(response)
    }

    async fn clean(
        &self,
        dataset_id: &DatasetId,
        _operation: &CleaningOperation,
    ) -> ClientResult<CleanOutcome> {
        self.play(Endpoint::Clean, dataset_id.as_str()).await
    }

    async fn preview(&self, dataset_id: &DatasetId) -> ClientResult<Preview> {
        self.play(Endpoint::Preview, dataset_id.as_str()).await
    }

    async fn suggest_stories(&self, dataset_id: &DatasetId) -> ClientResult<Vec<StorySuggestion>> {
        self.play(Endpoint::SuggestStories, dataset_id.as_str()).await
    }

    async fn hypotheses(
        &self,
        dataset_id: &DatasetId,
        _story_type: StoryType,
        _audience: Audience,
    ) -> ClientResult<Vec<Hypothesis>> {
        #[derive(serde::Deserialize)]
        struct Envelope {
            hypotheses: Vec<Hypothesis>,
        }
        let envelope: Envelope = self.play(Endpoint::Hypotheses, dataset_id.as_str()).await?;
        Ok(envelope.hypotheses)
    }

    async fn create_story(&self, story: &NewStory) -> ClientResult<StoryId> {
        let created: Created<StoryId> = self
            .play(Endpoint::CreateStory, story.dataset_id.as_str())
            .await?;
        Ok(created.id)
    }

    async fn analysis(&self, story_id: &StoryId) -> ClientResult<AnalysisPayload> {
        self.play(Endpoint::Analysis, story_id.as_str()).await
    }

    async fn correlations(&self, story_id: &StoryId) -> ClientResult<Vec<Correlation>> {
        self.play(Endpoint::Correlations, story_id.as_str()).await
    }

    async fn recommendations(&self, story_id: &StoryId) -> ClientResult<Vec<Recommendation>> {
        self.play(Endpoint::Recommendations, story_id.as_str()).await
    }

    async fn clusters(&self, story_id: &StoryId) -> ClientResult<ClusterResult> {
        self.play(Endpoint::Clusters, story_id.as_str()).await
    }

    async fn anomalies(&self, story_id: &StoryId) -> ClientResult<AnomalyResult> {
        self.play(Endpoint::Anomalies, story_id.as_str()).await
    }

    fn report_url(&self, story_id: &StoryId) -> String {
        format!("{}/reports/{story_id}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_calls_are_404_and_logged() {
        let api = ScriptedApi::new();
        let err = api.analysis(&StoryId::new("S1")).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(api.called(Endpoint::Analysis, "S1"));
        assert_eq!(api.count(Endpoint::Correlations), 0);
    }

    #[tokio::test]
    async fn wildcard_and_rescripting() {
        let api = ScriptedApi::new();
        api.fail(Endpoint::Analysis, ANY_ID, 500);
        assert_eq!(
            api.analysis(&StoryId::new("S9")).await.unwrap_err().status(),
            Some(500)
        );

        api.respond(Endpoint::Analysis, "S9", fixtures::analysis_payload());
        assert!(api.analysis(&StoryId::new("S9")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_kept_across_rescripting() {
        let api = ScriptedApi::new().with_dashboard("S1");
        api.delay(Endpoint::Correlations, "S1", Duration::from_secs(5));
        api.respond(Endpoint::Correlations, "S1", fixtures::correlations());

        let started = tokio::time::Instant::now();
        api.correlations(&StoryId::new("S1")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
