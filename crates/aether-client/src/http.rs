//! HTTP implementation of [`AnalysisApi`] over `reqwest`

use crate::api::AnalysisApi;
use crate::error::{ClientError, ClientResult};
use crate::payload::{
    AnalysisPayload, AnomalyResult, CleanOutcome, CleaningOperation, ClusterResult, Correlation,
    CorrelationsEnvelope, Created, Hypothesis, HypothesesEnvelope, InventoryResponse, NewProject,
    NewStory, Preview, Recommendation, RecommendationsEnvelope, StorySuggestion, UploadRequest,
    UploadResponse,
};
use aether_core::{ApiConfig, Audience, DatasetId, InventoryDraft, ProjectId, StoryId, StoryType};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Error bodies longer than this are cut before being stored
const MAX_ERROR_BODY: usize = 512;

/// Analysis service client over HTTP
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: Url,
}

impl HttpAnalysisClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// `ClientError::InvalidUrl` for a malformed base URL,
    /// `ClientError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Create client around an existing `reqwest::Client`
    ///
    /// # Errors
    /// `ClientError::InvalidUrl` for a malformed base URL
    pub fn with_client(client: Client, base_url: &str) -> ClientResult<Self> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { client, base_url })
    }

    /// Service base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        Self::send(self.client.get(url)).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        Self::send(self.client.post(url).json(body)).await
    }

    /// Send and decode, mapping non-success statuses to `ClientError::Status`
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "analysis service returned error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        tracing::debug!(%url, bytes = body.len(), "analysis service responded");
        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait::async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn create_project(&self, project: &NewProject) -> ClientResult<ProjectId> {
        let created: Created<ProjectId> = self.post_json(&["projects"], project).await?;
        Ok(created.id)
    }

    async fn create_inventory(
        &self,
        project_id: &ProjectId,
        inventory: &InventoryDraft,
    ) -> ClientResult<InventoryResponse> {
        self.post_json(&["projects", project_id.as_str(), "inventory"], inventory)
            .await
    }

    async fn upload(&self, upload: &UploadRequest) -> ClientResult<UploadResponse> {
        let url = self.endpoint(&["upload"])?;
        let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        let mut form = Form::new().part("file", part);
        if let Some(project_id) = &upload.project_id {
            form = form.text("project_id", project_id.to_string());
        }

        let response: UploadResponse = Self::send(self.client.post(url).multipart(form)).await?;
        if response.resolved_id().is_none() {
            return Err(ClientError::MissingField("dataset_id"));
        }
        Ok(response)
    }

    async fn clean(
        &self,
        dataset_id: &DatasetId,
        operation: &CleaningOperation,
    ) -> ClientResult<CleanOutcome> {
        self.post_json(&["datasets", dataset_id.as_str(), "clean"], operation)
            .await
    }

    async fn preview(&self, dataset_id: &DatasetId) -> ClientResult<Preview> {
        self.get_json(&["datasets", dataset_id.as_str(), "preview"])
            .await
    }

    async fn suggest_stories(&self, dataset_id: &DatasetId) -> ClientResult<Vec<StorySuggestion>> {
        let url = self.endpoint(&["stories", "suggest", dataset_id.as_str()])?;
        Self::send(self.client.post(url)).await
    }

    async fn hypotheses(
        &self,
        dataset_id: &DatasetId,
        story_type: StoryType,
        audience: Audience,
    ) -> ClientResult<Vec<Hypothesis>> {
        let url = self.endpoint(&["ai", "hypotheses", dataset_id.as_str()])?;
        let request = self.client.get(url).query(&[
            ("story_type", story_type.as_str()),
            ("target_audience", audience.as_str()),
        ]);
        let envelope: HypothesesEnvelope = Self::send(request).await?;
        Ok(envelope.hypotheses)
    }

    async fn create_story(&self, story: &NewStory) -> ClientResult<StoryId> {
        let created: Created<StoryId> = self.post_json(&["stories"], story).await?;
        Ok(created.id)
    }

    async fn analysis(&self, story_id: &StoryId) -> ClientResult<AnalysisPayload> {
        self.get_json(&["analysis", story_id.as_str()]).await
    }

    async fn correlations(&self, story_id: &StoryId) -> ClientResult<Vec<Correlation>> {
        let envelope: CorrelationsEnvelope =
            self.get_json(&["ai", "correlations", story_id.as_str()]).await?;
        Ok(envelope.correlations)
    }

    async fn recommendations(&self, story_id: &StoryId) -> ClientResult<Vec<Recommendation>> {
        let envelope: RecommendationsEnvelope = self
            .get_json(&["ai", "recommendations", story_id.as_str()])
            .await?;
        Ok(envelope.recommendations)
    }

    async fn clusters(&self, story_id: &StoryId) -> ClientResult<ClusterResult> {
        self.get_json(&["ml", "cluster", story_id.as_str()]).await
    }

    async fn anomalies(&self, story_id: &StoryId) -> ClientResult<AnomalyResult> {
        self.get_json(&["ml", "anomalies", story_id.as_str()]).await
    }

    fn report_url(&self, story_id: &StoryId) -> String {
        match self.endpoint(&["reports", story_id.as_str()]) {
            Ok(url) => url.into(),
            Err(_) => format!(
                "{}/reports/{story_id}",
                self.base_url.as_str().trim_end_matches('/')
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpAnalysisClient {
        HttpAnalysisClient::with_client(Client::new(), base).unwrap()
    }

    #[test]
    fn endpoint_joins_segments() {
        let url = client("http://127.0.0.1:8000").endpoint(&["analysis", "S1"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/analysis/S1");

        let url = client("http://host/api/").endpoint(&["ml", "cluster", "7"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/ml/cluster/7");
    }

    #[test]
    fn endpoint_encodes_ids() {
        let url = client("http://host").endpoint(&["analysis", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://host/analysis/a%2Fb%20c");
    }

    #[test]
    fn report_url_points_at_reports() {
        let url = client("http://host:8000/").report_url(&StoryId::new("42"));
        assert_eq!(url, "http://host:8000/reports/42");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(HttpAnalysisClient::with_client(Client::new(), "mailto:a@b").is_err());
        assert!(HttpAnalysisClient::with_client(Client::new(), "not a url").is_err());
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let cut = truncate(body);
        assert!(cut.len() <= MAX_ERROR_BODY);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
