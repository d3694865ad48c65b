//! Analysis Orchestrator
//!
//! Coordinates the dashboard fetches for one active story:
//! - One primary request, resolved before anything else is issued
//! - Automatic enrichments in parallel, each applied as it arrives
//! - On-demand discovery (clusters and anomalies) applied once both settle
//!
//! Every activation bumps a generation counter. A result whose generation
//! no longer matches is dropped as [`Resolution::Discarded`] so a late
//! answer for an abandoned story never lands in the current one.

use crate::error::AnalysisError;
use crate::slot::{FetchFailure, Slot};
use aether_client::{
    AnalysisApi, AnalysisPayload, AnomalyResult, ClientError, ClientResult, ClusterResult,
    Correlation, Recommendation,
};
use aether_core::{EnrichmentKind, OrchestratorConfig, StoryId};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Primary payload plus every enrichment slot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisBundle {
    /// `GET /analysis/{id}`
    pub primary: Slot<AnalysisPayload>,
    /// `GET /ai/correlations/{id}`
    pub correlations: Slot<Vec<Correlation>>,
    /// `GET /ai/recommendations/{id}`
    pub recommendations: Slot<Vec<Recommendation>>,
    /// `GET /ml/cluster/{id}`
    pub clusters: Slot<ClusterResult>,
    /// `GET /ml/anomalies/{id}`
    pub anomalies: Slot<AnomalyResult>,
}

impl AnalysisBundle {
    /// Whether an enrichment slot holds a payload
    #[must_use]
    pub fn is_ready(&self, kind: EnrichmentKind) -> bool {
        match kind {
            EnrichmentKind::Correlations => self.correlations.is_ready(),
            EnrichmentKind::Recommendations => self.recommendations.is_ready(),
            EnrichmentKind::Clusters => self.clusters.is_ready(),
            EnrichmentKind::Anomalies => self.anomalies.is_ready(),
        }
    }

    /// Whether an enrichment request is in flight
    #[must_use]
    pub fn is_loading(&self, kind: EnrichmentKind) -> bool {
        match kind {
            EnrichmentKind::Correlations => self.correlations.is_loading(),
            EnrichmentKind::Recommendations => self.recommendations.is_loading(),
            EnrichmentKind::Clusters => self.clusters.is_loading(),
            EnrichmentKind::Anomalies => self.anomalies.is_loading(),
        }
    }

    fn mark_loading(&mut self, kind: EnrichmentKind) {
        match kind {
            EnrichmentKind::Correlations => self.correlations = Slot::Loading,
            EnrichmentKind::Recommendations => self.recommendations = Slot::Loading,
            EnrichmentKind::Clusters => self.clusters = Slot::Loading,
            EnrichmentKind::Anomalies => self.anomalies = Slot::Loading,
        }
    }

    fn store(&mut self, value: Enrichment) {
        match value {
            Enrichment::Correlations(v) => self.correlations = Slot::Ready(v),
            Enrichment::Recommendations(v) => self.recommendations = Slot::Ready(v),
            Enrichment::Clusters(v) => self.clusters = Slot::Ready(v),
            Enrichment::Anomalies(v) => self.anomalies = Slot::Ready(v),
        }
    }

    fn fail(&mut self, kind: EnrichmentKind, err: &ClientError) {
        let failure = FetchFailure::from(err);
        match kind {
            EnrichmentKind::Correlations => self.correlations = Slot::Failed(failure),
            EnrichmentKind::Recommendations => self.recommendations = Slot::Failed(failure),
            EnrichmentKind::Clusters => self.clusters = Slot::Failed(failure),
            EnrichmentKind::Anomalies => self.anomalies = Slot::Failed(failure),
        }
    }
}

enum Enrichment {
    Correlations(Vec<Correlation>),
    Recommendations(Vec<Recommendation>),
    Clusters(ClusterResult),
    Anomalies(AnomalyResult),
}

/// On-demand discovery progress for the active story
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryState {
    /// Not triggered yet
    #[default]
    NotStarted,
    /// Both requests in flight
    Running,
    /// Both requests settled and at least one succeeded
    Done,
}

/// Everything the dashboard renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    /// Active story, `None` when no dashboard is open
    pub story_id: Option<StoryId>,
    /// Activation counter
    pub generation: u64,
    /// Fetched payloads
    pub bundle: AnalysisBundle,
    /// Discovery progress
    pub discovery: DiscoveryState,
}

/// How a settled fetch affected the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Result stored for the active story
    Applied,
    /// Story changed while in flight; result dropped
    Discarded,
    /// Nothing requested (discovery already ran)
    Skipped,
}

/// Per-slot outcome of [`AnalysisOrchestrator::load_enrichments`]
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    /// Slots that received a payload
    pub loaded: Vec<EnrichmentKind>,
    /// Slots left empty, with their cause
    pub failed: Vec<AnalysisError>,
    /// Results dropped because the story changed
    pub discarded: Vec<EnrichmentKind>,
}

impl EnrichmentReport {
    /// Whether the story changed while results were in flight
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        !self.discarded.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Ticket {
    story: StoryId,
    generation: u64,
}

/// Dashboard fetch coordinator
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    api: Arc<dyn AnalysisApi>,
    state: Arc<Mutex<DashboardState>>,
    primary_timeout: Option<Duration>,
    enrichment_timeout: Option<Duration>,
    auto_enrichments: Vec<EnrichmentKind>,
}

impl fmt::Debug for AnalysisOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisOrchestrator")
            .field("state", &*self.state.lock())
            .field("primary_timeout", &self.primary_timeout)
            .field("enrichment_timeout", &self.enrichment_timeout)
            .field("auto_enrichments", &self.auto_enrichments)
            .finish_non_exhaustive()
    }
}

impl AnalysisOrchestrator {
    /// Create orchestrator with no timeouts and the default automatic enrichments
    #[must_use]
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            state: Arc::default(),
            primary_timeout: None,
            enrichment_timeout: None,
            auto_enrichments: EnrichmentKind::AUTOMATIC.to_vec(),
        }
    }

    /// Create orchestrator from configuration
    #[must_use]
    pub fn from_config(api: Arc<dyn AnalysisApi>, config: &OrchestratorConfig) -> Self {
        Self::new(api)
            .with_primary_timeout(config.primary_timeout())
            .with_enrichment_timeout(config.enrichment_timeout())
            .with_auto_enrichments(config.auto_enrichments.clone())
    }

    /// With primary fetch timeout; elapsing counts as a primary failure
    #[inline]
    #[must_use]
    pub fn with_primary_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.primary_timeout = timeout;
        self
    }

    /// With enrichment timeout; elapsing leaves the slot empty
    #[inline]
    #[must_use]
    pub fn with_enrichment_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.enrichment_timeout = timeout;
        self
    }

    /// With enrichments loaded after the primary payload
    #[inline]
    #[must_use]
    pub fn with_auto_enrichments(mut self, kinds: Vec<EnrichmentKind>) -> Self {
        self.auto_enrichments = kinds;
        self
    }

    /// Make `story` the active story, clearing all slots
    ///
    /// Returns the new generation. Anything still in flight for an earlier
    /// activation will be discarded.
    pub fn activate(&self, story: StoryId) -> u64 {
        self.open(story).generation
    }

    /// Close the dashboard; in-flight results will be discarded
    pub fn deactivate(&self) {
        let mut state = self.state.lock();
        if let Some(story) = state.story_id.take() {
            tracing::info!(%story, "dashboard deactivated");
        }
        state.generation = state.generation.wrapping_add(1);
        state.bundle = AnalysisBundle::default();
        state.discovery = DiscoveryState::NotStarted;
    }

    /// Active story
    #[must_use]
    pub fn active_story(&self) -> Option<StoryId> {
        self.state.lock().story_id.clone()
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.state.lock().clone()
    }

    /// Read the current state without copying
    pub fn with_state<R>(&self, read: impl FnOnce(&DashboardState) -> R) -> R {
        read(&self.state.lock())
    }

    /// Activate `story`, load the primary payload, then the automatic enrichments
    ///
    /// Enrichments are only issued once the primary payload has loaded.
    ///
    /// # Errors
    /// `AnalysisError::PrimaryFetchFailure` if the primary request fails;
    /// enrichment failures only leave their slots empty
    pub async fn load(&self, story: StoryId) -> Result<Resolution, AnalysisError> {
        let ticket = self.open(story);
        match self.primary_for(&ticket).await? {
            Resolution::Applied => {}
            other => return Ok(other),
        }

        if self.auto_enrichments.is_empty() {
            return Ok(Resolution::Applied);
        }
        let report = self.enrichments_for(&ticket, &self.auto_enrichments).await?;
        if report.is_superseded() {
            return Ok(Resolution::Discarded);
        }
        Ok(Resolution::Applied)
    }

    /// Fetch the primary payload for the active story
    ///
    /// Never retried automatically; call again to retry.
    ///
    /// # Errors
    /// - `AnalysisError::NoActiveStory` if nothing is active
    /// - `AnalysisError::PrimaryFetchFailure` on transport failure, non-success
    ///   status or timeout
    pub async fn load_primary(&self) -> Result<Resolution, AnalysisError> {
        let ticket = self.ticket()?;
        self.primary_for(&ticket).await
    }

    /// Fetch enrichment slots concurrently for the active story
    ///
    /// Each slot is updated as soon as its own request settles.
    ///
    /// # Errors
    /// - `AnalysisError::NoActiveStory` if nothing is active
    /// - `AnalysisError::PrimaryNotLoaded` if the primary payload is not ready
    pub async fn load_enrichments(
        &self,
        kinds: &[EnrichmentKind],
    ) -> Result<EnrichmentReport, AnalysisError> {
        let ticket = self.ticket()?;
        self.enrichments_for(&ticket, kinds).await
    }

    /// Run clustering and anomaly detection for the active story
    ///
    /// Both requests run concurrently; the state is updated once both settle.
    /// Runs at most once per activation unless both requests failed.
    ///
    /// # Errors
    /// - `AnalysisError::NoActiveStory` if nothing is active
    /// - `AnalysisError::PrimaryNotLoaded` if the primary payload is not ready
    pub async fn trigger_discovery(&self) -> Result<Resolution, AnalysisError> {
        let ticket = self.ticket()?;
        {
            let mut state = self.state.lock();
            if !state.bundle.primary.is_ready() {
                return Err(AnalysisError::PrimaryNotLoaded(ticket.story));
            }
            if state.discovery != DiscoveryState::NotStarted {
                return Ok(Resolution::Skipped);
            }
            state.discovery = DiscoveryState::Running;
            for kind in EnrichmentKind::ON_DEMAND {
                state.bundle.mark_loading(kind);
            }
        }

        let span = tracing::info_span!("discovery", story = %ticket.story);
        let (clusters, anomalies) = futures::future::join(
            self.fetch(EnrichmentKind::Clusters, &ticket.story),
            self.fetch(EnrichmentKind::Anomalies, &ticket.story),
        )
        .instrument(span)
        .await;

        let mut state = self.state.lock();
        if state.generation != ticket.generation {
            tracing::debug!(story = %ticket.story, "stale discovery results discarded");
            return Ok(Resolution::Discarded);
        }

        let mut succeeded = false;
        for (kind, result) in [
            (EnrichmentKind::Clusters, clusters),
            (EnrichmentKind::Anomalies, anomalies),
        ] {
            match result {
                Ok(value) => {
                    state.bundle.store(value);
                    succeeded = true;
                }
                Err(err) => {
                    tracing::warn!(
                        story = %ticket.story,
                        %kind,
                        error = %err,
                        "discovery request failed"
                    );
                    state.bundle.fail(kind, &err);
                }
            }
        }
        state.discovery = if succeeded {
            DiscoveryState::Done
        } else {
            DiscoveryState::NotStarted
        };

        tracing::info!(story = %ticket.story, succeeded, "discovery settled");
        Ok(Resolution::Applied)
    }

    fn open(&self, story: StoryId) -> Ticket {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.story_id = Some(story.clone());
        state.bundle = AnalysisBundle::default();
        state.discovery = DiscoveryState::NotStarted;

        tracing::info!(%story, generation = state.generation, "dashboard activated");
        Ticket {
            story,
            generation: state.generation,
        }
    }

    fn ticket(&self) -> Result<Ticket, AnalysisError> {
        let state = self.state.lock();
        state
            .story_id
            .clone()
            .map(|story| Ticket {
                story,
                generation: state.generation,
            })
            .ok_or(AnalysisError::NoActiveStory)
    }

    async fn primary_for(&self, ticket: &Ticket) -> Result<Resolution, AnalysisError> {
        {
            let mut state = self.state.lock();
            if state.generation != ticket.generation {
                return Ok(Resolution::Discarded);
            }
            state.bundle.primary = Slot::Loading;
        }

        let span = tracing::info_span!("load_primary", story = %ticket.story);
        let result = bounded(self.primary_timeout, self.api.analysis(&ticket.story))
            .instrument(span)
            .await;

        let mut state = self.state.lock();
        if state.generation != ticket.generation {
            tracing::debug!(story = %ticket.story, "stale primary result discarded");
            return Ok(Resolution::Discarded);
        }

        match result {
            Ok(payload) => {
                state.bundle.primary = Slot::Ready(payload);
                tracing::info!(story = %ticket.story, "primary analysis loaded");
                Ok(Resolution::Applied)
            }
            Err(source) => {
                state.bundle.primary = Slot::Failed(FetchFailure::from(&source));
                tracing::error!(story = %ticket.story, error = %source, "primary analysis failed");
                Err(AnalysisError::PrimaryFetchFailure {
                    story: ticket.story.clone(),
                    source,
                })
            }
        }
    }

    async fn enrichments_for(
        &self,
        ticket: &Ticket,
        kinds: &[EnrichmentKind],
    ) -> Result<EnrichmentReport, AnalysisError> {
        let mut unique: Vec<EnrichmentKind> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !unique.contains(kind) {
                unique.push(*kind);
            }
        }

        {
            let mut state = self.state.lock();
            if state.generation != ticket.generation {
                return Ok(EnrichmentReport {
                    discarded: unique,
                    ..EnrichmentReport::default()
                });
            }
            if !state.bundle.primary.is_ready() {
                return Err(AnalysisError::PrimaryNotLoaded(ticket.story.clone()));
            }
            for kind in &unique {
                state.bundle.mark_loading(*kind);
            }
        }

        let mut pending: FuturesUnordered<_> = unique
            .iter()
            .map(|&kind| async move { (kind, self.fetch(kind, &ticket.story).await) })
            .collect();

        let mut report = EnrichmentReport::default();
        while let Some((kind, result)) = pending.next().await {
            let mut state = self.state.lock();
            if state.generation != ticket.generation {
                tracing::debug!(story = %ticket.story, %kind, "stale enrichment discarded");
                report.discarded.push(kind);
                continue;
            }
            match result {
                Ok(value) => {
                    state.bundle.store(value);
                    tracing::info!(story = %ticket.story, %kind, "enrichment loaded");
                    report.loaded.push(kind);
                }
                Err(source) => {
                    state.bundle.fail(kind, &source);
                    tracing::warn!(
                        story = %ticket.story,
                        %kind,
                        error = %source,
                        "enrichment unavailable"
                    );
                    report.failed.push(AnalysisError::EnrichmentFetchFailure {
                        kind,
                        story: ticket.story.clone(),
                        source,
                    });
                }
            }
        }
        Ok(report)
    }

    async fn fetch(&self, kind: EnrichmentKind, story: &StoryId) -> ClientResult<Enrichment> {
        let limit = self.enrichment_timeout;
        match kind {
            EnrichmentKind::Correlations => bounded(limit, self.api.correlations(story))
                .await
                .map(Enrichment::Correlations),
            EnrichmentKind::Recommendations => bounded(limit, self.api.recommendations(story))
                .await
                .map(Enrichment::Recommendations),
            EnrichmentKind::Clusters => bounded(limit, self.api.clusters(story))
                .await
                .map(Enrichment::Clusters),
            EnrichmentKind::Anomalies => bounded(limit, self.api.anomalies(story))
                .await
                .map(Enrichment::Anomalies),
        }
    }
}

/// Apply an optional deadline, mapping expiry to `ClientError::Timeout`
async fn bounded<T, F>(limit: Option<Duration>, request: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    let Some(limit) = limit else {
        return request.await;
    };
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
