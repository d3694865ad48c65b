//! Wizard session driver
//!
//! Binds the stage pipeline to the analysis service. Each submission
//! performs its request, then advances with the identifier it returned.
//! Entering Clean & Prep loads the preview; entering Deep Insights opens the
//! dashboard for the story. Leaving a stage deactivates the orchestrator so
//! late results are discarded.

use crate::dashboard::{select_tab_data, DashboardTab, TabView};
use crate::error::WizardError;
use crate::notifier::{Notice, Notifier};
use crate::orchestrator::{AnalysisOrchestrator, DashboardState, Resolution};
use aether_client::{
    AnalysisApi, CleanOutcome, CleaningOperation, Hypothesis, InventoryResponse, NewProject,
    NewStory, Preview, StorySuggestion, UploadRequest,
};
use aether_core::{
    AetherConfig, Dataset, DatasetId, DraftError, IdentityKind, InventoryDraft, Objective, Project,
    ProjectDraft, ProjectId, RiskMonitor, RiskRecord, RiskRuleset, Stage, StagePayload,
    StagePipeline, Story, StoryDraft, StoryId, SuggestionBoard,
};
use std::sync::Arc;

/// One user's pass through the seven stages
pub struct Wizard {
    pipeline: StagePipeline,
    api: Arc<dyn AnalysisApi>,
    notifier: Arc<dyn Notifier>,
    orchestrator: AnalysisOrchestrator,
    metrics: SuggestionBoard,
    stakeholders: SuggestionBoard,
    constraints: SuggestionBoard,
    risk: RiskMonitor,
    project_draft: ProjectDraft,
    project: Option<Project>,
    inventory: Option<InventoryResponse>,
    dataset: Option<Dataset>,
    preview: Option<Preview>,
    story_draft: StoryDraft,
    story: Option<Story>,
}

impl std::fmt::Debug for Wizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("pipeline", &self.pipeline)
            .field("orchestrator", &self.orchestrator)
            .field("project", &self.project)
            .field("dataset", &self.dataset)
            .field("story", &self.story)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    /// Create session with built-in knowledge bases and risk rules
    #[must_use]
    pub fn new(api: Arc<dyn AnalysisApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::from_config(api, notifier, &AetherConfig::default())
    }

    /// Create session from configuration
    #[must_use]
    pub fn from_config(
        api: Arc<dyn AnalysisApi>,
        notifier: Arc<dyn Notifier>,
        config: &AetherConfig,
    ) -> Self {
        let threshold = config.scoring.selection_threshold;
        let orchestrator = AnalysisOrchestrator::from_config(api.clone(), &config.orchestrator);
        Self {
            pipeline: StagePipeline::new(),
            api,
            notifier,
            orchestrator,
            metrics: SuggestionBoard::new(config.scoring.metrics()).with_threshold(threshold),
            stakeholders: SuggestionBoard::new(config.scoring.stakeholders())
                .with_threshold(threshold),
            constraints: SuggestionBoard::new(config.scoring.ethical_constraints())
                .with_threshold(threshold),
            risk: RiskMonitor::new(config.risk.ruleset()),
            project_draft: ProjectDraft::default(),
            project: None,
            inventory: None,
            dataset: None,
            preview: None,
            story_draft: StoryDraft::default(),
            story: None,
        }
    }

    /// Replace the risk rules
    #[must_use]
    pub fn with_risk_rules(mut self, rules: RiskRuleset) -> Self {
        self.risk = RiskMonitor::new(rules);
        self.risk.update(self.project_draft.objective.text());
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current stage
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.pipeline.current()
    }

    /// Stage pipeline
    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &StagePipeline {
        &self.pipeline
    }

    /// Dashboard orchestrator; clone it to load from another task
    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &AnalysisOrchestrator {
        &self.orchestrator
    }

    /// Ranked success metrics for the current objective
    #[inline]
    #[must_use]
    pub fn metric_board(&self) -> &SuggestionBoard {
        &self.metrics
    }

    /// Ranked stakeholder roles for the current objective
    #[inline]
    #[must_use]
    pub fn stakeholder_board(&self) -> &SuggestionBoard {
        &self.stakeholders
    }

    /// Ranked ethical constraints for the current objective
    #[inline]
    #[must_use]
    pub fn constraint_board(&self) -> &SuggestionBoard {
        &self.constraints
    }

    /// Risk callout for the current objective
    #[inline]
    #[must_use]
    pub fn risk(&self) -> Option<&RiskRecord> {
        self.risk.current()
    }

    /// Project being edited
    #[inline]
    #[must_use]
    pub fn project_draft(&self) -> &ProjectDraft {
        &self.project_draft
    }

    /// Editable project draft (title, stakeholders, constraints)
    ///
    /// Change the objective through [`set_objective`](Self::set_objective)
    /// so the rankings follow.
    pub fn project_draft_mut(&mut self) -> &mut ProjectDraft {
        &mut self.project_draft
    }

    /// Submitted project
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Inventory answer
    #[must_use]
    pub fn inventory(&self) -> Option<&InventoryResponse> {
        self.inventory.as_ref()
    }

    /// Uploaded dataset
    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Latest dataset preview
    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Story being edited
    #[must_use]
    pub fn story_draft(&self) -> &StoryDraft {
        &self.story_draft
    }

    /// Editable story draft
    pub fn story_draft_mut(&mut self) -> &mut StoryDraft {
        &mut self.story_draft
    }

    /// Submitted story
    #[must_use]
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Copy of the dashboard state
    #[must_use]
    pub fn dashboard_state(&self) -> DashboardState {
        self.orchestrator.snapshot()
    }

    /// Render one dashboard tab
    pub fn with_tab<R>(&self, tab: DashboardTab, render: impl FnOnce(TabView<'_>) -> R) -> R {
        self.orchestrator
            .with_state(|state| render(select_tab_data(&state.bundle, tab)))
    }

    // ------------------------------------------------------------------
    // Stage 1: project scope
    // ------------------------------------------------------------------

    /// Set the objective and re-rank every suggestion family
    ///
    /// The previous ranking and risk record are replaced, never merged.
    pub fn set_objective(&mut self, objective: Objective) {
        let text = objective.text().to_string();
        self.project_draft.objective = objective;
        self.metrics.update(&text);
        self.stakeholders.update(&text);
        self.constraints.update(&text);
        self.risk.update(&text);
    }

    /// Add the auto-selected stakeholders and constraints to the draft
    pub fn apply_suggested_labels(&mut self) {
        for label in self.stakeholders.selected() {
            self.project_draft.stakeholders.insert(&label);
        }
        for label in self.constraints.selected() {
            self.project_draft.ethical_constraints.insert(&label);
        }
    }

    /// Create the project and advance to the data inventory
    ///
    /// # Errors
    /// - `WizardError::Draft` if the title or custom objective is blank
    /// - `WizardError::Client` if the service refuses
    pub async fn submit_project(&mut self) -> Result<ProjectId, WizardError> {
        self.expect_stage(Stage::ProjectScope)?;
        self.project_draft.validate()?;

        let body = NewProject::from(&self.project_draft);
        let id = match self.api.create_project(&body).await {
            Ok(id) => id,
            Err(err) => return Err(self.report("Failed to create project", err.into())),
        };

        self.pipeline.advance(StagePayload::Project(id.clone()))?;
        self.project = Some(self.project_draft.clone().into_project(id.clone()));
        self.notifier.notify(Notice::success("Project created"));
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Stage 2: data inventory
    // ------------------------------------------------------------------

    /// Register the dataset description and advance to success metrics
    ///
    /// Each returned risk-assessment line is surfaced as a warning.
    ///
    /// # Errors
    /// `WizardError::Client` if the service refuses
    pub async fn submit_inventory(
        &mut self,
        draft: InventoryDraft,
    ) -> Result<&InventoryResponse, WizardError> {
        self.expect_stage(Stage::DataInventory)?;
        let project_id = self.require_project()?;

        let response = match self.api.create_inventory(&project_id, &draft).await {
            Ok(response) => response,
            Err(err) => return Err(self.report("Failed to register dataset", err.into())),
        };
        for line in &response.risk_assessment {
            self.notifier.notify(Notice::warning(line.clone()));
        }

        self.pipeline.advance(StagePayload::Continue)?;
        Ok(self.inventory.insert(response))
    }

    // ------------------------------------------------------------------
    // Stage 3: success metrics
    // ------------------------------------------------------------------

    /// Flip one metric's selection
    pub fn toggle_metric(&mut self, label: &str) -> Option<bool> {
        self.metrics.toggle(label)
    }

    /// Carry the selected metrics forward and advance to upload
    ///
    /// # Errors
    /// `WizardError::Draft` if no metric is selected
    pub fn confirm_metrics(&mut self) -> Result<Vec<String>, WizardError> {
        self.expect_stage(Stage::SuccessMetrics)?;
        let metrics = self.metrics.selected();
        if metrics.is_empty() {
            return Err(DraftError::NoMetricsSelected.into());
        }
        self.pipeline.advance(StagePayload::Metrics(metrics.clone()))?;
        Ok(metrics)
    }

    // ------------------------------------------------------------------
    // Stage 4: upload
    // ------------------------------------------------------------------

    /// Upload the file, advance to cleaning and load its preview
    ///
    /// Column warnings are surfaced; a failed preview load is reported but
    /// does not undo the upload.
    ///
    /// # Errors
    /// `WizardError::Client` if the upload fails or yields no dataset id
    pub async fn upload(&mut self, request: UploadRequest) -> Result<DatasetId, WizardError> {
        self.expect_stage(Stage::UploadData)?;
        let request = match self.pipeline.project_id() {
            Some(project_id) => request.with_project(project_id.clone()),
            None => request,
        };

        let response = match self.api.upload(&request).await {
            Ok(response) => response,
            Err(err) => return Err(self.report("Upload failed", err.into())),
        };
        for warning in &response.warnings {
            self.notifier.notify(Notice::warning(warning.to_string()));
        }
        let Some(id) = response.resolved_id().cloned() else {
            let err = aether_client::ClientError::MissingField("dataset_id");
            return Err(self.report("Upload failed", err.into()));
        };

        self.pipeline.advance(StagePayload::Dataset(id.clone()))?;
        self.dataset = Some(Dataset {
            id: id.clone(),
            source_file: request.file_name,
        });
        self.preview = None;
        self.notifier.notify(Notice::success("Dataset uploaded"));

        self.enter_stage().await;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Stage 5: clean & prep
    // ------------------------------------------------------------------

    /// Reload the dataset preview, surfacing PII warnings
    ///
    /// # Errors
    /// - `WizardError::MissingIdentity` before an upload
    /// - `WizardError::Client` if the service refuses
    pub async fn refresh_preview(&mut self) -> Result<&Preview, WizardError> {
        let dataset_id = self.require_dataset()?;
        let preview = match self.api.preview(&dataset_id).await {
            Ok(preview) => preview,
            Err(err) => return Err(self.report("Failed to load preview", err.into())),
        };
        for warning in &preview.pii_warnings {
            let message = match &warning.kind {
                Some(kind) => format!("{kind} detected in column '{}'", warning.column),
                None => format!("PII detected in column '{}'", warning.column),
            };
            self.notifier.notify(Notice::warning(message));
        }
        Ok(self.preview.insert(preview))
    }

    /// Apply one cleaning operation, then reload the preview
    ///
    /// # Errors
    /// - `WizardError::Draft` if the operation names a blank column
    /// - `WizardError::Client` if the service refuses
    pub async fn apply_cleaning(
        &mut self,
        operation: CleaningOperation,
    ) -> Result<CleanOutcome, WizardError> {
        self.expect_stage(Stage::CleanPrep)?;
        operation.validate()?;
        let dataset_id = self.require_dataset()?;

        let outcome = match self.api.clean(&dataset_id, &operation).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let context = format!("Cleaning '{}' failed", operation.name());
                return Err(self.report(&context, err.into()));
            }
        };
        tracing::info!(dataset = %dataset_id, operation = operation.name(), "cleaning applied");
        self.notifier.notify(Notice::success(outcome.message.clone()));

        self.refresh_preview().await?;
        Ok(outcome)
    }

    /// Leave cleaning and advance to story definition
    ///
    /// # Errors
    /// `WizardError::Pipeline` if no dataset is known
    pub fn finish_cleaning(&mut self) -> Result<Stage, WizardError> {
        self.expect_stage(Stage::CleanPrep)?;
        let stage = self.pipeline.advance(StagePayload::Continue)?;
        self.seed_story_objective();
        Ok(stage)
    }

    // ------------------------------------------------------------------
    // Stage 6: define story
    // ------------------------------------------------------------------

    /// Ask the service for story ideas on the dataset
    ///
    /// # Errors
    /// `WizardError::Client` if the service refuses
    pub async fn suggest_stories(&self) -> Result<Vec<StorySuggestion>, WizardError> {
        self.expect_stage(Stage::DefineStory)?;
        let dataset_id = self.require_dataset()?;
        self.api
            .suggest_stories(&dataset_id)
            .await
            .map_err(|err| self.report("Failed to suggest stories", err.into()))
    }

    /// Copy a suggestion's title and context into the story draft
    pub fn apply_story_suggestion(&mut self, suggestion: &StorySuggestion) {
        self.story_draft
            .apply_suggestion(&suggestion.title, &suggestion.context);
    }

    /// Generate hypotheses for the draft's story type and audience
    ///
    /// # Errors
    /// `WizardError::Client` if the service refuses
    pub async fn generate_hypotheses(&self) -> Result<Vec<Hypothesis>, WizardError> {
        self.expect_stage(Stage::DefineStory)?;
        let dataset_id = self.require_dataset()?;
        self.api
            .hypotheses(
                &dataset_id,
                self.story_draft.story_type,
                self.story_draft.target_audience,
            )
            .await
            .map_err(|err| self.report("Failed to generate hypotheses", err.into()))
    }

    /// Attach generated hypotheses to the story draft
    pub fn attach_hypotheses(&mut self, hypotheses: &[Hypothesis]) {
        for hypothesis in hypotheses {
            self.story_draft.add_hypothesis(&hypothesis.question);
        }
    }

    /// Create the story, advance to Deep Insights and open its dashboard
    ///
    /// A failing dashboard load is reported through the notifier and leaves
    /// the stage on its failure view; it does not fail the submission.
    ///
    /// # Errors
    /// - `WizardError::Draft` if the title is blank
    /// - `WizardError::Client` if the story cannot be created
    pub async fn submit_story(&mut self) -> Result<StoryId, WizardError> {
        self.expect_stage(Stage::DefineStory)?;
        self.story_draft.validate()?;
        let dataset_id = self.require_dataset()?;

        let body = NewStory::new(&self.story_draft, dataset_id.clone());
        let id = match self.api.create_story(&body).await {
            Ok(id) => id,
            Err(err) => return Err(self.report("Failed to create story", err.into())),
        };

        self.pipeline.advance(StagePayload::Story(id.clone()))?;
        self.story = Some(self.story_draft.clone().into_story(id.clone(), dataset_id));
        self.notifier.notify(Notice::success("Story created"));

        self.enter_stage().await;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Stage 7: deep insights
    // ------------------------------------------------------------------

    /// Reload the dashboard from scratch
    ///
    /// # Errors
    /// `WizardError::Analysis` if the primary payload fails again
    pub async fn retry_dashboard(&mut self) -> Result<Resolution, WizardError> {
        self.expect_stage(Stage::DeepInsights)?;
        let story = self.require_story()?;
        Ok(self.orchestrator.load(story).await?)
    }

    /// Run clustering and anomaly detection
    ///
    /// # Errors
    /// `WizardError::Analysis` if the primary payload is not loaded
    pub async fn discover(&mut self) -> Result<Resolution, WizardError> {
        self.expect_stage(Stage::DeepInsights)?;
        Ok(self.orchestrator.trigger_discovery().await?)
    }

    /// Address of the story's report
    ///
    /// # Errors
    /// `WizardError::MissingIdentity` before a story exists
    pub fn report_url(&self) -> Result<String, WizardError> {
        let story = self.require_story()?;
        Ok(self.api.report_url(&story))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Advance without a new submission, reusing stored identifiers
    ///
    /// # Errors
    /// `WizardError::Pipeline` if the stage's identifier is missing or the
    /// session is at the last stage
    pub async fn forward(&mut self) -> Result<Stage, WizardError> {
        if self.stage() == Stage::SuccessMetrics {
            self.confirm_metrics()?;
        } else {
            self.pipeline.advance(StagePayload::Continue)?;
        }
        if self.stage() == Stage::DefineStory {
            self.seed_story_objective();
        }
        self.enter_stage().await;
        Ok(self.stage())
    }

    /// Go back one stage, discarding in-flight dashboard results
    pub fn back(&mut self) -> Stage {
        self.orchestrator.deactivate();
        self.pipeline.retreat()
    }

    /// Start over from stage 1 with empty drafts
    pub fn reset(&mut self) {
        self.orchestrator.deactivate();
        self.pipeline.reset();
        self.project_draft = ProjectDraft::default();
        self.project = None;
        self.inventory = None;
        self.dataset = None;
        self.preview = None;
        self.story_draft = StoryDraft::default();
        self.story = None;
        self.set_objective(Objective::default());
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn enter_stage(&mut self) {
        match self.stage() {
            Stage::CleanPrep => {
                // reported through the notifier already
                let _ = self.refresh_preview().await;
            }
            Stage::DeepInsights => self.open_dashboard().await,
            _ => {}
        }
    }

    async fn open_dashboard(&mut self) {
        let Some(story) = self.pipeline.story_id().cloned() else {
            return;
        };
        match self.orchestrator.load(story).await {
            Ok(Resolution::Applied) => {
                self.notifier.notify(Notice::info("Analysis ready"));
            }
            Ok(_) => {}
            Err(err) => {
                self.notifier
                    .notify(Notice::error(format!("Failed to load analysis: {err}")));
            }
        }
    }

    fn seed_story_objective(&mut self) {
        if self.story_draft.business_objective.trim().is_empty() {
            if let Some(project) = &self.project {
                self.story_draft.business_objective = project.objective.text().to_string();
            }
        }
    }

    fn report(&self, context: &str, err: WizardError) -> WizardError {
        tracing::error!(stage = %self.stage(), error = %err, "{context}");
        self.notifier.notify(Notice::error(format!("{context}: {err}")));
        err
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), WizardError> {
        let actual = self.stage();
        if actual == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStage { expected, actual })
        }
    }

    fn require_project(&self) -> Result<ProjectId, WizardError> {
        self.pipeline
            .project_id()
            .cloned()
            .ok_or(WizardError::MissingIdentity(IdentityKind::Project))
    }

    fn require_dataset(&self) -> Result<DatasetId, WizardError> {
        self.pipeline
            .dataset_id()
            .cloned()
            .ok_or(WizardError::MissingIdentity(IdentityKind::Dataset))
    }

    fn require_story(&self) -> Result<StoryId, WizardError> {
        self.pipeline
            .story_id()
            .cloned()
            .ok_or(WizardError::MissingIdentity(IdentityKind::Story))
    }
}
