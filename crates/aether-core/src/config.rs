//! Configuration
//!
//! `AetherConfig` is loadable from YAML or TOML (chosen by file extension)
//! and usable without any file through `Default`.

use crate::error::ConfigError;
use crate::risk::RiskRuleset;
use crate::scoring::{KnowledgeBase, DEFAULT_SELECTION_THRESHOLD};
use crate::types::EnrichmentKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default analysis service address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AetherConfig {
    /// Analysis service client
    pub api: ApiConfig,
    /// Analysis orchestrator
    pub orchestrator: OrchestratorConfig,
    /// Scoring engine
    pub scoring: ScoringConfig,
    /// Risk heuristic engine
    pub risk: RiskConfig,
    /// Logging
    pub logging: LoggingConfig,
}

/// Analysis service client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined to
    pub base_url: String,
    /// Per-request transport timeout
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Transport timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Analysis orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Primary fetch timeout; absent means wait indefinitely
    pub primary_timeout_ms: Option<u64>,
    /// Per-enrichment timeout; absent means wait indefinitely
    pub enrichment_timeout_ms: Option<u64>,
    /// Enrichments loaded right after the primary payload
    pub auto_enrichments: Vec<EnrichmentKind>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            primary_timeout_ms: None,
            enrichment_timeout_ms: None,
            auto_enrichments: EnrichmentKind::AUTOMATIC.to_vec(),
        }
    }
}

impl OrchestratorConfig {
    /// Primary fetch timeout
    #[must_use]
    pub fn primary_timeout(&self) -> Option<Duration> {
        self.primary_timeout_ms.map(Duration::from_millis)
    }

    /// Enrichment fetch timeout
    #[must_use]
    pub fn enrichment_timeout(&self) -> Option<Duration> {
        self.enrichment_timeout_ms.map(Duration::from_millis)
    }
}

/// Replacement knowledge bases; absent tables keep the built-in ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeOverrides {
    /// Success metrics
    pub metrics: Option<KnowledgeBase>,
    /// Stakeholder roles
    pub stakeholders: Option<KnowledgeBase>,
    /// Ethical constraints
    pub ethical_constraints: Option<KnowledgeBase>,
}

/// Scoring engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Auto-select entries scoring strictly above this
    pub selection_threshold: f64,
    /// Optional knowledge base replacement
    pub knowledge_base: KnowledgeOverrides,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            selection_threshold: DEFAULT_SELECTION_THRESHOLD,
            knowledge_base: KnowledgeOverrides::default(),
        }
    }
}

impl ScoringConfig {
    /// Metrics table in effect
    #[must_use]
    pub fn metrics(&self) -> KnowledgeBase {
        self.knowledge_base
            .metrics
            .clone()
            .unwrap_or_else(KnowledgeBase::success_metrics)
    }

    /// Stakeholder table in effect
    #[must_use]
    pub fn stakeholders(&self) -> KnowledgeBase {
        self.knowledge_base
            .stakeholders
            .clone()
            .unwrap_or_else(KnowledgeBase::stakeholders)
    }

    /// Ethical-constraint table in effect
    #[must_use]
    pub fn ethical_constraints(&self) -> KnowledgeBase {
        self.knowledge_base
            .ethical_constraints
            .clone()
            .unwrap_or_else(KnowledgeBase::ethical_constraints)
    }
}

/// Risk engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Replacement rule table, in priority order
    pub rules: Option<RiskRuleset>,
}

impl RiskConfig {
    /// Rule table in effect
    #[must_use]
    pub fn ruleset(&self) -> RiskRuleset {
        self.rules.clone().unwrap_or_default()
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration from a `.yaml`/`.yml` or `.toml` file
///
/// # Errors
/// Returns `ConfigError` if the file cannot be read, parsed or validated
pub fn load_config(path: &Path) -> Result<AetherConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let config: AetherConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    validate_config(&config)?;

    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Check semantic constraints serde cannot express
///
/// # Errors
/// `ConfigError::Invalid` naming the offending key
pub fn validate_config(config: &AetherConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
    }

    if config.api.request_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "api.request_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.orchestrator.primary_timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "orchestrator.primary_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.orchestrator.enrichment_timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "orchestrator.enrichment_timeout_ms must be > 0".to_string(),
        ));
    }

    if let Some(kind) = config
        .orchestrator
        .auto_enrichments
        .iter()
        .find(|kind| kind.is_on_demand())
    {
        return Err(ConfigError::Invalid(format!(
            "orchestrator.auto_enrichments must not include on-demand kind '{kind}'"
        )));
    }

    if !config.scoring.selection_threshold.is_finite() || config.scoring.selection_threshold < 0.0
    {
        return Err(ConfigError::Invalid(
            "scoring.selection_threshold must be a non-negative number".to_string(),
        ));
    }

    let overrides = &config.scoring.knowledge_base;
    for (name, table) in [
        ("metrics", &overrides.metrics),
        ("stakeholders", &overrides.stakeholders),
        ("ethical_constraints", &overrides.ethical_constraints),
    ] {
        if table.as_ref().is_some_and(KnowledgeBase::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "scoring.knowledge_base.{name} must not be empty"
            )));
        }
    }

    if config.risk.rules.as_ref().is_some_and(RiskRuleset::is_empty) {
        return Err(ConfigError::Invalid("risk.rules must not be empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::Severity;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = AetherConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.orchestrator.auto_enrichments, EnrichmentKind::AUTOMATIC.to_vec());
    }

    #[test]
    fn loads_yaml_with_partial_sections() {
        let file = write_temp(
            ".yaml",
            "api:\n  base_url: http://analysis:9000\norchestrator:\n  primary_timeout_ms: 5000\n",
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://analysis:9000");
        assert_eq!(config.api.request_timeout_ms, 30_000);
        assert_eq!(
            config.orchestrator.primary_timeout(),
            Some(Duration::from_millis(5000))
        );
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn loads_toml_with_rule_override() {
        let file = write_temp(
            ".toml",
            r#"
[logging]
level = "debug"
json = true

[[risk.rules]]
keywords = ["fraud"]
risk = "False Accusation"
mitigation = "Keep a human in the loop."
severity = "high"

[[risk.rules]]
risk = "General"
mitigation = "Review."
severity = "low"
"#,
        );
        let config = load_config(file.path()).unwrap();
        let rules = config.risk.ruleset();

        assert!(config.logging.json);
        assert_eq!(rules.rules().len(), 2);
        assert_eq!(rules.assess("fraud ring").unwrap().severity, Severity::High);
        assert_eq!(rules.assess("anything").unwrap().risk, "General");
    }

    #[test]
    fn knowledge_base_override_replaces_metrics_only() {
        let file = write_temp(
            ".yml",
            "scoring:\n  knowledge_base:\n    metrics:\n      - label: NPS\n        category: Business\n        keywords: [promoter]\n",
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.scoring.metrics().len(), 1);
        assert_eq!(config.scoring.stakeholders(), KnowledgeBase::stakeholders());
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = AetherConfig::default();
        config.api.base_url = " ".to_string();
        assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));

        let mut config = AetherConfig::default();
        config.orchestrator.enrichment_timeout_ms = Some(0);
        assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));

        let mut config = AetherConfig::default();
        config.scoring.selection_threshold = -1.0;
        assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));

        let mut config = AetherConfig::default();
        config.risk.rules = Some(RiskRuleset::new(Vec::new()));
        assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_on_demand_kinds_in_auto_enrichments() {
        let mut config = AetherConfig::default();
        config.orchestrator.auto_enrichments.push(EnrichmentKind::Clusters);

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid(msg) if msg.contains("clusters")));

        config.orchestrator.auto_enrichments = vec![EnrichmentKind::Recommendations];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".json", "{}");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "json"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/aether.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
