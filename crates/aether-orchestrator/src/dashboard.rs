//! Dashboard View Composer
//!
//! Pure projection of an [`AnalysisBundle`] onto one of eight tabs:
//! - Never mutates the bundle
//! - Never issues a request; switching tabs is free
//! - Yields an explicit loading, failed or empty marker when data is missing

use crate::error::UnknownTab;
use crate::orchestrator::AnalysisBundle;
use crate::slot::{FetchFailure, Slot};
use aether_client::{
    AnomalyResult, ClusterResult, Correlation, DatasetInfo, HealthScores, Insight, Recommendation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Dashboard tab identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    /// Automatic findings
    #[default]
    Insights,
    /// Dataset summary
    Overview,
    /// Exploratory statistics
    Eda,
    /// Correlation heatmap and discovered pairs
    Correlations,
    /// Recommended actions
    Recommendations,
    /// Health, missing values and bias
    Quality,
    /// Primary chart
    Visuals,
    /// Clustering and anomaly detection
    Ml,
}

impl DashboardTab {
    /// All tabs in display order
    pub const ALL: [DashboardTab; 8] = [
        DashboardTab::Insights,
        DashboardTab::Overview,
        DashboardTab::Eda,
        DashboardTab::Correlations,
        DashboardTab::Recommendations,
        DashboardTab::Quality,
        DashboardTab::Visuals,
        DashboardTab::Ml,
    ];

    /// Stable identifier
    #[inline]
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            DashboardTab::Insights => "insights",
            DashboardTab::Overview => "overview",
            DashboardTab::Eda => "eda",
            DashboardTab::Correlations => "correlations",
            DashboardTab::Recommendations => "recommendations",
            DashboardTab::Quality => "quality",
            DashboardTab::Visuals => "visuals",
            DashboardTab::Ml => "ml",
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DashboardTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DashboardTab::ALL
            .into_iter()
            .find(|tab| tab.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// Renderable slice of the bundle for one tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum TabView<'a> {
    /// Primary payload not available yet
    Loading,
    /// Primary payload failed; no partial dashboard
    Failed {
        /// Cause
        failure: FetchFailure,
    },
    /// Tab has nothing to show for this story
    Empty,
    /// Enrichment backing the tab failed
    Unavailable {
        /// Cause
        failure: FetchFailure,
    },
    /// Automatic findings
    Insights {
        /// Findings in service order
        insights: &'a [Insight],
        /// Health scores
        health: &'a HealthScores,
    },
    /// Dataset summary
    Overview {
        /// Row and column counts
        info: &'a DatasetInfo,
        /// Column names
        columns: &'a [String],
        /// Data card, when produced
        data_card: Option<&'a Value>,
        /// Health scores
        health: &'a HealthScores,
    },
    /// Exploratory statistics
    Eda {
        /// Per-column summary
        summary_stats: Option<&'a Value>,
        /// Skewness and kurtosis
        advanced_stats: Option<&'a Value>,
        /// Histograms
        distributions: Option<&'a Value>,
    },
    /// Correlations
    Correlations {
        /// Matrix from the primary payload
        heatmap: Option<&'a Value>,
        /// Pairs from the correlation enrichment
        discovered: Slot<&'a Vec<Correlation>>,
    },
    /// Recommended actions
    Recommendations {
        /// Actions in service order
        recommendations: &'a [Recommendation],
    },
    /// Data quality
    Quality {
        /// Health scores
        health: &'a HealthScores,
        /// Missing values per column
        missing_values: &'a BTreeMap<String, u64>,
        /// Bias warnings, when checked
        bias_warnings: Option<&'a [Value]>,
        /// Fairness scores, when computed
        fairness_scores: Option<&'a Value>,
    },
    /// Primary chart
    Visuals {
        /// Chart description
        visualization: &'a Value,
    },
    /// Discovery results; absent until triggered
    Ml {
        /// Clustering
        clusters: Slot<&'a ClusterResult>,
        /// Anomaly detection
        anomalies: Slot<&'a AnomalyResult>,
    },
}

impl TabView<'_> {
    /// Whether the view carries data
    #[must_use]
    pub fn has_content(&self) -> bool {
        !matches!(
            self,
            TabView::Loading | TabView::Failed { .. } | TabView::Empty | TabView::Unavailable { .. }
        )
    }
}

/// Select the slice of `bundle` that `tab` renders
#[must_use]
pub fn select_tab_data(bundle: &AnalysisBundle, tab: DashboardTab) -> TabView<'_> {
    let primary = match &bundle.primary {
        Slot::Absent | Slot::Loading => return TabView::Loading,
        Slot::Failed(failure) => {
            return TabView::Failed {
                failure: failure.clone(),
            }
        }
        Slot::Ready(primary) => primary,
    };

    match tab {
        DashboardTab::Insights => TabView::Insights {
            insights: &primary.auto_insights,
            health: &primary.health_scores,
        },
        DashboardTab::Overview => TabView::Overview {
            info: &primary.dataset_info,
            columns: &primary.columns,
            data_card: primary.data_card.as_ref(),
            health: &primary.health_scores,
        },
        DashboardTab::Eda => {
            if primary.summary_stats.is_none()
                && primary.advanced_stats.is_none()
                && primary.distributions.is_none()
            {
                return TabView::Empty;
            }
            TabView::Eda {
                summary_stats: primary.summary_stats.as_ref(),
                advanced_stats: primary.advanced_stats.as_ref(),
                distributions: primary.distributions.as_ref(),
            }
        }
        DashboardTab::Correlations => TabView::Correlations {
            heatmap: primary.correlations.as_ref(),
            discovered: bundle.correlations.as_ref(),
        },
        DashboardTab::Recommendations => match &bundle.recommendations {
            Slot::Absent => TabView::Empty,
            Slot::Loading => TabView::Loading,
            Slot::Failed(failure) => TabView::Unavailable {
                failure: failure.clone(),
            },
            Slot::Ready(recommendations) if recommendations.is_empty() => TabView::Empty,
            Slot::Ready(recommendations) => TabView::Recommendations {
                recommendations: recommendations.as_slice(),
            },
        },
        DashboardTab::Quality => TabView::Quality {
            health: &primary.health_scores,
            missing_values: &primary.dataset_info.missing_values,
            bias_warnings: primary.bias_warnings.as_deref(),
            fairness_scores: primary.fairness_scores.as_ref(),
        },
        DashboardTab::Visuals => match &primary.visualization {
            Some(visualization) => TabView::Visuals { visualization },
            None => TabView::Empty,
        },
        DashboardTab::Ml => TabView::Ml {
            clusters: bundle.clusters.as_ref(),
            anomalies: bundle.anomalies.as_ref(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_client::{AnalysisPayload, ClientError};
    use aether_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    fn loaded() -> AnalysisBundle {
        let primary: AnalysisPayload =
            serde_json::from_value(fixtures::analysis_payload()).unwrap();
        let correlations: Vec<Correlation> =
            serde_json::from_value(fixtures::correlations()).unwrap();
        AnalysisBundle {
            primary: Slot::Ready(primary),
            correlations: Slot::Ready(correlations),
            ..AnalysisBundle::default()
        }
    }

    #[test]
    fn tab_ids_round_trip() {
        for tab in DashboardTab::ALL {
            assert_eq!(tab.id().parse::<DashboardTab>().unwrap(), tab);
        }
        assert_eq!("ML".parse::<DashboardTab>().unwrap(), DashboardTab::Ml);
        assert_eq!(
            "timeline".parse::<DashboardTab>(),
            Err(UnknownTab("timeline".to_string()))
        );
    }

    #[test]
    fn every_tab_is_loading_until_primary_arrives() {
        let mut bundle = AnalysisBundle {
            primary: Slot::Loading,
            ..AnalysisBundle::default()
        };
        for tab in DashboardTab::ALL {
            assert_eq!(select_tab_data(&bundle, tab), TabView::Loading);
        }

        bundle
            .primary
            .resolve(Err(&ClientError::Status { status: 500, body: String::new() }));
        for tab in DashboardTab::ALL {
            assert!(matches!(select_tab_data(&bundle, tab), TabView::Failed { .. }));
        }
    }

    #[test]
    fn insights_and_quality_slice_the_primary_payload() {
        let bundle = loaded();

        let TabView::Insights { insights, health } =
            select_tab_data(&bundle, DashboardTab::Insights)
        else {
            panic!("expected insights view");
        };
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "Dataset Scale");
        assert!((health.overall - 93.4).abs() < f64::EPSILON);

        let TabView::Quality { missing_values, bias_warnings, fairness_scores, .. } =
            select_tab_data(&bundle, DashboardTab::Quality)
        else {
            panic!("expected quality view");
        };
        assert_eq!(missing_values.get("monthly_spend"), Some(&14));
        assert_eq!(bias_warnings.map(<[Value]>::len), Some(0));
        assert!(fairness_scores.is_none());
    }

    #[test]
    fn correlations_combine_heatmap_and_enrichment() {
        let bundle = loaded();
        let TabView::Correlations { heatmap, discovered } =
            select_tab_data(&bundle, DashboardTab::Correlations)
        else {
            panic!("expected correlations view");
        };
        assert!(heatmap.is_some());
        assert_eq!(discovered.value().map(|pairs| pairs.len()), Some(1));
    }

    #[test]
    fn missing_enrichments_get_explicit_markers() {
        let mut bundle = loaded();
        assert_eq!(select_tab_data(&bundle, DashboardTab::Recommendations), TabView::Empty);

        bundle.recommendations = Slot::Loading;
        assert_eq!(select_tab_data(&bundle, DashboardTab::Recommendations), TabView::Loading);

        bundle.recommendations.resolve(Err(&ClientError::Timeout(50)));
        let view = select_tab_data(&bundle, DashboardTab::Recommendations);
        assert!(matches!(view, TabView::Unavailable { ref failure } if failure.timed_out));
        assert!(!view.has_content());

        let TabView::Ml { clusters, anomalies } = select_tab_data(&bundle, DashboardTab::Ml) else {
            panic!("expected ml view");
        };
        assert_eq!(clusters, Slot::Absent);
        assert_eq!(anomalies, Slot::Absent);
    }

    #[test]
    fn missing_visualization_is_empty() {
        let mut bundle = loaded();
        if let Slot::Ready(primary) = &mut bundle.primary {
            primary.visualization = None;
        }
        assert_eq!(select_tab_data(&bundle, DashboardTab::Visuals), TabView::Empty);
    }

    #[test]
    fn selection_leaves_bundle_untouched() {
        let bundle = loaded();
        let before = bundle.clone();
        for tab in DashboardTab::ALL {
            let _ = select_tab_data(&bundle, tab);
        }
        assert_eq!(bundle, before);
    }

    #[test]
    fn views_serialize_with_tag() {
        let bundle = loaded();
        let json = serde_json::to_value(select_tab_data(&bundle, DashboardTab::Visuals)).unwrap();
        assert_eq!(json["view"], "visuals");
        assert_eq!(json["visualization"]["type"], "scatter");
    }
}
