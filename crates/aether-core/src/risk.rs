//! Risk Heuristic Engine
//!
//! Maps an objective to a single risk/mitigation record using an ordered
//! rule table. The first rule with a matching keyword wins; a rule with no
//! keywords matches any non-blank text and acts as the fallback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(name)
    }
}

/// Active risk callout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Risk label
    pub risk: String,
    /// Suggested mitigation
    pub mitigation: String,
    /// Severity
    pub severity: Severity,
}

/// One entry of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRule {
    /// Case-insensitive keywords; empty matches any non-blank text
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Risk label produced on match
    pub risk: String,
    /// Mitigation produced on match
    pub mitigation: String,
    /// Severity produced on match
    pub severity: Severity,
}

impl RiskRule {
    /// Create new rule
    #[must_use]
    pub fn new(
        keywords: &[&str],
        risk: impl Into<String>,
        mitigation: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            risk: risk.into(),
            mitigation: mitigation.into(),
            severity,
        }
    }

    /// Whether this rule fires for already-lowercased text
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.is_empty()
            || self
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword.to_lowercase().as_str()))
    }

    /// Record this rule yields
    #[must_use]
    pub fn record(&self) -> RiskRecord {
        RiskRecord {
            risk: self.risk.clone(),
            mitigation: self.mitigation.clone(),
            severity: self.severity,
        }
    }
}

/// Ordered rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskRuleset {
    rules: Vec<RiskRule>,
}

impl Default for RiskRuleset {
    /// churn/retention, then ethical/audit, then behavior/tracking, then fallback
    fn default() -> Self {
        Self::new(vec![
            RiskRule::new(
                &["churn", "retention", "attrition"],
                "Exclusionary Bias",
                "Audit retention models across demographic segments and keep protected \
                 attributes out of targeting decisions.",
                Severity::High,
            ),
            RiskRule::new(
                &["ethic", "audit", "compliance", "gdpr", "consent"],
                "Regulatory Non-Compliance",
                "Map every processed field to a lawful basis and record consent before analysis.",
                Severity::Medium,
            ),
            RiskRule::new(
                &["behavior", "behaviour", "tracking", "sentiment", "usage"],
                "Privacy Intrusion",
                "Aggregate behavioural signals and apply data minimization before modelling.",
                Severity::High,
            ),
            RiskRule::new(
                &[],
                "Unvalidated Assumptions",
                "Confirm data provenance and the objective with stakeholders before modelling.",
                Severity::Low,
            ),
        ])
    }
}

impl RiskRuleset {
    /// Create from rules in priority order
    #[must_use]
    pub fn new(rules: Vec<RiskRule>) -> Self {
        Self { rules }
    }

    /// Rules in priority order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    /// Whether the table has no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule's record; `None` for blank text or no match
    #[must_use]
    pub fn assess(&self, text: &str) -> Option<RiskRecord> {
        if text.trim().is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(RiskRule::record)
    }
}

/// Assess `text` against the built-in rule table
#[must_use]
pub fn assess_risk(text: &str) -> Option<RiskRecord> {
    RiskRuleset::default().assess(text)
}

/// Single active risk record bound to one input field
#[derive(Debug, Clone, Default)]
pub struct RiskMonitor {
    rules: RiskRuleset,
    current: Option<RiskRecord>,
}

impl RiskMonitor {
    /// Create monitor over a rule table
    #[must_use]
    pub fn new(rules: RiskRuleset) -> Self {
        Self { rules, current: None }
    }

    /// Re-evaluate from scratch, replacing the previous record
    pub fn update(&mut self, text: &str) -> Option<&RiskRecord> {
        self.current = self.rules.assess(text);
        if let Some(record) = &self.current {
            tracing::debug!(risk = %record.risk, severity = %record.severity, "risk assessed");
        }
        self.current.as_ref()
    }

    /// Active record
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&RiskRecord> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn churn_objective_is_exclusionary_bias() {
        let record = assess_risk("reduce customer churn").unwrap();
        assert_eq!(record.risk, "Exclusionary Bias");
        assert_eq!(record.severity, Severity::High);
    }

    #[test]
    fn first_rule_wins() {
        // matches both churn and audit rules
        let record = assess_risk("audit churn drivers").unwrap();
        assert_eq!(record.risk, "Exclusionary Bias");

        let record = assess_risk("Ethical compliance auditing of tracking").unwrap();
        assert_eq!(record.risk, "Regulatory Non-Compliance");
        assert_eq!(record.severity, Severity::Medium);
    }

    #[test]
    fn behavior_rule_and_fallback() {
        assert_eq!(assess_risk("Behavioral Analysis").unwrap().risk, "Privacy Intrusion");

        let fallback = assess_risk("grow revenue").unwrap();
        assert_eq!(fallback.severity, Severity::Low);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert_eq!(assess_risk(""), None);
        assert_eq!(assess_risk(" \t\n"), None);
    }

    #[test]
    fn no_fallback_means_no_match() {
        let rules = RiskRuleset::new(vec![RiskRule::new(&["churn"], "r", "m", Severity::Low)]);
        assert_eq!(rules.assess("revenue"), None);
    }

    #[test]
    fn monitor_replaces_record() {
        let mut monitor = RiskMonitor::default();
        monitor.update("reduce churn");
        assert_eq!(monitor.current().unwrap().risk, "Exclusionary Bias");

        monitor.update("track usage");
        assert_eq!(monitor.current().unwrap().risk, "Privacy Intrusion");

        monitor.update("");
        assert!(monitor.current().is_none());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
    }

    proptest! {
        #[test]
        fn keyword_always_yields_rule_triple(prefix in "[a-z ]{0,16}", suffix in "[a-z ]{0,16}") {
            let rules = RiskRuleset::default();
            let churn = &rules.rules()[0];
            let text = format!("{prefix}CHURN{suffix}");
            prop_assert_eq!(rules.assess(&text), Some(churn.record()));
        }
    }
}
