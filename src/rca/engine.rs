//! Per-site root cause analysis over an immutable rule catalog.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::catalog::RuleCatalog;
use super::impact::{assess_impact, business_impact, estimate_affected_users};
use super::recommend::{generate_recommendations, suggest_auto_actions};
use super::types::{
    AnalysisResult, BusinessImpact, CompetitiveRisk, ImpactAssessment, KpiRule, RankedCause,
    RootCause, Severity, SiteReading,
};

const BASE_CONFIDENCE: f64 = 0.7;
const MAX_CONFIDENCE: f64 = 0.95;
const GENERIC_CONFIDENCE: f64 = 0.6;
const GENERIC_USERS_AFFECTED: u32 = 100;

/// Stateless analyzer; clones share the catalog.
#[derive(Debug, Clone)]
pub struct RcaEngine {
    catalog: Arc<RuleCatalog>,
}

impl Default for RcaEngine {
    fn default() -> Self {
        Self::new(Arc::new(RuleCatalog::builtin()))
    }
}

impl RcaEngine {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn analyze(&self, reading: &SiteReading) -> AnalysisResult {
        self.analyze_at(reading, Utc::now())
    }

    /// Same as [`RcaEngine::analyze`] with an explicit analysis timestamp.
    pub fn analyze_at(&self, reading: &SiteReading, now: DateTime<Utc>) -> AnalysisResult {
        let Some(rule) = self.catalog.lookup(reading.kpi()) else {
            tracing::info!(kpi = %reading.kpi(), "no rule for KPI, using generic analysis");
            return generic_analysis(reading, now);
        };

        let severity = rule.classify(reading.value());
        let root_causes = rank_causes(rule, severity);
        let recommendations = generate_recommendations(&root_causes);
        let auto_actions = suggest_auto_actions(severity, &root_causes);

        tracing::debug!(
            kpi = %reading.kpi(),
            value = reading.value(),
            %severity,
            causes = root_causes.len(),
            recommendations = recommendations.len(),
            "analysis complete"
        );

        AnalysisResult {
            site: reading.clone(),
            analysis_timestamp: now,
            severity,
            confidence: overall_confidence(reading, &root_causes),
            impact_assessment: assess_impact(reading.kpi(), severity),
            estimated_users_affected: estimate_affected_users(severity),
            business_impact: business_impact(severity),
            root_causes,
            recommendations,
            auto_actions,
        }
    }
}

pub fn cause_confidence(probability: f64) -> f64 {
    (probability * 1.2).min(MAX_CONFIDENCE)
}

/// Annotated copies of the rule's causes for a severity, most probable first.
/// Ties keep catalog order.
pub fn rank_causes(rule: &KpiRule, severity: Severity) -> Vec<RankedCause> {
    let mut ranked: Vec<RankedCause> = rule
        .causes_for(severity)
        .iter()
        .map(|template| RankedCause {
            template: template.clone(),
            confidence_score: cause_confidence(template.probability),
        })
        .collect();
    ranked.sort_by(|a, b| b.probability().total_cmp(&a.probability()));
    ranked
}

pub fn overall_confidence(reading: &SiteReading, causes: &[RankedCause]) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if reading.has_sector_info() {
        confidence += 0.1;
    }
    if !causes.is_empty() {
        confidence += 0.1;
    }
    if reading.severity_hint().is_some_and(|hint| hint > 2.0) {
        confidence += 0.05;
    }
    confidence.min(MAX_CONFIDENCE)
}

fn generic_analysis(reading: &SiteReading, now: DateTime<Utc>) -> AnalysisResult {
    AnalysisResult {
        site: reading.clone(),
        analysis_timestamp: now,
        severity: Severity::Minor,
        confidence: GENERIC_CONFIDENCE,
        root_causes: vec![RankedCause {
            template: RootCause {
                cause: "KPI Threshold Exceeded".to_string(),
                probability: 0.5,
                indicators: vec!["Metric above normal range".to_string()],
                next_actions: vec!["Monitor trend".to_string(), "Investigate further".to_string()],
                timeline: None,
            },
            confidence_score: 0.5,
        }],
        impact_assessment: ImpactAssessment {
            user_experience: "Potential service degradation".to_string(),
            service_availability: "Monitoring required".to_string(),
            revenue_risk: "Low risk".to_string(),
            customer_satisfaction_risk: "Monitor for trends".to_string(),
        },
        estimated_users_affected: GENERIC_USERS_AFFECTED,
        business_impact: BusinessImpact {
            revenue_risk_percent: 5,
            customer_satisfaction_impact: 10,
            churn_risk_percent: 2,
            competitive_risk: CompetitiveRisk::Low,
        },
        recommendations: Vec::new(),
        auto_actions: Vec::new(),
    }
}
