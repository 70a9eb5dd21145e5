//! Recommendation, auto-action and next-best-action synthesis.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{
    AnalysisResult, AutoAction, AutomationLevel, BusinessImpact, Effort, Priority, RankedCause,
    Recommendation, RiskLevel, Severity,
};

/// Causes considered when building recommendations
pub const MAX_RECOMMENDED_CAUSES: usize = 3;
/// Actions taken from each considered cause
pub const MAX_ACTIONS_PER_CAUSE: usize = 2;

const LOW_EFFORT_KEYWORDS: &[&str] = &["check", "monitor", "review"];
const MEDIUM_EFFORT_KEYWORDS: &[&str] = &["optimize", "configure", "update"];
const HIGH_EFFORT_KEYWORDS: &[&str] = &["deploy", "install", "replace"];

/// Estimate effort from the action wording. Buckets are tried low, medium, high; unmatched is medium.
pub fn estimate_effort(action: &str) -> Effort {
    let lower = action.to_lowercase();
    let matches = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if matches(LOW_EFFORT_KEYWORDS) {
        Effort::Low
    } else if matches(MEDIUM_EFFORT_KEYWORDS) {
        Effort::Medium
    } else if matches(HIGH_EFFORT_KEYWORDS) {
        Effort::High
    } else {
        Effort::Medium
    }
}

/// One recommendation per (cause, action) pair, cause rank major, action rank minor.
pub fn generate_recommendations(causes: &[RankedCause]) -> Vec<Recommendation> {
    causes
        .iter()
        .take(MAX_RECOMMENDED_CAUSES)
        .enumerate()
        .flat_map(|(i, cause)| {
            cause
                .template
                .next_actions
                .iter()
                .take(MAX_ACTIONS_PER_CAUSE)
                .enumerate()
                .map(move |(j, action)| Recommendation {
                    id: format!("rec_{i}_{j}"),
                    priority: Priority::for_rank(i),
                    action: action.clone(),
                    root_cause: cause.name().to_string(),
                    estimated_effort: estimate_effort(action),
                    success_probability: cause.probability() * 0.8,
                    timeline: cause.template.timeline.clone().unwrap_or_default(),
                })
        })
        .collect()
}

pub fn suggest_auto_actions(severity: Severity, causes: &[RankedCause]) -> Vec<AutoAction> {
    let mut actions = Vec::new();

    if severity == Severity::Critical {
        actions.push(AutoAction {
            action: "Enable enhanced monitoring".to_string(),
            description: "Automatically increase monitoring frequency".to_string(),
            automation_level: AutomationLevel::Full,
            risk_level: RiskLevel::Low,
        });
    }

    if let Some(primary) = causes.first() {
        let name = primary.name().to_lowercase();
        if name.contains("monitoring") || name.contains("configuration") {
            actions.push(AutoAction {
                action: "Configuration audit".to_string(),
                description: "Automatically check configuration parameters".to_string(),
                automation_level: AutomationLevel::Full,
                risk_level: RiskLevel::Low,
            });
        }
    }

    actions
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedImpact {
    pub resolution_time: String,
    pub success_probability: f64,
    pub effort_required: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub severity: Severity,
    pub affected_users: u32,
    pub business_impact: BusinessImpact,
}

/// Action-oriented view of an analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextBestAction {
    pub site_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub primary_recommendation: Option<Recommendation>,
    pub alternative_actions: Vec<Recommendation>,
    pub automated_actions: Vec<AutoAction>,
    pub confidence: f64,
    pub expected_impact: ExpectedImpact,
    pub risk_assessment: RiskAssessment,
}

pub fn next_best_action(analysis: &AnalysisResult) -> NextBestAction {
    let primary = analysis.recommendations.first().cloned();
    let alternatives = analysis
        .recommendations
        .iter()
        .skip(1)
        .take(2)
        .cloned()
        .collect();

    let expected_impact = match &primary {
        Some(rec) => ExpectedImpact {
            resolution_time: rec.timeline.resolution.clone(),
            success_probability: rec.success_probability,
            effort_required: rec.estimated_effort.label().to_string(),
        },
        None => ExpectedImpact {
            resolution_time: "Unknown".to_string(),
            success_probability: 0.5,
            effort_required: "Unknown".to_string(),
        },
    };

    NextBestAction {
        site_id: analysis.site.id(),
        timestamp: analysis.analysis_timestamp,
        primary_recommendation: primary,
        alternative_actions: alternatives,
        automated_actions: analysis.auto_actions.clone(),
        confidence: analysis.confidence,
        expected_impact,
        risk_assessment: RiskAssessment {
            severity: analysis.severity,
            affected_users: analysis.estimated_users_affected,
            business_impact: analysis.business_impact.clone(),
        },
    }
}
