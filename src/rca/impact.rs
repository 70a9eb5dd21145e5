//! Impact, affected-user and business scoring keyed by severity.

use super::catalog::{BEARER_DROP_RATE, RRC_SETUP_FAILURE_RATE, RSRP_DBM};
use super::types::{BusinessImpact, CompetitiveRisk, ImpactAssessment, Severity};

/// Assumed subscribers served by one sector
pub const BASE_USERS_PER_SECTOR: f64 = 1000.0;

pub fn assess_impact(kpi: &str, severity: Severity) -> ImpactAssessment {
    ImpactAssessment {
        user_experience: user_experience(kpi, severity).to_string(),
        service_availability: service_availability(severity).to_string(),
        revenue_risk: revenue_risk(severity).to_string(),
        customer_satisfaction_risk: satisfaction_risk(severity).to_string(),
    }
}

/// User-facing symptom for a KPI at a severity; `"Unknown impact"` for KPIs without text.
pub fn user_experience(kpi: &str, severity: Severity) -> &'static str {
    use Severity::*;
    match (kpi, severity) {
        (RRC_SETUP_FAILURE_RATE, Critical) => "Users cannot connect - service unavailable",
        (RRC_SETUP_FAILURE_RATE, Major) => "Connection delays - poor user experience",
        (RRC_SETUP_FAILURE_RATE, Minor) => "Occasional connection issues",
        (BEARER_DROP_RATE, Critical) => "Frequent call drops - severe service degradation",
        (BEARER_DROP_RATE, Major) => "Intermittent drops - reduced reliability",
        (BEARER_DROP_RATE, Minor) => "Rare connection interruptions",
        (RSRP_DBM, Critical) => "No coverage - service unavailable",
        (RSRP_DBM, Major) => "Poor signal - degraded performance",
        (RSRP_DBM, Minor) => "Weak signal - minor quality issues",
        _ => "Unknown impact",
    }
}

pub fn service_availability(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Service unavailable (0-20% availability)",
        Severity::Major => "Severely degraded (20-60% availability)",
        Severity::Minor => "Minor impact (60-90% availability)",
    }
}

pub fn revenue_risk(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "High (potential revenue loss 30-50%)",
        Severity::Major => "Medium (potential revenue loss 10-30%)",
        Severity::Minor => "Low (potential revenue loss 0-10%)",
    }
}

pub fn satisfaction_risk(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Severe customer dissatisfaction expected",
        Severity::Major => "Moderate customer impact",
        Severity::Minor => "Minor customer experience degradation",
    }
}

/// Share of a sector's users affected at a severity
pub fn severity_multiplier(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 0.8,
        Severity::Major => 0.5,
        Severity::Minor => 0.2,
    }
}

pub fn estimate_affected_users(severity: Severity) -> u32 {
    (BASE_USERS_PER_SECTOR * severity_multiplier(severity)).floor() as u32
}

pub fn business_impact(severity: Severity) -> BusinessImpact {
    let base: u32 = match severity {
        Severity::Critical => 3,
        Severity::Major => 2,
        Severity::Minor => 1,
    };
    BusinessImpact {
        revenue_risk_percent: base * 15,
        customer_satisfaction_impact: base * 20,
        churn_risk_percent: base * 5,
        competitive_risk: match severity {
            Severity::Critical => CompetitiveRisk::High,
            Severity::Major => CompetitiveRisk::Medium,
            Severity::Minor => CompetitiveRisk::Low,
        },
    }
}
