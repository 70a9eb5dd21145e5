//! Records shared by the rule catalog and the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::deserializers::{is_truthy, numeric_value, site_id};
use crate::error::{KpiRcaError, Result};

/// How bad a KPI reading is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
        }
    }

    /// Cause tier consulted for this severity.
    pub fn cause_tier(self) -> CauseTier {
        match self {
            Severity::Critical | Severity::Major => CauseTier::High,
            Severity::Minor => CauseTier::Moderate,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket of candidate causes within a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseTier {
    High,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub critical: f64,
    pub major: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub resolution: String,
    pub monitoring: String,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            resolution: "2-4 hours".to_string(),
            monitoring: "24 hours".to_string(),
        }
    }
}

/// Candidate root cause template. Catalog-owned and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub cause: String,
    pub probability: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub next_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

/// Per-request copy of a [`RootCause`] carrying its derived confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCause {
    #[serde(flatten)]
    pub template: RootCause,
    pub confidence_score: f64,
}

impl RankedCause {
    pub fn name(&self) -> &str {
        &self.template.cause
    }

    pub fn probability(&self) -> f64 {
        self.template.probability
    }
}

/// Causes grouped by tier. `moderate` is optional and resolves to `high` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CauseTiers {
    #[serde(default)]
    pub high: Vec<RootCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderate: Option<Vec<RootCause>>,
}

impl CauseTiers {
    pub fn resolve(&self, tier: CauseTier) -> &[RootCause] {
        match tier {
            CauseTier::High => &self.high,
            CauseTier::Moderate => self.moderate.as_deref().unwrap_or(&self.high),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.moderate.as_ref().is_none_or(|m| m.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RootCause> {
        self.high
            .iter()
            .chain(self.moderate.iter().flat_map(|m| m.iter()))
    }
}

/// Rule for one KPI name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRule {
    pub thresholds: Thresholds,
    /// Lower values are worse (signal strength) when set.
    #[serde(default)]
    pub reverse_direction: bool,
    pub root_causes: CauseTiers,
}

impl KpiRule {
    /// Classify a reading against the thresholds. Comparisons are strict.
    pub fn classify(&self, value: f64) -> Severity {
        let Thresholds { critical, major } = self.thresholds;
        if self.reverse_direction {
            if value < critical {
                Severity::Critical
            } else if value < major {
                Severity::Major
            } else {
                Severity::Minor
            }
        } else if value > critical {
            Severity::Critical
        } else if value > major {
            Severity::Major
        } else {
            Severity::Minor
        }
    }

    pub fn causes_for(&self, severity: Severity) -> &[RootCause] {
        self.root_causes.resolve(severity.cause_tier())
    }
}

/// Site payload as it arrives on the wire, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SiteInput {
    pub fields: Map<String, Value>,
}

/// Keys the sector context may arrive under, in lookup order
const SECTOR_INFO_KEYS: &[&str] = &["sectorInfo", "sector_info"];

/// Validated site KPI reading.
///
/// `kpi` and `value` are checked once at the boundary. Everything else is read
/// from the payload on demand, and the reading serializes as exactly that
/// payload so results echo the input as it was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReading {
    kpi: String,
    value: f64,
    payload: Map<String, Value>,
}

impl SiteReading {
    pub fn new(kpi: impl Into<String>, value: f64) -> Self {
        let kpi = kpi.into();
        let mut payload = Map::new();
        payload.insert("kpi".into(), Value::String(kpi.clone()));
        payload.insert("value".into(), Value::from(value));
        Self {
            kpi,
            value,
            payload,
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_field("id", Value::String(id.into()))
    }

    pub fn with_sector_info(self, info: Value) -> Self {
        self.with_field("sectorInfo", info)
    }

    pub fn with_severity_hint(self, hint: f64) -> Self {
        self.with_field("severity", Value::from(hint))
    }

    /// Attach an arbitrary payload field. `kpi` and `value` are fixed at construction.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if key != "kpi" && key != "value" {
            self.payload.insert(key, value);
        }
        self
    }

    /// KPI name exactly as sent; catalog lookups use it unmodified.
    pub fn kpi(&self) -> &str {
        &self.kpi
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Site identifier when it is a non-blank string or a number.
    pub fn id(&self) -> Option<String> {
        self.payload.get("id").and_then(site_id)
    }

    pub fn sector_info(&self) -> Option<&Value> {
        SECTOR_INFO_KEYS.iter().find_map(|k| self.payload.get(*k))
    }

    pub fn has_sector_info(&self) -> bool {
        self.sector_info().is_some_and(is_truthy)
    }

    /// Numeric severity hint. Labels such as `"critical"` are echoed but carry no hint.
    pub fn severity_hint(&self) -> Option<f64> {
        self.payload.get("severity").and_then(numeric_value)
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl Serialize for SiteReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

impl TryFrom<SiteInput> for SiteReading {
    type Error = KpiRcaError;

    fn try_from(input: SiteInput) -> Result<Self> {
        let payload = input.fields;

        let kpi = match payload.get("kpi") {
            Some(Value::String(k)) if !k.trim().is_empty() => k.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(KpiRcaError::invalid_input("site.kpi is required"));
            }
            Some(other) => {
                return Err(KpiRcaError::invalid_input(format!(
                    "site.kpi must be a string, got {}",
                    other
                )));
            }
        };

        let value = match payload.get("value") {
            None | Some(Value::Null) => {
                return Err(KpiRcaError::invalid_input("site.value is required"));
            }
            Some(raw) => numeric_value(raw).ok_or_else(|| {
                KpiRcaError::invalid_input(format!(
                    "site.value must be a finite number, got {}",
                    raw
                ))
            })?,
        };

        Ok(Self {
            kpi,
            value,
            payload,
        })
    }
}

/// Qualitative impact of a degradation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactAssessment {
    pub user_experience: String,
    pub service_availability: String,
    pub revenue_risk: String,
    pub customer_satisfaction_risk: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompetitiveRisk {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessImpact {
    pub revenue_risk_percent: u32,
    pub customer_satisfaction_impact: u32,
    pub churn_risk_percent: u32,
    pub competitive_risk: CompetitiveRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority for a cause at the given rank (0 = most probable).
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => Priority::High,
            1 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

/// Coarse effort bucket for a remediation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effort {
    #[serde(rename = "Low (1-2 hours)")]
    Low,
    #[serde(rename = "Medium (4-8 hours)")]
    Medium,
    #[serde(rename = "High (1-2 days)")]
    High,
}

impl Effort {
    pub fn label(&self) -> &'static str {
        match self {
            Effort::Low => "Low (1-2 hours)",
            Effort::Medium => "Medium (4-8 hours)",
            Effort::High => "High (1-2 days)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub priority: Priority,
    pub action: String,
    pub root_cause: String,
    pub estimated_effort: Effort,
    pub success_probability: f64,
    pub timeline: Timeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationLevel {
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
}

/// Remediation step that can run without human approval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoAction {
    pub action: String,
    pub description: String,
    pub automation_level: AutomationLevel,
    pub risk_level: RiskLevel,
}

/// Full RCA report for one site reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub site: SiteReading,
    pub analysis_timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub confidence: f64,
    pub root_causes: Vec<RankedCause>,
    pub impact_assessment: ImpactAssessment,
    pub estimated_users_affected: u32,
    pub business_impact: BusinessImpact,
    pub recommendations: Vec<Recommendation>,
    pub auto_actions: Vec<AutoAction>,
}
