//! Static KPI rule catalog.
//!
//! Built once at startup (built-in rules or a TOML rules file) and shared
//! read-only behind an `Arc` for the life of the process.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::types::{CauseTiers, KpiRule, RootCause, Thresholds, Timeline};
use crate::error::{KpiRcaError, Result};

pub const RRC_SETUP_FAILURE_RATE: &str = "RRC Setup Failure Rate";
pub const BEARER_DROP_RATE: &str = "Bearer Drop Rate";
pub const RSRP_DBM: &str = "RSRP (dBm)";

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: HashMap<String, KpiRule>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    rules: HashMap<String, KpiRule>,
}

impl RuleCatalog {
    /// Catalog shipped with the service: RRC setup failures, bearer drops and RSRP.
    pub fn builtin() -> Self {
        let mut rules = HashMap::new();

        rules.insert(
            RRC_SETUP_FAILURE_RATE.to_string(),
            KpiRule {
                thresholds: Thresholds {
                    critical: 15.0,
                    major: 8.0,
                },
                reverse_direction: false,
                root_causes: CauseTiers {
                    high: vec![
                        cause(
                            "Core Network Congestion",
                            0.35,
                            &["High MME CPU", "S1 congestion", "Core latency"],
                            &[
                                "Scale MME capacity",
                                "Optimize S1 interface",
                                "Check core connectivity",
                                "Implement load balancing",
                            ],
                            ("1-2 hours", "48 hours"),
                        ),
                        cause(
                            "Radio Resource Shortage",
                            0.25,
                            &["High PRB utilization", "RACH overload"],
                            &[
                                "Add carrier capacity",
                                "Optimize RACH configuration",
                                "Implement carrier aggregation",
                            ],
                            ("4-8 hours", "72 hours"),
                        ),
                        cause(
                            "Neighbor Relations Issues",
                            0.20,
                            &["Missing neighbors", "Handover failures"],
                            &[
                                "Audit neighbor list",
                                "Update ANR settings",
                                "Perform drive test",
                            ],
                            ("2-6 hours", "24 hours"),
                        ),
                    ],
                    moderate: None,
                },
            },
        );

        rules.insert(
            BEARER_DROP_RATE.to_string(),
            KpiRule {
                thresholds: Thresholds {
                    critical: 5.0,
                    major: 2.0,
                },
                reverse_direction: false,
                root_causes: CauseTiers {
                    high: vec![
                        cause(
                            "Handover Failures",
                            0.40,
                            &["High HO failure rate", "Coverage gaps"],
                            &[
                                "Optimize handover parameters",
                                "Check neighbor configuration",
                                "Perform coverage analysis",
                            ],
                            ("2-4 hours", "48 hours"),
                        ),
                        cause(
                            "Poor Radio Conditions",
                            0.30,
                            &["Low RSRP/RSRQ", "High interference"],
                            &[
                                "Check RF conditions",
                                "Optimize antenna settings",
                                "Investigate interference",
                            ],
                            ("4-12 hours", "1 week"),
                        ),
                    ],
                    moderate: None,
                },
            },
        );

        rules.insert(
            RSRP_DBM.to_string(),
            KpiRule {
                thresholds: Thresholds {
                    critical: -110.0,
                    major: -100.0,
                },
                reverse_direction: true,
                root_causes: CauseTiers {
                    high: vec![
                        cause(
                            "Coverage Gap",
                            0.35,
                            &["Distance from cell", "Terrain obstacles"],
                            &[
                                "Plan new site deployment",
                                "Optimize antenna patterns",
                                "Consider small cells",
                            ],
                            ("1-4 weeks", "1 month"),
                        ),
                        cause(
                            "Antenna/RF Issues",
                            0.25,
                            &["Antenna misalignment", "Feeder issues"],
                            &[
                                "Check antenna alignment",
                                "Test RF components",
                                "Schedule maintenance",
                            ],
                            ("4-12 hours", "1 week"),
                        ),
                    ],
                    moderate: None,
                },
            },
        );

        Self { rules }
    }

    /// Build a catalog from explicit rules, validating each one.
    pub fn from_rules(rules: HashMap<String, KpiRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(KpiRcaError::config("rule catalog defines no KPIs"));
        }
        for (name, rule) in &rules {
            validate_rule(name, rule)?;
        }
        Ok(Self { rules })
    }

    /// Parse a catalog from TOML of the form `[rules."<kpi name>"]`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_rules(file.rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KpiRcaError::config(format!("cannot read rules file {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            "Loaded {} KPI rules from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Rule for a KPI name. A miss selects the generic analysis path.
    pub fn lookup(&self, kpi: &str) -> Option<&KpiRule> {
        self.rules.get(kpi)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// KPI names in sorted order
    pub fn kpi_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn cause(
    name: &str,
    probability: f64,
    indicators: &[&str],
    next_actions: &[&str],
    (resolution, monitoring): (&str, &str),
) -> RootCause {
    RootCause {
        cause: name.to_string(),
        probability,
        indicators: indicators.iter().map(|s| s.to_string()).collect(),
        next_actions: next_actions.iter().map(|s| s.to_string()).collect(),
        timeline: Some(Timeline {
            resolution: resolution.to_string(),
            monitoring: monitoring.to_string(),
        }),
    }
}

fn validate_rule(name: &str, rule: &KpiRule) -> Result<()> {
    let Thresholds { critical, major } = rule.thresholds;
    if !critical.is_finite() || !major.is_finite() {
        return Err(KpiRcaError::config(format!(
            "rule '{name}': thresholds must be finite"
        )));
    }
    let ordered = if rule.reverse_direction {
        critical <= major
    } else {
        critical >= major
    };
    if !ordered {
        return Err(KpiRcaError::config(format!(
            "rule '{name}': critical threshold {critical} is inconsistent with major {major} (reverse_direction = {})",
            rule.reverse_direction
        )));
    }
    if rule.root_causes.is_empty() {
        return Err(KpiRcaError::config(format!(
            "rule '{name}': no root causes defined"
        )));
    }
    if let Some(bad) = rule
        .root_causes
        .iter()
        .find(|c| !(0.0..=1.0).contains(&c.probability))
    {
        return Err(KpiRcaError::config(format!(
            "rule '{name}': cause '{}' has probability {} outside 0..=1",
            bad.cause, bad.probability
        )));
    }
    Ok(())
}
