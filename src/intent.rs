//! Intent extraction for operator prompts
//!
//! Turns free text like "show CQI in Chicago yesterday" into the
//! `{kpi, geo, time}` triple the KPI service queries. Uses keyword matching
//! heuristics over a fixed vocabulary.

use serde::{Deserialize, Serialize};

/// Markets the dashboards cover; the first entry is the default
pub const MARKETS: &[&str] = &["Dallas", "Oklahoma", "Chicago"];

/// KPI keywords in precedence order, with the KPI they select
pub const KPI_KEYWORDS: &[(&str, &str)] = &[
    ("latency", "Latency"),
    ("cqi", "CQI"),
    ("throughput", "Throughput"),
];

/// Time windows in precedence order
pub const TIME_KEYWORDS: &[&str] = &["today", "yesterday", "this week"];

pub const DEFAULT_KPI: &str = "CQI";
pub const DEFAULT_TIME: &str = "last 7 days";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    pub kpi: String,
    pub geo: String,
    pub time: String,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            kpi: DEFAULT_KPI.to_string(),
            geo: MARKETS[0].to_string(),
            time: DEFAULT_TIME.to_string(),
        }
    }
}

/// Extract an intent from prompt text.
///
/// Each slot takes the first matching keyword in precedence order and falls
/// back to its default when nothing matches.
///
/// # Examples
/// ```ignore
/// let intent = extract_intent("Throughput in Oklahoma this week");
/// assert_eq!(intent.kpi, "Throughput");
/// assert_eq!(intent.geo, "Oklahoma");
/// assert_eq!(intent.time, "this week");
/// ```
pub fn extract_intent(prompt: &str) -> Intent {
    let text = prompt.to_lowercase();

    let kpi = KPI_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map_or(DEFAULT_KPI, |(_, kpi)| *kpi);

    let geo = MARKETS
        .iter()
        .find(|market| text.contains(&market.to_lowercase()))
        .copied()
        .unwrap_or(MARKETS[0]);

    let time = TIME_KEYWORDS
        .iter()
        .find(|window| text.contains(*window))
        .copied()
        .unwrap_or(DEFAULT_TIME);

    Intent {
        kpi: kpi.to_string(),
        geo: geo.to_string(),
        time: time.to_string(),
    }
}
