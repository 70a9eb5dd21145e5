//! Root cause analysis: rule catalog, per-site engine, and fleet summary.
//! Deterministic given a reading and the catalog; only the summary draws randomness.

pub mod catalog;
pub mod engine;
pub mod impact;
pub mod recommend;
pub mod summary;
pub mod types;

pub use catalog::RuleCatalog;
pub use engine::RcaEngine;
pub use recommend::{NextBestAction, next_best_action};
pub use summary::{FleetSummary, summarize};
pub use types::{AnalysisResult, Severity, SiteInput, SiteReading};
