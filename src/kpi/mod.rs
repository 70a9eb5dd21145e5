//! KPI trend retrieval for prompt queries.

pub mod source;

use lru::LruCache;
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::error::{KpiRcaError, Result};
use crate::intent::Intent;
pub use source::{KpiPoint, KpiSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub title: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    #[serde(rename = "datasetLabel")]
    pub dataset_label: String,
}

/// Reply to an operator prompt: summary text, one trend chart, follow-up actions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptResponse {
    pub reply: String,
    pub charts: Vec<Chart>,
    pub actions: Vec<String>,
}

pub struct KpiService {
    source: Box<dyn KpiSource>,
    cache: Mutex<LruCache<Intent, PromptResponse>>, // memoized per intent
}

impl KpiService {
    pub fn new(source: Box<dyn KpiSource>, cache_max: usize) -> Self {
        let cap = NonZeroUsize::new(cache_max).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn query(&self, intent: &Intent) -> Result<PromptResponse> {
        if let Some(hit) = self.lock_cache()?.get(intent).cloned() {
            tracing::debug!(kpi = %intent.kpi, geo = %intent.geo, "prompt cache hit");
            return Ok(hit);
        }

        let points = self.source.load(&intent.kpi, &intent.geo)?;
        let response = build_response(intent, &points);
        self.lock_cache()?.put(intent.clone(), response.clone());
        Ok(response)
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, LruCache<Intent, PromptResponse>>> {
        self.cache.lock().map_err(|_| KpiRcaError::Internal {
            message: "prompt cache lock poisoned".to_string(),
        })
    }
}

/// Mean value per date, dates ascending, rounded to two decimals.
pub fn daily_means(points: &[KpiPoint]) -> Vec<(String, f64)> {
    let mut by_date: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for p in points {
        let entry = by_date.entry(p.date.as_str()).or_insert((0.0, 0));
        entry.0 += p.value;
        entry.1 += 1;
    }
    by_date
        .into_iter()
        .map(|(date, (sum, count))| (date.to_string(), round2(sum / count as f64)))
        .collect()
}

pub fn build_response(intent: &Intent, points: &[KpiPoint]) -> PromptResponse {
    let Intent { kpi, geo, time } = intent;
    let (labels, data): (Vec<String>, Vec<f64>) = daily_means(points).into_iter().unzip();

    let reply = if data.is_empty() {
        format!("No {kpi} data available for {geo}.")
    } else {
        let avg = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
        format!("{kpi} in {geo} averages {avg:.1} over {time}.")
    };

    PromptResponse {
        reply,
        charts: vec![Chart {
            chart_type: "line".to_string(),
            title: format!("{kpi} trend in {geo}"),
            labels,
            data,
            dataset_label: kpi.clone(),
        }],
        actions: vec![
            format!("Investigate sites with high {kpi}"),
            "Check backhaul config".to_string(),
            format!("Add {kpi} threshold alert"),
        ],
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
