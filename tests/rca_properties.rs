use kpi_rca::config::Config;
use kpi_rca::http::load_catalog;
use kpi_rca::rca::types::{Effort, Priority};
use kpi_rca::rca::{RcaEngine, Severity, SiteReading, next_best_action};
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_VALUES: &[f64] = &[
    -130.0, -115.0, -110.0, -105.0, -100.0, -90.0, 0.0, 1.0, 2.0, 3.0, 5.0, 6.0, 8.0, 10.0, 15.0,
    20.0,
];

fn expected_severity(value: f64, critical: f64, major: f64, reverse: bool) -> Severity {
    let (worse_than_critical, worse_than_major) = if reverse {
        (value < critical, value < major)
    } else {
        (value > critical, value > major)
    };
    if worse_than_critical {
        Severity::Critical
    } else if worse_than_major {
        Severity::Major
    } else {
        Severity::Minor
    }
}

#[test]
fn builtin_catalog_invariants_hold_for_all_rules() {
    let engine = RcaEngine::default();
    let catalog = engine.catalog();

    for kpi in catalog.kpi_names() {
        let rule = catalog.lookup(kpi).unwrap();
        for &value in SAMPLE_VALUES {
            let result = engine.analyze(&SiteReading::new(kpi, value));
            let t = rule.thresholds;
            assert_eq!(
                result.severity,
                expected_severity(value, t.critical, t.major, rule.reverse_direction),
                "{kpi} at {value}"
            );

            for cause in &result.root_causes {
                let expected = (cause.probability() * 1.2).min(0.95);
                assert!((cause.confidence_score - expected).abs() < 1e-12);
            }
            assert!(
                result
                    .root_causes
                    .windows(2)
                    .all(|w| w[0].probability() >= w[1].probability())
            );

            let (users, revenue) = match result.severity {
                Severity::Critical => (800, 45),
                Severity::Major => (500, 30),
                Severity::Minor => (200, 15),
            };
            assert_eq!(result.estimated_users_affected, users);
            assert_eq!(result.business_impact.revenue_risk_percent, revenue);

            assert!(result.recommendations.len() <= 6);
            for rec in &result.recommendations {
                let rank = result
                    .root_causes
                    .iter()
                    .position(|c| c.name() == rec.root_cause)
                    .unwrap();
                assert_eq!(rec.priority, Priority::for_rank(rank));
            }
        }
    }
}

#[test]
fn rrc_critical_example() {
    let result = RcaEngine::default().analyze(&SiteReading::new("RRC Setup Failure Rate", 20.0));
    assert_eq!(result.severity, Severity::Critical);
    assert_eq!(result.root_causes[0].name(), "Core Network Congestion");
    assert!((result.root_causes[0].confidence_score - 0.42).abs() < 1e-9);
    assert_eq!(result.estimated_users_affected, 800);
    assert_eq!(result.business_impact.revenue_risk_percent, 45);
    assert_eq!(result.auto_actions[0].action, "Enable enhanced monitoring");
}

#[test]
fn rsrp_uses_reverse_thresholds() {
    let engine = RcaEngine::default();
    assert_eq!(
        engine.analyze(&SiteReading::new("RSRP (dBm)", -115.0)).severity,
        Severity::Critical
    );
    assert_eq!(
        engine.analyze(&SiteReading::new("RSRP (dBm)", -105.0)).severity,
        Severity::Major
    );
    assert_eq!(
        engine.analyze(&SiteReading::new("RSRP (dBm)", -95.0)).severity,
        Severity::Minor
    );
}

#[test]
fn unknown_kpi_falls_back_to_generic_result() {
    let result = RcaEngine::default().analyze(&SiteReading::new("Unknown KPI", 5.0).with_id("X1"));
    assert_eq!(result.severity, Severity::Minor);
    assert_eq!(result.confidence, 0.6);
    assert_eq!(result.root_causes.len(), 1);
    assert_eq!(result.root_causes[0].name(), "KPI Threshold Exceeded");
    assert_eq!(result.estimated_users_affected, 100);
    assert!(result.recommendations.is_empty());
    assert!(result.auto_actions.is_empty());

    let nba = next_best_action(&result);
    assert_eq!(nba.site_id.as_deref(), Some("X1"));
    assert!(nba.primary_recommendation.is_none());
    assert_eq!(nba.expected_impact.success_probability, 0.5);
}

fn example_rules_engine() -> RcaEngine {
    let mut config = Config::default();
    config.rca.rules_path = Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rules/example_rules.toml"));
    config.validate().unwrap();
    RcaEngine::new(Arc::new(load_catalog(&config).unwrap()))
}

#[test]
fn example_rules_file_replaces_builtin_catalog() {
    let engine = example_rules_engine();
    assert_eq!(
        engine.catalog().kpi_names(),
        vec![
            "Paging Success Rate",
            "RRC Setup Failure Rate",
            "RSRQ (dB)",
            "UL SINR (dB)"
        ]
    );

    // not in the file, so generic
    let bearer = engine.analyze(&SiteReading::new("Bearer Drop Rate", 9.0));
    assert_eq!(bearer.confidence, 0.6);
}

#[test]
fn example_rules_reverse_metrics() {
    let engine = example_rules_engine();

    let critical = engine.analyze(&SiteReading::new("UL SINR (dB)", 3.0));
    assert_eq!(critical.severity, Severity::Critical);
    assert_eq!(critical.root_causes[0].name(), "Uplink Interference");
    let efforts: Vec<Effort> = critical
        .recommendations
        .iter()
        .map(|r| r.estimated_effort)
        .collect();
    assert_eq!(
        efforts,
        vec![
            Effort::Medium,
            Effort::Medium,
            Effort::Low,
            Effort::Medium,
            Effort::Medium,
            Effort::Medium
        ]
    );
    // no timeline in the file falls back to the default one
    assert_eq!(critical.recommendations[0].timeline.resolution, "2-4 hours");

    assert_eq!(
        engine.analyze(&SiteReading::new("Paging Success Rate", 95.0)).severity,
        Severity::Major
    );
    assert_eq!(
        engine.analyze(&SiteReading::new("Paging Success Rate", 98.5)).severity,
        Severity::Minor
    );
    assert_eq!(
        engine.analyze(&SiteReading::new("RSRQ (dB)", -15.0)).severity,
        Severity::Critical
    );
}

#[test]
fn example_rules_minor_reading_uses_moderate_tier() {
    let engine = example_rules_engine();

    let minor = engine.analyze(&SiteReading::new("RRC Setup Failure Rate", 5.0));
    assert_eq!(minor.severity, Severity::Minor);
    let names: Vec<&str> = minor.root_causes.iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["Interference Issues", "Capacity Constraints", "Configuration Drift"]
    );
    assert!(minor.auto_actions.is_empty());

    let major = engine.analyze(&SiteReading::new("RRC Setup Failure Rate", 10.0));
    let names: Vec<&str> = major.root_causes.iter().map(|c| c.name()).collect();
    // equal probabilities keep file order
    assert_eq!(
        names,
        vec![
            "Core Network Congestion",
            "Radio Resource Shortage",
            "Neighbor Relation Issues",
            "Hardware/Software Issues"
        ]
    );
    assert_eq!(major.recommendations.len(), 6);
}
