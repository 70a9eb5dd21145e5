use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use kpi_rca::http::{AppState, build_router};
use kpi_rca::kpi::{KpiService, source::CsvSource};
use kpi_rca::rca::RcaEngine;
use serde_json::{Value, json};
use std::io::Write;
use std::time::Duration;
use tower::ServiceExt;

fn router_with(kpi: KpiService) -> Router {
    build_router(
        AppState::new(RcaEngine::default(), kpi),
        Duration::from_secs(5),
    )
}

fn router() -> Router {
    router_with(KpiService::new(Box::new(kpi_rca::kpi::source::EmptySource), 8))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = send(router(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "kpi-rca");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn analyze_critical_rrc_site() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": {"id": "DAL001", "kpi": "RRC Setup Failure Rate", "value": 20}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], "critical");
    assert_eq!(body["estimated_users_affected"], 800);
    assert_eq!(body["business_impact"]["revenue_risk_percent"], 45);
    assert_eq!(body["root_causes"][0]["cause"], "Core Network Congestion");
    let top = body["root_causes"][0]["confidence_score"].as_f64().unwrap();
    assert!((top - 0.42).abs() < 1e-9);
    assert_eq!(body["site"]["id"], "DAL001");
    assert!(body["recommendations"].as_array().unwrap().len() <= 6);
}

#[tokio::test]
async fn analyze_accepts_camel_case_sector_info() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": {"kpi": "Bearer Drop Rate", "value": 1.0, "sectorInfo": {"azimuth": 120}}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site"]["sectorInfo"]["azimuth"], 120);
    // base 0.7 + sector info 0.1 + causes 0.1
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((confidence - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn analyze_echoes_site_as_sent() {
    let site = json!({
        "id": {"region": "DAL"},
        "kpi": "Bearer Drop Rate",
        "value": 3,
        "severity": "critical",
        "vendor": "Ericsson"
    });
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": site.clone()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site"], site);
    assert_eq!(body["site"]["severity"], "critical");
    assert_eq!(body["severity"], "major");
}

#[tokio::test]
async fn analyze_padded_kpi_name_is_generic() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": {"kpi": " RSRP (dBm) ", "value": -115}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confidence"], 0.6);
    assert_eq!(body["root_causes"][0]["cause"], "KPI Threshold Exceeded");
    assert_eq!(body["site"]["kpi"], " RSRP (dBm) ");

    let (status, _) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": {"kpi": "   ", "value": 1}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_rejects_non_numeric_value() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/analyze",
        Some(json!({"site": {"kpi": "RSRP (dBm)", "value": "abc"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(body["error"]["message"].as_str().unwrap().contains("value"));
}

#[tokio::test]
async fn analyze_rejects_missing_site() {
    let (status, body) = send(router(), Method::POST, "/rca/analyze", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("kpi"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rca/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_best_action_defaults_for_unknown_kpi() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/recommendations/next-best-action",
        Some(json!({"site": {"id": 42, "kpi": "Unknown KPI", "value": 5}, "context": {"user": "noc"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_id"], "42");
    assert!(body["primary_recommendation"].is_null());
    assert_eq!(body["alternative_actions"], json!([]));
    assert_eq!(body["confidence"], 0.6);
    assert_eq!(body["expected_impact"]["resolution_time"], "Unknown");
    assert_eq!(body["expected_impact"]["success_probability"], 0.5);
    assert_eq!(body["expected_impact"]["effort_required"], "Unknown");
    assert_eq!(body["risk_assessment"]["severity"], "minor");
    assert_eq!(body["risk_assessment"]["affected_users"], 100);
}

#[tokio::test]
async fn next_best_action_for_critical_site() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/recommendations/next-best-action",
        Some(json!({"site": {"kpi": "RRC Setup Failure Rate", "value": 20}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primary_recommendation"]["priority"], "high");
    assert_eq!(body["alternative_actions"].as_array().unwrap().len(), 2);
    assert!(body["site_id"].is_null());
}

#[tokio::test]
async fn summary_counts_are_bounded() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/rca/summary",
        Some(json!({"site_ids": ["a", "b", "c"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sites"], 3);
    assert!(body["critical_issues"].as_u64().unwrap() <= 1);
    assert!(body["major_issues"].as_u64().unwrap() <= 1);
    assert_eq!(body["auto_resolvable"], 0);
    assert_eq!(body["estimated_resolution_time"], "2-8 hours");
    assert_eq!(body["confidence_avg"], 0.82);
}

#[tokio::test]
async fn prompt_query_reads_csv_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "date,kpi,geo,value").unwrap();
    writeln!(file, "2024-05-02,Latency,Chicago,40").unwrap();
    writeln!(file, "2024-05-01,Latency,Chicago,30").unwrap();
    writeln!(file, "2024-05-01,Latency,Chicago,32").unwrap();
    writeln!(file, "2024-05-01,CQI,Dallas,9").unwrap();
    file.flush().unwrap();

    let app = router_with(KpiService::new(Box::new(CsvSource::new(file.path())), 8));
    let (status, body) = send(
        app,
        Method::POST,
        "/assistant/prompt-query",
        Some(json!({"prompt": "show latency in Chicago this week"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Latency in Chicago averages 34.0 over this week.");
    let chart = &body["charts"][0];
    assert_eq!(chart["type"], "line");
    assert_eq!(chart["labels"], json!(["2024-05-01", "2024-05-02"]));
    assert_eq!(chart["data"], json!([31.0, 40.0]));
    assert_eq!(chart["datasetLabel"], "Latency");
    assert_eq!(body["actions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn prompt_query_without_data() {
    let (status, body) = send(
        router(),
        Method::POST,
        "/assistant/prompt-query",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "No CQI data available for Dallas.");
}
