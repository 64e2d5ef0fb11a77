use common::Error;
use common::config::{ConfigOverrides, EngineConfig};
use insight::{DatasetRow, InsightEngine, InsightRequest, InsightResponse, InsightTopic, Severity};
use serde_json::{Value, json};

fn rows(values: Vec<Value>) -> Vec<DatasetRow> {
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap())
        .collect()
}

/// A small Meta-style export with vendor column names.
fn sample_records() -> Vec<DatasetRow> {
    rows(vec![
        json!({
            "Campaign name": "Summer", "Ad set name": "Broad", "Ad name": "Hook A", "Ad ID": 1001,
            "Amount spent": 400, "Impressions": 40000, "Link clicks": 800, "Purchases": 4,
            "Purchase value": 360, "Adds to cart": 40, "CTR 7d": 0.012, "CTR prev 7d": 0.02
        }),
        json!({
            "Campaign name": "Summer", "Ad set name": "Broad", "Ad name": "Hook B", "Ad ID": 1002,
            "Amount spent": 300, "Impressions": 30000, "Link clicks": 300, "Purchases": 12,
            "Purchase value": 1200, "Adds to cart": 30, "CTR 7d": 0.01, "CTR prev 7d": 0.011
        }),
        json!({
            "Campaign name": "Retarget", "Ad set name": "Warm", "Ad name": "Carousel", "Ad ID": 1003,
            "Amount spent": 30, "Impressions": 3000, "Link clicks": 30, "Purchases": 1,
            "Purchase value": 15, "Adds to cart": 5, "CTR 7d": null, "CTR prev 7d": null
        }),
        json!({
            "Campaign name": "Retarget", "Ad set name": "Warm", "Ad name": "UGC", "Ad ID": 1004,
            "Amount spent": "120", "Impressions": 10000, "Link clicks": 100, "Purchases": 2,
            "Purchase value": 156, "Adds to cart": "", "CTR 7d": "", "CTR prev 7d": ""
        }),
    ])
}

fn engine() -> InsightEngine {
    InsightEngine::new(EngineConfig::default()).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

#[test]
fn sample_export_resolves_vendor_columns() {
    let response = engine()
        .analyze(InsightRequest::new("sample", sample_records()))
        .unwrap();

    let mapping = &response.resolved_context.column_mapping;
    assert_eq!(mapping.spend, "Amount spent");
    assert_eq!(mapping.clicks, "Link clicks");
    assert_eq!(mapping.purchase_value.as_deref(), Some("Purchase value"));
    assert_eq!(mapping.adds_to_cart.as_deref(), Some("Adds to cart"));
    assert_eq!(mapping.ctr_7d.as_deref(), Some("CTR 7d"));
    assert_eq!(mapping.ctr_prev_7d.as_deref(), Some("CTR prev 7d"));
    assert_eq!(mapping.ad_name.as_deref(), Some("Ad name"));
    assert_eq!(mapping.adset_name.as_deref(), Some("Ad set name"));
    assert_eq!(
        response.resolved_context.failed_columns,
        vec!["ctr", "frequency", "roas", "status"]
    );
    assert_eq!(response.resolved_context.normalized_rows.len(), 4);
}

#[test]
fn sample_export_produces_expected_insights() {
    let response = engine()
        .analyze(InsightRequest::new("sample", sample_records()))
        .unwrap();

    let found: Vec<(InsightTopic, Severity)> = response
        .insights
        .iter()
        .map(|insight| (insight.topic, insight.severity))
        .collect();
    assert_eq!(
        found,
        vec![
            (InsightTopic::Roas, Severity::Critical),
            (InsightTopic::Conversion, Severity::Warning),
            (InsightTopic::Fatigue, Severity::Info),
            (InsightTopic::Roas, Severity::Warning),
        ]
    );
    assert_eq!(
        response.insights[0].impacted_entities,
        vec!["Summer, Broad, Hook A & 1001"]
    );
    assert_eq!(response.insights[3].impacted_entities, vec!["Retarget, Warm, UGC & 1004"]);
    assert_eq!(response.insights[3].summary, "ROAS below efficiency guardrail at 1.30.");

    // The below-minimum row never shows up.
    assert!(
        response
            .insights
            .iter()
            .all(|insight| insight.impacted_entities.iter().all(|e| !e.contains("Carousel")))
    );
}

#[test]
fn sample_export_summary_uses_summed_totals() {
    let response = engine()
        .analyze(InsightRequest::new("sample", sample_records()))
        .unwrap();
    let snapshot = &response.metrics_snapshot;

    assert_close(snapshot["spend"], 850.0);
    assert_close(snapshot["impressions"], 83000.0);
    assert_close(snapshot["clicks"], 1230.0);
    assert_close(snapshot["purchases"], 19.0);
    assert_close(snapshot["purchase_value"], 1731.0);
    assert_close(snapshot["adds_to_cart"], 75.0);
    assert_close(snapshot["ctr"], 1230.0 / 83000.0);
    assert_close(snapshot["roas"], 1731.0 / 850.0);
    assert_close(snapshot["atc_to_purchase"], 19.0 / 75.0);
}

#[test]
fn single_row_with_low_roas_yields_one_warning() {
    let records = rows(vec![
        json!({"spend": 100, "impressions": 1000, "clicks": 10, "purchase_value": 120}),
    ]);
    let response = engine().analyze(InsightRequest::new("single", records)).unwrap();

    assert_close(response.metrics_snapshot["roas"], 1.2);
    assert_eq!(response.insights.len(), 1);
    assert_eq!(response.insights[0].topic, InsightTopic::Roas);
    assert_eq!(response.insights[0].severity, Severity::Warning);
    assert!(response.insights[0].impacted_entities.is_empty());
}

#[test]
fn empty_records_are_rejected_before_any_stage() {
    let err = engine()
        .analyze(InsightRequest::new("empty", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn missing_required_columns_abort_the_analysis() {
    let records = rows(vec![json!({"Amount spent": 100, "Reach": 5000})]);
    let err = engine()
        .analyze(InsightRequest::new("no-clicks", records))
        .unwrap_err();
    match err {
        Error::UnresolvedColumns { fields, threshold } => {
            assert_eq!(fields, vec!["impressions", "clicks"]);
            assert_eq!(threshold, 0.6);
        }
        other => panic!("expected UnresolvedColumns, got {}", other),
    }
}

#[test]
fn manual_overrides_rescue_unrecognised_columns() {
    let records = rows(vec![
        json!({"Budget burned": 100, "Eyeballs": 1000, "Taps": 10, "Revenue": 300}),
    ]);
    let mut request = InsightRequest::new("overrides", records);
    request.manual_column_overrides = Some(
        [
            ("spend", "Budget burned"),
            ("impressions", "Eyeballs"),
            ("clicks", "Taps"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    );

    let response = engine().analyze(request).unwrap();
    assert_eq!(response.resolved_context.column_mapping.spend, "Budget burned");
    assert_eq!(
        response.resolved_context.column_mapping.purchase_value.as_deref(),
        Some("Revenue")
    );
    assert_close(response.metrics_snapshot["roas"], 3.0);
}

#[test]
fn override_naming_a_missing_required_column_aborts() {
    let records = rows(vec![
        json!({"Cost": 400, "Impressions": 1000, "Clicks": 10, "Revenue": 100}),
    ]);
    let mut request = InsightRequest::new("typo", records);
    request.manual_column_overrides = Some(
        [("spend", "Costs"), ("status", "Delivery")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );

    match engine().analyze(request).unwrap_err() {
        Error::UnresolvedColumns { fields, .. } => assert_eq!(fields, vec!["spend"]),
        other => panic!("expected UnresolvedColumns, got {}", other),
    }
}

#[test]
fn override_naming_a_missing_optional_column_still_binds() {
    let records = rows(vec![json!({"spend": 100, "impressions": 1000, "clicks": 10})]);
    let mut request = InsightRequest::new("optional", records);
    request.manual_column_overrides = Some(
        [("status".to_string(), "Delivery".to_string())]
            .into_iter()
            .collect(),
    );

    let response = engine().analyze(request).unwrap();
    assert_eq!(
        response.resolved_context.column_mapping.status.as_deref(),
        Some("Delivery")
    );
    assert!(!response.resolved_context.failed_columns.contains(&"status".to_string()));
}

#[test]
fn exact_canonical_names_resolve_at_any_threshold() {
    let records = rows(vec![json!({"spend": 60, "impressions": 600, "clicks": 6})]);
    for threshold in [0.0, 0.5, 1.0] {
        let overrides = ConfigOverrides {
            semantic_column_threshold: Some(threshold),
            ..Default::default()
        };
        let response = engine()
            .analyze_with_overrides(InsightRequest::new("exact", records.clone()), &overrides)
            .unwrap();
        let mapping = &response.resolved_context.column_mapping;
        assert_eq!(mapping.spend, "spend");
        assert_eq!(mapping.impressions, "impressions");
        assert_eq!(mapping.clicks, "clicks");
        assert_eq!(response.config.semantic_column_threshold, threshold);
    }
}

#[test]
fn failed_columns_grow_with_threshold() {
    let request = InsightRequest::new("monotonic", sample_records());
    let failed_at = |threshold: f64| {
        let overrides = ConfigOverrides {
            semantic_column_threshold: Some(threshold),
            ..Default::default()
        };
        engine()
            .analyze_with_overrides(request.clone(), &overrides)
            .unwrap()
            .resolved_context
            .failed_columns
            .len()
    };

    let at_default = failed_at(0.6);
    assert!(failed_at(0.0) <= at_default);
    assert!(failed_at(1.0) >= at_default);
}

#[test]
fn duplicated_rows_double_sums_and_keep_ratios() {
    let single = engine()
        .analyze(InsightRequest::new("single", sample_records()))
        .unwrap();
    let mut doubled_records = sample_records();
    doubled_records.extend(sample_records());
    let doubled = engine()
        .analyze(InsightRequest::new("doubled", doubled_records))
        .unwrap();

    for key in ["spend", "impressions", "clicks", "purchases", "purchase_value", "adds_to_cart"] {
        assert_close(doubled.metrics_snapshot[key], 2.0 * single.metrics_snapshot[key]);
    }
    for key in ["ctr", "roas", "atc_to_purchase"] {
        assert_close(doubled.metrics_snapshot[key], single.metrics_snapshot[key]);
    }
}

#[test]
fn aggregate_roas_differs_from_mean_of_row_roas() {
    let records = rows(vec![
        json!({"spend": 1000, "impressions": 1000, "clicks": 10, "purchase_value": 500}),
        json!({"spend": 10, "impressions": 1000, "clicks": 10, "purchase_value": 100}),
    ]);
    let response = engine().analyze(InsightRequest::new("weighted", records)).unwrap();

    let mean_of_rows = (0.5 + 10.0) / 2.0;
    let weighted = 600.0 / 1010.0;
    assert_close(response.metrics_snapshot["roas"], weighted);
    assert!((response.metrics_snapshot["roas"] - mean_of_rows).abs() > 1.0);
}

#[test]
fn minimum_spend_override_changes_which_rows_are_evaluated() {
    let overrides = ConfigOverrides {
        minimum_spend: Some(10.0),
        ..Default::default()
    };
    let response = engine()
        .analyze_with_overrides(InsightRequest::new("low-floor", sample_records()), &overrides)
        .unwrap();
    assert!(
        response
            .insights
            .iter()
            .any(|insight| insight.impacted_entities.iter().any(|e| e.contains("Carousel")))
    );
}

#[test]
fn healthy_dataset_gets_the_fallback_insight() {
    let records = rows(vec![
        json!({"spend": 500, "impressions": 50000, "clicks": 500, "purchase_value": 2500}),
    ]);
    let response = engine().analyze(InsightRequest::new("healthy", records)).unwrap();
    assert_eq!(response.insights.len(), 1);
    assert_eq!(response.insights[0].topic, InsightTopic::Meta);
    assert_eq!(response.insights[0].severity, Severity::Info);
    assert!(response.insights[0].supporting_data.is_empty());
}

#[test]
fn response_survives_a_json_round_trip() {
    let response = engine()
        .analyze(InsightRequest::new("round-trip", sample_records()))
        .unwrap();

    let json = serde_json::to_string(&response).unwrap();
    let decoded: InsightResponse = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.metrics_snapshot.len(), response.metrics_snapshot.len());
    for (key, value) in &response.metrics_snapshot {
        assert_close(decoded.metrics_snapshot[key], *value);
    }
    assert_eq!(decoded.insights.len(), response.insights.len());
    assert_eq!(decoded.resolved_context.failed_columns, response.resolved_context.failed_columns);
    assert_eq!(decoded.request.dataset_name, "round-trip");
}

#[test]
fn repeated_analyses_are_independent_and_identical() {
    let engine = engine();
    let first = engine
        .analyze(InsightRequest::new("repeat", sample_records()))
        .unwrap();
    let second = engine
        .analyze(InsightRequest::new("repeat", sample_records()))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn response_wire_format_uses_snake_case_names() {
    let records = rows(vec![json!({"spend": 100, "impressions": 1000, "clicks": 10})]);
    let response = engine().analyze(InsightRequest::new("wire", records)).unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["config"]["llm_provider"], "mock");
    assert_eq!(value["request"]["data_source"], "unknown");
    assert!(value["resolved_context"]["column_mapping"]["ctr_7d"].is_null());
    assert_eq!(value["insights"][0]["topic"], "roas");
    assert_eq!(value["insights"][0]["severity"], "critical");
}
