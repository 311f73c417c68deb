//! Batch driver: forecast rows in, staffing rows out.

use agentplan_core::{
    BatchOptimizer, BatchSummary, Forecast, ForecastRow, Method, OperationalTargets, PlanError,
    TargetMetrics, ValidationError,
};
use chrono::NaiveDateTime;

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn hourly_forecast() -> Vec<ForecastRow> {
    vec![
        ForecastRow {
            interval_start: ts("2024-06-01 08:00:00"),
            interval_end:   ts("2024-06-01 09:00:00"),
            exp_vol:        1000.0,
            exp_aht:        300.0,
        },
        ForecastRow {
            interval_start: ts("2024-06-01 09:00:00"),
            interval_end:   ts("2024-06-01 10:00:00"),
            exp_vol:        1500.0,
            exp_aht:        200.0,
        },
        ForecastRow {
            interval_start: ts("2024-06-01 10:00:00"),
            interval_end:   ts("2024-06-01 11:00:00"),
            exp_vol:        2000.0,
            exp_aht:        250.0,
        },
    ]
}

#[test]
fn interval_length_comes_from_timestamps() {
    let rows = hourly_forecast();
    assert_eq!(rows[0].interval_seconds(), 3600.0);

    let half_hour = ForecastRow {
        interval_start: ts("2024-06-01 08:00:00"),
        interval_end:   ts("2024-06-01 08:30:00"),
        exp_vol:        10.0,
        exp_aht:        60.0,
    };
    assert_eq!(half_hour.interval_seconds(), 1800.0);
}

#[test]
fn plan_keeps_row_order_and_identity_fields() {
    let _ = env_logger::builder().is_test(true).try_init();

    let rows = hourly_forecast();
    let plan = BatchOptimizer::new(OperationalTargets::default_test())
        .run(&rows)
        .unwrap();

    assert_eq!(plan.len(), rows.len());
    for (row, staffed) in rows.iter().zip(&plan) {
        assert_eq!(staffed.interval_start, row.interval_start);
        assert_eq!(staffed.interval_end, row.interval_end);
        assert_eq!(staffed.exp_vol, row.exp_vol);
        assert_eq!(staffed.exp_aht, row.exp_aht);
        assert!(matches!(staffed.result.metrics, TargetMetrics::Asa { .. }));
    }

    // 83.3, 83.3 and 138.9 Erlangs under a 90% occupancy cap.
    let agents: Vec<u64> = plan.iter().map(|r| r.result.agent_req).collect();
    assert_eq!(agents, vec![93, 93, 155]);
    let shrunk: Vec<u64> = plan.iter().map(|r| r.result.agent_req_shrink).collect();
    assert_eq!(shrunk, vec![104, 104, 173]);
}

#[test]
fn reversed_interval_aborts_the_batch_with_its_index() {
    let mut rows = hourly_forecast();
    let row = &mut rows[1];
    std::mem::swap(&mut row.interval_start, &mut row.interval_end);

    let err = BatchOptimizer::new(OperationalTargets::default_test())
        .run(&rows)
        .unwrap_err();

    match err {
        PlanError::Row { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(
                *source,
                PlanError::InvalidInput(ValidationError::NonPositiveInterval(_))
            ));
        }
        other => panic!("expected row error, got {other}"),
    }
}

#[test]
fn targets_accept_short_field_names() {
    let json = r#"{ "max_occupancy": 0.9, "shrink": 0.1, "asa": 20, "method": "asa" }"#;
    let targets: OperationalTargets = serde_json::from_str(json).unwrap();
    assert_eq!(targets, OperationalTargets::default_test());

    let json = r#"{ "method": "sla", "sla": 0.8, "st": 20, "patience": 90 }"#;
    let targets: OperationalTargets = serde_json::from_str(json).unwrap();
    assert_eq!(targets.method, Method::Sla);
    assert_eq!(targets.sla_target, Some(0.8));
    assert_eq!(targets.service_target, Some(20.0));
    assert_eq!(targets.max_occupancy, 1.0);
    assert_eq!(targets.shrinkage, 0.0);
}

#[test]
fn forecast_file_round_trips_through_json() {
    let forecast = Forecast { intervals: hourly_forecast() };
    let path = std::env::temp_dir().join(format!("agentplan-forecast-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&forecast).unwrap()).unwrap();

    let loaded = Forecast::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, forecast);
}

#[test]
fn missing_targets_file_is_reported() {
    let err = OperationalTargets::load("/nonexistent/targets.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read /nonexistent/targets.json"));
}

#[test]
fn summary_rolls_up_peaks_and_occupancy() {
    let plan = BatchOptimizer::new(OperationalTargets::default_test())
        .run(&hourly_forecast())
        .unwrap();

    let summary = BatchSummary::from_rows(&plan);
    assert_eq!(summary.intervals, 3);
    assert_eq!(summary.peak_agents, 155);
    assert_eq!(summary.peak_agents_shrink, 173);
    assert_eq!(summary.total_volume, 4500.0);
    assert!((summary.mean_occupancy - 0.9).abs() < 1e-9);
    assert_eq!(summary.fallback_intervals, 0);

    assert_eq!(BatchSummary::from_rows(&[]), BatchSummary::default());
}
