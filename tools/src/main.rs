//! plan-runner: headless staffing planner.
//!
//! Usage:
//!   plan-runner --forecast data/forecast.json --targets data/targets.json
//!   plan-runner --forecast f.json --targets t.json --db plan.db --out plan.json

use agentplan_core::{
    store::PlanStore, BatchOptimizer, BatchSummary, Forecast, OperationalTargets, StaffingRow,
    TargetMetrics,
};
use anyhow::Result;
use std::env;

#[derive(serde::Serialize)]
struct PlanReport<'a> {
    run_id:       &'a str,
    generated_at: String,
    targets:      &'a OperationalTargets,
    summary:      &'a BatchSummary,
    intervals:    &'a [StaffingRow],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let forecast_path = parse_str(&args, "--forecast").unwrap_or("./data/forecast.json");
    let targets_path = parse_str(&args, "--targets").unwrap_or("./data/targets.json");
    let db = parse_str(&args, "--db").unwrap_or(":memory:");
    let out = parse_str(&args, "--out");

    println!("Agent staffing planner: plan-runner");
    println!("  forecast:  {forecast_path}");
    println!("  targets:   {targets_path}");
    println!("  db:        {db}");
    println!();

    let forecast = Forecast::load(forecast_path)?;
    let targets = OperationalTargets::load(targets_path)?;

    let plan = BatchOptimizer::new(targets.clone()).run(&forecast.intervals)?;

    let mut store = PlanStore::open(db)?;
    store.migrate()?;

    let run_id = format!("plan-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, &targets, env!("CARGO_PKG_VERSION"))?;
    store.insert_plan(&run_id, &plan)?;
    log::info!("persisted {} intervals under {run_id}", store.staffing_row_count(&run_id)?);

    let summary = BatchSummary::from_rows(&plan);

    if let Some(path) = out {
        let report = PlanReport {
            run_id:       &run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            targets:      &targets,
            summary:      &summary,
            intervals:    &plan,
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .map_err(|e| anyhow::anyhow!("Cannot write {path}: {e}"))?;
        println!("  report written to {path}");
        println!();
    }

    print_plan(&store, &run_id)?;
    print_summary(&run_id, &targets, &summary);
    Ok(())
}

fn print_plan(store: &PlanStore, run_id: &str) -> Result<()> {
    println!("=== STAFFING PLAN ===");
    println!(
        "  {:<19} {:<19} {:>8} {:>7} {:>6} {:>7} {:>6} {:>8}",
        "start", "end", "volume", "aht", "agents", "shrunk", "occ", "metric"
    );
    for row in store.staffing_rows(run_id)? {
        let r = &row.result;
        let metric = match r.metrics {
            TargetMetrics::Sla { pred_sla, pred_st } => format!("{pred_sla:.2}% / {pred_st:.1}s"),
            TargetMetrics::Asa { pred_asa } => format!("{pred_asa:.1}s"),
        };
        println!(
            "  {:<19} {:<19} {:>8.1} {:>7.1} {:>6} {:>7} {:>6.2} {:>8}{}",
            row.interval_start.format("%Y-%m-%d %H:%M:%S"),
            row.interval_end.format("%Y-%m-%d %H:%M:%S"),
            row.exp_vol,
            row.exp_aht,
            r.agent_req,
            r.agent_req_shrink,
            r.pred_occupancy,
            metric,
            if r.numeric_fallback { "  *" } else { "" }
        );
    }
    println!();
    Ok(())
}

fn print_summary(run_id: &str, targets: &OperationalTargets, summary: &BatchSummary) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {run_id}");
    println!("  method:          {}", targets.method.as_str());
    println!("  intervals:       {}", summary.intervals);
    println!("  total volume:    {:.0}", summary.total_volume);
    println!("  peak agents:     {}", summary.peak_agents);
    println!("  peak (shrunk):   {}", summary.peak_agents_shrink);
    println!("  mean occupancy:  {:.2}", summary.mean_occupancy);
    if summary.fallback_intervals > 0 {
        println!(
            "  * {} interval(s) used a conservative overflow fallback",
            summary.fallback_intervals
        );
    }
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
