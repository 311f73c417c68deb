//! Batch driver: one optimization per forecast interval.
//!
//! RULES:
//!   - Rows are processed in input order and results keep that order.
//!   - Every row shares the same OperationalTargets.
//!   - The first invalid row aborts the batch; no partial plan is returned.

use crate::{
    config::OperationalTargets,
    error::{PlanError, PlanResult},
    optimizer::{self, OptimizationResult},
    types::AgentCount,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One planning bucket of the forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRow {
    pub interval_start: NaiveDateTime,
    pub interval_end:   NaiveDateTime,
    pub exp_vol:        f64,
    pub exp_aht:        f64,
}

impl ForecastRow {
    /// Interval length in seconds. Negative when the bounds are reversed.
    pub fn interval_seconds(&self) -> f64 {
        (self.interval_end - self.interval_start).num_milliseconds() as f64 / 1000.0
    }
}

/// A forecast row joined with its staffing estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffingRow {
    pub interval_start: NaiveDateTime,
    pub interval_end:   NaiveDateTime,
    pub exp_vol:        f64,
    pub exp_aht:        f64,
    #[serde(flatten)]
    pub result:         OptimizationResult,
}

pub struct BatchOptimizer {
    targets: OperationalTargets,
}

impl BatchOptimizer {
    pub fn new(targets: OperationalTargets) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &OperationalTargets {
        &self.targets
    }

    pub fn run(&self, rows: &[ForecastRow]) -> PlanResult<Vec<StaffingRow>> {
        let mut plan = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let request = self
                .targets
                .request_for(row.exp_vol, row.exp_aht, row.interval_seconds());

            let result = optimizer::optimize(&request).map_err(|e| PlanError::Row {
                index,
                source: Box::new(e),
            })?;

            log::debug!(
                "batch: row {index} [{} .. {}] agents={} shrunk={}",
                row.interval_start,
                row.interval_end,
                result.agent_req,
                result.agent_req_shrink
            );

            plan.push(StaffingRow {
                interval_start: row.interval_start,
                interval_end:   row.interval_end,
                exp_vol:        row.exp_vol,
                exp_aht:        row.exp_aht,
                result,
            });
        }

        log::info!("batch: planned {} intervals", plan.len());
        Ok(plan)
    }
}

/// Roll-up of a staffing plan for end-of-run reporting.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BatchSummary {
    pub intervals:          usize,
    pub peak_agents:        AgentCount,
    pub peak_agents_shrink: AgentCount,
    pub total_volume:       f64,
    pub mean_occupancy:     f64,
    /// Rows whose figures came from an overflow fallback.
    pub fallback_intervals: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[StaffingRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }

        let occupancy_sum: f64 = rows.iter().map(|r| r.result.pred_occupancy).sum();

        Self {
            intervals:          rows.len(),
            peak_agents:        rows.iter().map(|r| r.result.agent_req).max().unwrap_or(0),
            peak_agents_shrink: rows.iter().map(|r| r.result.agent_req_shrink).max().unwrap_or(0),
            total_volume:       rows.iter().map(|r| r.exp_vol).sum(),
            mean_occupancy:     occupancy_sum / rows.len() as f64,
            fallback_intervals: rows.iter().filter(|r| r.result.numeric_fallback).count(),
        }
    }
}
