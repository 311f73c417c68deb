//! The queueing optimizer: minimal agents for one forecast interval.
//!
//! PIPELINE (fixed order):
//!   1. Validate the request (no computation on failure).
//!   2. Traffic intensity a = volume / interval * aht.
//!   3. Search n upward from the first stable count until the ASA or SLA
//!      target is met.
//!   4. Apply the occupancy cap (can only raise n).
//!   5. Recompute every reported figure at the final n.
//!   6. Inflate for shrinkage (reporting only, never fed back).
//!
//! The optimizer is a pure function: no I/O, no shared state.

use crate::{
    erlang,
    error::{PlanError, PlanResult, ValidationError},
    request::{Method, OptimizationRequest},
    types::{AgentCount, Erlangs},
};
use serde::{Deserialize, Serialize};

/// Hard upper bound on the agent search. Reaching it is an error.
pub const AGENT_CEILING: AgentCount = 1_000_000;

/// Target metrics for the method that governed the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetMetrics {
    Sla {
        /// Percentage answered within the service target, 2 decimals.
        pred_sla: f64,
        /// Predicted average wait, 1 decimal.
        pred_st:  f64,
    },
    Asa {
        /// Predicted average wait, 1 decimal.
        pred_asa: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub agent_req:         AgentCount,
    pub agent_req_shrink:  AgentCount,
    pub pred_occupancy:    f64,
    pub prob_waiting:      f64,
    #[serde(flatten)]
    pub metrics:           TargetMetrics,
    pub traffic_intensity: Erlangs,
    /// True when an overflow fallback shaped any reported figure.
    pub numeric_fallback:  bool,
}

/// Find the minimal agent count for `request`.
pub fn optimize(request: &OptimizationRequest) -> PlanResult<OptimizationResult> {
    request.validate()?;

    let target = Target::of(request)?;
    let intensity = request.traffic_intensity();
    let aht = request.avg_handle_time;

    let mut agents = search(target, intensity, aht)?;

    let occupancy = intensity / agents as f64;
    if occupancy > request.max_occupancy {
        let capped = (intensity / request.max_occupancy).ceil();
        if !capped.is_finite() || capped > AGENT_CEILING as f64 {
            return Err(ceiling_error(intensity));
        }
        log::debug!(
            "optimizer: occupancy {occupancy:.3} > cap {:.3}, agents {agents} -> {capped}",
            request.max_occupancy
        );
        agents = (capped as AgentCount).max(agents);
    }

    // Recompute everything at the final agent count.
    let prob = erlang::waiting_probability(intensity, agents);
    let avg_wait = erlang::average_wait(intensity, agents, aht, prob.value);
    let mut numeric_fallback = prob.fallback;

    let metrics = match target {
        Target::Asa { .. } => TargetMetrics::Asa {
            pred_asa: round_to(avg_wait, 1),
        },
        Target::Sla { service_time, .. } => {
            let sla = erlang::service_level(intensity, agents, aht, service_time, prob.value);
            numeric_fallback |= sla.fallback;
            TargetMetrics::Sla {
                pred_sla: round_to(sla.value * 100.0, 2),
                pred_st:  round_to(avg_wait, 1),
            }
        }
    };

    if numeric_fallback {
        log::warn!(
            "optimizer: overflow fallback used at a={intensity:.3} agents={agents}; figures are conservative"
        );
    }

    let agent_req_shrink = (agents as f64 / (1.0 - request.shrinkage)).ceil() as AgentCount;

    log::debug!(
        "optimizer: a={intensity:.3} method={:?} agents={agents} shrunk={agent_req_shrink} p_wait={:.4}",
        request.method,
        prob.value
    );

    Ok(OptimizationResult {
        agent_req: agents,
        agent_req_shrink,
        pred_occupancy: round_to(intensity / agents as f64, 2),
        prob_waiting: prob.value,
        metrics,
        traffic_intensity: intensity,
        numeric_fallback,
    })
}

/// First stable agent count: `max(ceil(a), 1)`, bumped past `a` if equal.
pub fn first_stable_count(intensity: Erlangs) -> AgentCount {
    let start = intensity.max(1.0).ceil();
    if start <= intensity {
        intensity.floor() as AgentCount + 1
    } else {
        start as AgentCount
    }
}

/// The resolved target of a validated request.
#[derive(Debug, Clone, Copy)]
enum Target {
    Asa { asa: f64 },
    Sla { sla: f64, service_time: f64 },
}

impl Target {
    fn of(request: &OptimizationRequest) -> Result<Self, ValidationError> {
        match request.method {
            Method::Asa => request
                .asa_target
                .map(|asa| Target::Asa { asa })
                .ok_or(ValidationError::MissingAsaTarget),
            Method::Sla => request
                .sla_target
                .zip(request.service_target)
                .map(|(sla, service_time)| Target::Sla { sla, service_time })
                .ok_or(ValidationError::MissingSlaTargets),
        }
    }

    fn is_met(&self, intensity: Erlangs, agents: AgentCount, aht: f64) -> bool {
        let prob = erlang::waiting_probability(intensity, agents).value;
        match *self {
            Target::Asa { asa } => erlang::average_wait(intensity, agents, aht, prob) <= asa,
            Target::Sla { sla, service_time } => {
                erlang::service_level(intensity, agents, aht, service_time, prob).value >= sla
            }
        }
    }
}

/// Walk n upward until the target is met.
fn search(target: Target, intensity: Erlangs, aht: f64) -> PlanResult<AgentCount> {
    let mut agents = first_stable_count(intensity);
    while agents <= AGENT_CEILING {
        if target.is_met(intensity, agents, aht) {
            return Ok(agents);
        }
        agents += 1;
    }
    Err(ceiling_error(intensity))
}

fn ceiling_error(intensity: Erlangs) -> PlanError {
    PlanError::SearchLimitExceeded {
        traffic_intensity: intensity,
        ceiling:           AGENT_CEILING,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
