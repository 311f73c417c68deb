//! Erlang-C queueing formulas, evaluated in log space.
//!
//! RULE: nothing here panics or returns NaN for validated inputs.
//! Overflow is never propagated. Each formula has one named conservative
//! fallback and reports when it was taken:
//!   - waiting probability  -> 1   (assume every contact waits)
//!   - average wait         -> +inf when no spare capacity
//!   - service level        -> 0   (assume the target is missed)

use crate::types::{AgentCount, Erlangs};

/// A computed figure plus whether a conservative fallback replaced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value:    f64,
    pub fallback: bool,
}

impl Estimate {
    fn exact(value: f64) -> Self {
        Self { value, fallback: false }
    }

    fn fallback(value: f64) -> Self {
        Self { value, fallback: true }
    }
}

/// Probability that an arriving contact has to queue, for `agents`
/// servers offered `intensity` Erlangs.
///
/// The normalising sum carries a leading `1 + ...` on top of the `i = 0`
/// term.
pub fn waiting_probability(intensity: Erlangs, agents: AgentCount) -> Estimate {
    let n = agents as f64;

    // Unstable queue: it never drains.
    if n <= intensity {
        return Estimate::exact(1.0);
    }
    if intensity <= 0.0 {
        return Estimate::exact(0.0);
    }

    let ln_a = intensity.ln();

    // y = 1 + sum_{i=0}^{n-1} a^i / i!, term by term in log space.
    let mut y = 1.0;
    let mut ln_factorial = 0.0;
    for i in 0..agents {
        if i > 1 {
            ln_factorial += (i as f64).ln();
        }
        y += (i as f64 * ln_a - ln_factorial).exp();
        if !y.is_finite() {
            return overflow(intensity, agents, "erlang-b sum");
        }
    }
    // ln(n!) from ln((n-1)!).
    if agents > 1 {
        ln_factorial += n.ln();
    }

    let log_numerator = n * ln_a - ln_factorial + n.ln();
    let log_denominator = (n - intensity).ln();
    let x = (log_numerator - log_denominator).exp();
    if !x.is_finite() {
        return overflow(intensity, agents, "erlang-c numerator");
    }

    let probability = x / (y + x);
    if !probability.is_finite() {
        return overflow(intensity, agents, "erlang-c ratio");
    }
    Estimate::exact(probability.clamp(0.0, 1.0))
}

/// Mean time in queue: `P(wait) * aht / (n - a)`, `+inf` with no spare capacity.
pub fn average_wait(
    intensity: Erlangs,
    agents: AgentCount,
    avg_handle_time: f64,
    prob_waiting: f64,
) -> f64 {
    let spare = agents as f64 - intensity;
    if spare <= 0.0 {
        return f64::INFINITY;
    }
    prob_waiting * avg_handle_time / spare
}

/// Fraction of contacts answered within `service_target`.
pub fn service_level(
    intensity: Erlangs,
    agents: AgentCount,
    avg_handle_time: f64,
    service_target: f64,
    prob_waiting: f64,
) -> Estimate {
    let spare = agents as f64 - intensity;
    let decay = (-spare * (service_target / avg_handle_time)).exp();
    if !decay.is_finite() {
        log::debug!(
            "erlang: service level exponent overflowed (a={intensity:.3}, n={agents}); assuming target missed"
        );
        return Estimate::fallback(0.0);
    }
    Estimate::exact(1.0 - prob_waiting * decay)
}

fn overflow(intensity: Erlangs, agents: AgentCount, stage: &str) -> Estimate {
    log::debug!(
        "erlang: overflow in {stage} (a={intensity:.3}, n={agents}); assuming certain wait"
    );
    Estimate::fallback(1.0)
}
