//! Optimization request: one forecast interval plus its operational targets.
//!
//! All times (handling time, interval, ASA, service target) share one unit,
//! seconds by convention. A request is validated in full before the
//! optimizer touches it.

use crate::{error::ValidationError, types::Erlangs};
use serde::{Deserialize, Serialize};

/// Which target family governs the agent search.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Average speed of answer ceiling.
    #[default]
    Asa,
    /// Fraction answered within a service time floor.
    Sla,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Asa => "asa",
            Method::Sla => "sla",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationRequest {
    pub expected_volume: f64,
    pub avg_handle_time: f64,
    pub interval:        f64,
    pub max_occupancy:   f64,
    pub shrinkage:       f64,
    pub method:          Method,
    pub asa_target:      Option<f64>,
    pub sla_target:      Option<f64>,
    pub service_target:  Option<f64>,
    /// Accepted for abandonment modelling. Not used by any formula.
    pub patience:        Option<f64>,
}

impl OptimizationRequest {
    /// An ASA-governed request with no occupancy cap and no shrinkage.
    pub fn asa(expected_volume: f64, avg_handle_time: f64, interval: f64, asa_target: f64) -> Self {
        Self {
            expected_volume,
            avg_handle_time,
            interval,
            max_occupancy:  1.0,
            shrinkage:      0.0,
            method:         Method::Asa,
            asa_target:     Some(asa_target),
            sla_target:     None,
            service_target: None,
            patience:       None,
        }
    }

    /// An SLA-governed request with no occupancy cap and no shrinkage.
    pub fn sla(
        expected_volume: f64,
        avg_handle_time: f64,
        interval: f64,
        sla_target: f64,
        service_target: f64,
    ) -> Self {
        Self {
            expected_volume,
            avg_handle_time,
            interval,
            max_occupancy:  1.0,
            shrinkage:      0.0,
            method:         Method::Sla,
            asa_target:     None,
            sla_target:     Some(sla_target),
            service_target: Some(service_target),
            patience:       None,
        }
    }

    pub fn with_max_occupancy(mut self, max_occupancy: f64) -> Self {
        self.max_occupancy = max_occupancy;
        self
    }

    pub fn with_shrinkage(mut self, shrinkage: f64) -> Self {
        self.shrinkage = shrinkage;
        self
    }

    pub fn with_patience(mut self, patience: f64) -> Self {
        self.patience = Some(patience);
        self
    }

    /// Offered load: arrival rate × average handling time.
    pub fn traffic_intensity(&self) -> Erlangs {
        (self.expected_volume / self.interval) * self.avg_handle_time
    }

    /// Check every rule, in a fixed order, returning the first violation.
    ///
    /// Each bound is written as "must lie inside", so NaN fails it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.method {
            Method::Asa if self.asa_target.is_none() => {
                return Err(ValidationError::MissingAsaTarget);
            }
            Method::Sla if self.sla_target.is_none() || self.service_target.is_none() => {
                return Err(ValidationError::MissingSlaTargets);
            }
            _ => {}
        }

        if !is_positive(self.expected_volume) {
            return Err(ValidationError::NonPositiveVolume(self.expected_volume));
        }
        if !is_positive(self.avg_handle_time) {
            return Err(ValidationError::NonPositiveHandleTime(self.avg_handle_time));
        }
        if let Some(asa) = self.asa_target.filter(|v| !is_positive(*v)) {
            return Err(ValidationError::NonPositiveAsaTarget(asa));
        }
        if let Some(sla) = self.sla_target.filter(|v| !is_positive(*v)) {
            return Err(ValidationError::NonPositiveSlaTarget(sla));
        }
        // Unreachable above 1: the search would only stop at its ceiling.
        if let Some(sla) = self.sla_target.filter(|v| *v > 1.0) {
            return Err(ValidationError::SlaTargetAboveOne(sla));
        }
        if let Some(st) = self.service_target.filter(|v| !is_positive(*v)) {
            return Err(ValidationError::NonPositiveServiceTarget(st));
        }
        if !is_positive(self.interval) {
            return Err(ValidationError::NonPositiveInterval(self.interval));
        }
        if !(0.0..1.0).contains(&self.shrinkage) {
            return Err(ValidationError::ShrinkageOutOfRange(self.shrinkage));
        }
        if !(0.0..=1.0).contains(&self.max_occupancy) {
            return Err(ValidationError::OccupancyOutOfRange(self.max_occupancy));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}
