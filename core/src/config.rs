use crate::{
    batch::ForecastRow,
    request::{Method, OptimizationRequest},
};
use serde::{Deserialize, Serialize};

/// Targets shared by every interval of a plan.
///
/// JSON accepts the long field names as well as the short forms
/// `shrink`, `asa`, `sla` and `st`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationalTargets {
    #[serde(default = "no_occupancy_cap")]
    pub max_occupancy:  f64,
    #[serde(default, alias = "shrink")]
    pub shrinkage:      f64,
    #[serde(default)]
    pub method:         Method,
    #[serde(default, alias = "asa")]
    pub asa_target:     Option<f64>,
    #[serde(default, alias = "sla")]
    pub sla_target:     Option<f64>,
    #[serde(default, alias = "st")]
    pub service_target: Option<f64>,
    #[serde(default)]
    pub patience:       Option<f64>,
}

fn no_occupancy_cap() -> f64 {
    1.0
}

impl OperationalTargets {
    /// Load from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let targets: OperationalTargets = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(targets)
    }

    /// ASA 20s, 90% occupancy cap, 10% shrinkage.
    pub fn default_test() -> Self {
        Self {
            max_occupancy:  0.9,
            shrinkage:      0.1,
            method:         Method::Asa,
            asa_target:     Some(20.0),
            sla_target:     None,
            service_target: None,
            patience:       None,
        }
    }

    /// Build the request for one interval under these targets.
    pub fn request_for(&self, exp_vol: f64, exp_aht: f64, interval: f64) -> OptimizationRequest {
        OptimizationRequest {
            expected_volume: exp_vol,
            avg_handle_time: exp_aht,
            interval,
            max_occupancy:   self.max_occupancy,
            shrinkage:       self.shrinkage,
            method:          self.method,
            asa_target:      self.asa_target,
            sla_target:      self.sla_target,
            service_target:  self.service_target,
            patience:        self.patience,
        }
    }
}

/// A forecast file: `{ "intervals": [ ... ] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub intervals: Vec<ForecastRow>,
}

impl Forecast {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let forecast: Forecast = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!("config: loaded {} forecast intervals from {path}", forecast.intervals.len());
        Ok(forecast)
    }
}
