//! Agent staffing planner: Erlang-C agent requirements per forecast interval.
//!
//! `optimizer::optimize` is the single-interval core. `batch` applies it to
//! a forecast, `config` loads inputs from JSON, `store` persists plans.

pub mod batch;
pub mod config;
pub mod erlang;
pub mod error;
pub mod optimizer;
pub mod request;
pub mod store;
pub mod types;

pub use batch::{BatchOptimizer, BatchSummary, ForecastRow, StaffingRow};
pub use config::{Forecast, OperationalTargets};
pub use error::{PlanError, PlanResult, ValidationError};
pub use optimizer::{optimize, OptimizationResult, TargetMetrics};
pub use request::{Method, OptimizationRequest};
