//! Shared primitive types used across the planner.

/// Offered load in Erlangs (arrival rate × mean service time).
pub type Erlangs = f64;

/// A whole number of staffed agents.
pub type AgentCount = u64;
