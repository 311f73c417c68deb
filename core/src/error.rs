use thiserror::Error;

/// A request rejected before any computation. One variant per rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("method 'asa' requires an asa target")]
    MissingAsaTarget,

    #[error("method 'sla' requires both an sla target and a service target")]
    MissingSlaTargets,

    #[error("expected volume must be greater than 0, got {0}")]
    NonPositiveVolume(f64),

    #[error("average handling time must be greater than 0, got {0}")]
    NonPositiveHandleTime(f64),

    #[error("interval must be greater than 0, got {0}")]
    NonPositiveInterval(f64),

    #[error("average speed of answer target must be greater than 0, got {0}")]
    NonPositiveAsaTarget(f64),

    #[error("service level target must be greater than 0, got {0}")]
    NonPositiveSlaTarget(f64),

    #[error("service level target cannot exceed 1, got {0}")]
    SlaTargetAboveOne(f64),

    #[error("service time target must be greater than 0, got {0}")]
    NonPositiveServiceTarget(f64),

    #[error("shrinkage must be in the range [0, 1), got {0}")]
    ShrinkageOutOfRange(f64),

    #[error("max occupancy must be between 0 and 1, got {0}")]
    OccupancyOutOfRange(f64),
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Agent search exceeded {ceiling} agents (traffic intensity {traffic_intensity:.3})")]
    SearchLimitExceeded { traffic_intensity: f64, ceiling: u64 },

    #[error("Forecast row {index}: {source}")]
    Row {
        index:  usize,
        #[source]
        source: Box<PlanError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;
