use thiserror::Error;

use crate::constants::NoradId;

#[derive(Error, Debug)]
pub enum OrbitRiskError {
    #[error("Invalid orbital elements for object {norad_id}: {reason}")]
    InvalidElements { norad_id: NoradId, reason: String },

    #[error("Stale epoch for object {norad_id}: {age_days:.2} days old (bound {max_age_days:.2} days)")]
    StaleEpoch {
        norad_id: NoradId,
        age_days: f64,
        max_age_days: f64,
    },

    #[error("Unknown object: {0}")]
    UnknownObject(NoradId),

    #[error("Degenerate relative geometry between {norad_a} and {norad_b}: closest approach time undefined")]
    DegenerateGeometry { norad_a: NoradId, norad_b: NoradId },

    #[error("No space weather context supplied and no fallback snapshot configured")]
    MissingWeatherContext,

    #[error("Input catalog is empty")]
    EmptyCatalog,

    #[error("Malformed input batch: {0}")]
    MalformedBatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Kepler equation solver failed: {0}")]
    KeplerSolverFailed(#[from] roots::SearchError),

    #[error("Unable to build the worker pool: {0}")]
    ThreadPool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrbitRiskError {
    /// Return true if the error only degrades the output of one record.
    ///
    /// Record-level errors are collected as diagnostics during a cycle; every other
    /// variant aborts the cycle.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            OrbitRiskError::InvalidElements { .. }
                | OrbitRiskError::StaleEpoch { .. }
                | OrbitRiskError::DegenerateGeometry { .. }
                | OrbitRiskError::KeplerSolverFailed(_)
        )
    }
}

impl PartialEq for OrbitRiskError {
    fn eq(&self, other: &Self) -> bool {
        use OrbitRiskError::*;
        match (self, other) {
            (
                InvalidElements {
                    norad_id: a,
                    reason: ra,
                },
                InvalidElements {
                    norad_id: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (
                StaleEpoch {
                    norad_id: a,
                    age_days: da,
                    max_age_days: ma,
                },
                StaleEpoch {
                    norad_id: b,
                    age_days: db,
                    max_age_days: mb,
                },
            ) => a == b && da == db && ma == mb,
            (UnknownObject(a), UnknownObject(b)) => a == b,
            (
                DegenerateGeometry {
                    norad_a: a1,
                    norad_b: b1,
                },
                DegenerateGeometry {
                    norad_a: a2,
                    norad_b: b2,
                },
            ) => a1 == a2 && b1 == b2,
            (MalformedBatch(a), MalformedBatch(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (InvalidQuery(a), InvalidQuery(b)) => a == b,
            (KeplerSolverFailed(a), KeplerSolverFailed(b)) => a == b,
            (ThreadPool(a), ThreadPool(b)) => a == b,

            // serde_json errors are not comparable: same variant is enough
            (Serialization(_), Serialization(_)) => true,

            (MissingWeatherContext, MissingWeatherContext) => true,
            (EmptyCatalog, EmptyCatalog) => true,

            _ => false,
        }
    }
}
