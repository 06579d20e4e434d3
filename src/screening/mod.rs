//! # Proximity screening
//!
//! Selection of the object pairs that are close enough to deserve a risk assessment.
//!
//! ## Overview
//!
//! Two screens are provided, both built on altitude-shell pruning
//! ([`altitude_shells::pairs_within`]) instead of an all-pairs scan:
//!
//! - **Instantaneous** ([`ProximityScreener::screen_states`]): pairs within the threshold at the
//!   evaluation time. Drives the per-object nearby-object count.
//! - **Windowed** ([`ProximityScreener::screen_window`]): pairs that come within the threshold at
//!   any time of the look-ahead window, with their closest approach and threshold-crossing
//!   window. Drives conjunction events.
//!
//! ## Edge cases
//!
//! - Separations exactly equal to the threshold are included (closed boundary).
//! - Self-pairs are never produced; `(a, b)` and `(b, a)` collapse onto `a < b`.
//! - Outputs are sorted by pair, independent of worker scheduling.
//!
//! ## Example
//!
//! ```rust, no_run
//! use orbitrisk::screening::{ProximityScreener, ScreeningParams};
//!
//! let params = ScreeningParams::builder()
//!     .threshold_km(50.0)
//!     .step_seconds(30.0)
//!     .build()
//!     .unwrap();
//! let screener = ProximityScreener::new(params);
//! # let states: Vec<orbitrisk::propagation::KinematicState> = Vec::new();
//! let pairs = screener.screen_states(&states);
//! ```
use std::cmp::Ordering::Greater;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{Kilometer, SECONDS_PER_HOUR},
    orbitrisk_errors::OrbitRiskError,
    propagation::{KinematicState, PreparedOrbit, StatePropagator},
};

pub mod altitude_shells;
pub mod window;

pub use altitude_shells::{pairs_within, CandidatePair, ScreenPoint};
pub use window::{Encounter, WindowScreening};

/// Configuration of the proximity screens.
///
/// Defaults
/// -----------------
/// * `threshold_km`: 100 km
/// * `look_ahead_hours`: 24 h
/// * `step_seconds`: 60 s
/// * `time_tolerance_seconds`: 1 ms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningParams {
    /// Closed distance threshold of a candidate pair (km).
    pub threshold_km: Kilometer,
    /// Length of the window screen (hours).
    pub look_ahead_hours: f64,
    /// Sampling step of the window screen (seconds).
    pub step_seconds: f64,
    /// Time resolution of closest-approach refinement (seconds).
    pub time_tolerance_seconds: f64,
}

impl Default for ScreeningParams {
    fn default() -> Self {
        Self {
            threshold_km: 100.0,
            look_ahead_hours: 24.0,
            step_seconds: 60.0,
            time_tolerance_seconds: 1e-3,
        }
    }
}

impl ScreeningParams {
    pub fn builder() -> ScreeningParamsBuilder {
        ScreeningParamsBuilder::default()
    }

    /// Look-ahead window in seconds.
    pub fn horizon_seconds(&self) -> f64 {
        self.look_ahead_hours * SECONDS_PER_HOUR
    }

    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        let gt0 = |x: f64| x.partial_cmp(&0.0) == Some(Greater);
        if !gt0(self.threshold_km) {
            return Err(OrbitRiskError::InvalidConfig(
                "threshold_km must be > 0".into(),
            ));
        }
        if !gt0(self.look_ahead_hours) {
            return Err(OrbitRiskError::InvalidConfig(
                "look_ahead_hours must be > 0".into(),
            ));
        }
        if !gt0(self.step_seconds) {
            return Err(OrbitRiskError::InvalidConfig(
                "step_seconds must be > 0".into(),
            ));
        }
        if !gt0(self.time_tolerance_seconds) || self.time_tolerance_seconds >= self.step_seconds {
            return Err(OrbitRiskError::InvalidConfig(
                "time_tolerance_seconds must be in (0, step_seconds)".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ScreeningParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ScreeningParamsBuilder {
    params: ScreeningParams,
}

impl ScreeningParamsBuilder {
    pub fn threshold_km(mut self, v: f64) -> Self {
        self.params.threshold_km = v;
        self
    }
    pub fn look_ahead_hours(mut self, v: f64) -> Self {
        self.params.look_ahead_hours = v;
        self
    }
    pub fn step_seconds(mut self, v: f64) -> Self {
        self.params.step_seconds = v;
        self
    }
    pub fn time_tolerance_seconds(mut self, v: f64) -> Self {
        self.params.time_tolerance_seconds = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `threshold_km`, `look_ahead_hours`, `step_seconds` strictly positive.
    /// * `0 < time_tolerance_seconds < step_seconds`.
    pub fn build(self) -> Result<ScreeningParams, OrbitRiskError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Proximity screener over one cycle's states or orbits.
#[derive(Debug, Clone, Default)]
pub struct ProximityScreener {
    params: ScreeningParams,
}

impl ProximityScreener {
    pub fn new(params: ScreeningParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScreeningParams {
        &self.params
    }

    /// Pairs of states within the screening threshold at their common time.
    pub fn screen_states(&self, states: &[KinematicState]) -> Vec<CandidatePair> {
        self.pairs_within_radius(states, self.params.threshold_km)
    }

    /// Pairs of states within an arbitrary radius, e.g. a density radius.
    pub fn pairs_within_radius(
        &self,
        states: &[KinematicState],
        radius: Kilometer,
    ) -> Vec<CandidatePair> {
        let points: Vec<ScreenPoint> = states
            .iter()
            .map(|s| ScreenPoint {
                norad_id: s.norad_id,
                position: s.position,
            })
            .collect();
        pairs_within(&points, radius)
    }

    /// Pairs coming within the threshold during the configured look-ahead window.
    pub fn screen_window(
        &self,
        propagator: &dyn StatePropagator,
        orbits: &[PreparedOrbit],
    ) -> WindowScreening {
        window::screen_window(propagator, orbits, &self.params, self.params.horizon_seconds())
    }

    /// Same as [`ProximityScreener::screen_window`] over a custom horizon (seconds).
    pub fn screen_window_over(
        &self,
        propagator: &dyn StatePropagator,
        orbits: &[PreparedOrbit],
        horizon: f64,
    ) -> WindowScreening {
        window::screen_window(propagator, orbits, &self.params, horizon)
    }
}
