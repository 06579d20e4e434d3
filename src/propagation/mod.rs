//! # State propagation
//!
//! Conversion of a catalog record and a query time into an instantaneous [`KinematicState`].
//!
//! ## Architecture
//!
//! - [`StatePropagator`]: the pluggable seam. An implementation only has to provide the
//!   Cartesian state of validated [`KeplerianElements`] after `dt` seconds; the trait supplies
//!   record validation, epoch checks, staleness flagging and every derived field.
//! - [`two_body::TwoBodyPropagator`]: unperturbed Keplerian motion.
//! - [`two_body::J2SecularPropagator`]: Keplerian motion with the secular drift of the node,
//!   perigee and mean anomaly caused by Earth oblateness.
//! - [`PropagationParams`]: physical constants, freshness bound and model selection, with the
//!   fluent builder used across the crate's parameter structs.
//!
//! ## Epoch handling
//!
//! A query time earlier than the element epoch is rejected as
//! [`OrbitRiskError::InvalidElements`]. A query time later than `epoch + max_epoch_age_days`
//! still yields a state, flagged `stale = true`; the caller records the corresponding
//! [`OrbitRiskError::StaleEpoch`] diagnostic.
use std::cmp::Ordering::{Equal, Greater};

use hifitime::Epoch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ObjectClass, OrbitalElementSet},
    constants::{KmPerSec, NoradId, EARTH_RADIUS_KM, MU_EARTH_KM3_S2},
    orbit_type::keplerian_element::KeplerianElements,
    orbitrisk_errors::OrbitRiskError,
    time::seconds_between,
};

pub mod kinematic_state;
pub mod two_body;

pub use kinematic_state::KinematicState;
pub use two_body::{J2SecularPropagator, TwoBodyPropagator};

/// Available propagation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationModel {
    #[default]
    TwoBody,
    J2Secular,
}

/// Configuration of the state propagators.
///
/// Defaults
/// -----------------
/// * `mu`: 398600.4418 km³/s²
/// * `body_radius_km`: 6378.137 km
/// * `max_epoch_age_days`: 14 days
/// * `model`: [`PropagationModel::TwoBody`]
///
/// See also
/// -----------------
/// * [`PropagationParams::builder`] – validated construction.
/// * [`build_propagator`] – instantiate the configured model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationParams {
    /// Gravitational parameter of the central body (km³/s²).
    pub mu: f64,
    /// Reference radius used for altitudes and ground footprints (km).
    pub body_radius_km: f64,
    /// Epoch age (days) beyond which a state is flagged stale.
    pub max_epoch_age_days: f64,
    pub model: PropagationModel,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            mu: MU_EARTH_KM3_S2,
            body_radius_km: EARTH_RADIUS_KM,
            max_epoch_age_days: 14.0,
            model: PropagationModel::TwoBody,
        }
    }
}

impl PropagationParams {
    pub fn builder() -> PropagationParamsBuilder {
        PropagationParamsBuilder::new()
    }

    /// Check the invariants enforced by [`PropagationParamsBuilder::build`].
    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        let gt0 = |x: f64| x.partial_cmp(&0.0) == Some(Greater);
        if !gt0(self.mu) {
            return Err(OrbitRiskError::InvalidConfig("mu must be > 0".into()));
        }
        if !gt0(self.body_radius_km) {
            return Err(OrbitRiskError::InvalidConfig(
                "body_radius_km must be > 0".into(),
            ));
        }
        if !matches!(self.max_epoch_age_days.partial_cmp(&0.0), Some(Greater | Equal)) {
            return Err(OrbitRiskError::InvalidConfig(
                "max_epoch_age_days must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PropagationParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct PropagationParamsBuilder {
    params: PropagationParams,
}

impl PropagationParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mu(mut self, v: f64) -> Self {
        self.params.mu = v;
        self
    }
    pub fn body_radius_km(mut self, v: f64) -> Self {
        self.params.body_radius_km = v;
        self
    }
    pub fn max_epoch_age_days(mut self, v: f64) -> Self {
        self.params.max_epoch_age_days = v;
        self
    }
    pub fn model(mut self, v: PropagationModel) -> Self {
        self.params.model = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `mu > 0`, `body_radius_km > 0`, `max_epoch_age_days ≥ 0` (NaN rejected).
    pub fn build(self) -> Result<PropagationParams, OrbitRiskError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Pluggable orbital model producing kinematic states.
///
/// Implementors provide [`StatePropagator::cartesian_state`] and [`StatePropagator::params`];
/// the provided methods turn catalog records into fully derived [`KinematicState`]s.
pub trait StatePropagator: Send + Sync {
    /// Short model name used in logs.
    fn name(&self) -> &'static str;

    fn params(&self) -> &PropagationParams;

    /// Inertial position (km) and velocity (km/s) of `elements` after `dt` seconds.
    fn cartesian_state(
        &self,
        elements: &KeplerianElements,
        dt: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError>;

    /// Validate a record and measure its epoch offset at `at`.
    ///
    /// Return
    /// ----------
    /// * `(elements, dt)` where `dt = at − epoch` in seconds, or
    ///   [`OrbitRiskError::InvalidElements`] for malformed elements or `at` before the epoch.
    fn prepare(
        &self,
        set: &OrbitalElementSet,
        at: &Epoch,
    ) -> Result<(KeplerianElements, f64), OrbitRiskError> {
        let elements = set.to_keplerian(self.params().mu)?;
        let dt = seconds_between(&set.epoch, at);
        if dt < 0.0 {
            return Err(OrbitRiskError::InvalidElements {
                norad_id: set.norad_id,
                reason: format!("query time precedes element epoch by {:.1} s", -dt),
            });
        }
        Ok((elements, dt))
    }

    /// Propagate one record to `at`.
    ///
    /// Arguments
    /// -----------------
    /// * `set`: the catalog record.
    /// * `at`: the query time, not earlier than `set.epoch`.
    ///
    /// Return
    /// ----------
    /// * The [`KinematicState`] at `at`, flagged stale when the epoch is older than
    ///   `max_epoch_age_days`.
    fn propagate(
        &self,
        set: &OrbitalElementSet,
        at: &Epoch,
    ) -> Result<KinematicState, OrbitRiskError> {
        let (elements, dt) = self.prepare(set, at)?;
        let (position, velocity) = self.cartesian_state(&elements, dt)?;
        let params = self.params();
        Ok(KinematicState::derive(
            set.norad_id,
            *at,
            position,
            velocity,
            &elements,
            dt,
            params,
        ))
    }
}

/// A validated record ready to be sampled at arbitrary offsets from the evaluation time.
///
/// Screening and closest-approach searches evaluate the same object hundreds of times per
/// cycle; preparing it once keeps validation out of the inner loops.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedOrbit {
    pub norad_id: NoradId,
    pub class: ObjectClass,
    pub elements: KeplerianElements,
    /// Seconds from the element epoch to the evaluation time.
    pub epoch_offset: f64,
}

impl PreparedOrbit {
    pub fn new(
        propagator: &dyn StatePropagator,
        set: &OrbitalElementSet,
        at: &Epoch,
    ) -> Result<Self, OrbitRiskError> {
        let (elements, epoch_offset) = propagator.prepare(set, at)?;
        Ok(Self {
            norad_id: set.norad_id,
            class: set.class(),
            elements,
            epoch_offset,
        })
    }

    /// Inertial state `offset` seconds after the evaluation time.
    pub fn state_at(
        &self,
        propagator: &dyn StatePropagator,
        offset: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        propagator.cartesian_state(&self.elements, self.epoch_offset + offset)
    }

    /// Perigee speed (km/s), the largest speed reached along the orbit.
    pub fn max_speed(&self, mu: f64) -> KmPerSec {
        let e = self.elements.eccentricity;
        (mu / self.elements.semi_major_axis * (1.0 + e) / (1.0 - e)).sqrt()
    }
}

/// Instantiate the propagator selected by `params.model`.
pub fn build_propagator(params: PropagationParams) -> Box<dyn StatePropagator> {
    match params.model {
        PropagationModel::TwoBody => Box::new(TwoBodyPropagator::new(params)),
        PropagationModel::J2Secular => Box::new(J2SecularPropagator::new(params)),
    }
}

#[cfg(test)]
mod propagation_test {
    use super::*;
    use crate::orbit_type::OrbitShape;

    fn record(epoch: Epoch) -> OrbitalElementSet {
        OrbitalElementSet::new(
            42,
            "TEST SAT",
            OrbitShape::SemiMajorAxis(7_000.0),
            0.001,
            45.0,
            10.0,
            20.0,
            30.0,
            epoch,
        )
    }

    #[test]
    fn test_builder_validation() {
        assert!(PropagationParams::builder().mu(-1.0).build().is_err());
        assert!(PropagationParams::builder()
            .max_epoch_age_days(f64::NAN)
            .build()
            .is_err());
        let p = PropagationParams::builder()
            .model(PropagationModel::J2Secular)
            .build()
            .unwrap();
        assert_eq!(p.model, PropagationModel::J2Secular);
    }

    #[test]
    fn test_query_before_epoch_is_rejected() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2024, 1, 2);
        let before = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let prop = build_propagator(PropagationParams::default());
        assert!(matches!(
            prop.propagate(&record(epoch), &before),
            Err(OrbitRiskError::InvalidElements { norad_id: 42, .. })
        ));
    }

    #[test]
    fn test_stale_flag_follows_freshness_bound() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let fresh = Epoch::from_gregorian_utc_at_midnight(2024, 1, 10);
        let old = Epoch::from_gregorian_utc_at_midnight(2024, 2, 1);
        let prop = build_propagator(PropagationParams::default());

        assert!(!prop.propagate(&record(epoch), &fresh).unwrap().stale);
        let state = prop.propagate(&record(epoch), &old).unwrap();
        assert!(state.stale);
        assert!(state.altitude > 0.0);
    }

    #[test]
    fn test_model_selection() {
        let two_body = build_propagator(PropagationParams::default());
        assert_eq!(two_body.name(), "two-body");
        let j2 = build_propagator(PropagationParams {
            model: PropagationModel::J2Secular,
            ..PropagationParams::default()
        });
        assert_eq!(j2.name(), "j2-secular");
    }
}
