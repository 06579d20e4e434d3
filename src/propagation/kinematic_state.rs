use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    constants::{Degree, Kilometer, KmPerSec, NoradId, RADEG, SECONDS_PER_DAY},
    orbit_type::keplerian_element::KeplerianElements,
    propagation::PropagationParams,
    ref_system::{is_sunlit, sub_satellite_point, sun_direction},
};

/// Instantaneous state of one object at one evaluation time.
///
/// The state is derived once per cycle and never mutated. Positions and velocities are in the
/// geocentric inertial frame.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicState {
    pub norad_id: NoradId,
    pub at: Epoch,
    /// Position (km).
    pub position: Vector3<f64>,
    /// Velocity (km/s).
    pub velocity: Vector3<f64>,
    /// Height above the reference radius (km).
    pub altitude: Kilometer,
    /// Velocity magnitude (km/s).
    pub speed: KmPerSec,
    /// Keplerian period (s).
    pub period: f64,
    pub sunlit: bool,
    /// Horizon distance from the object (km).
    pub footprint_radius: Kilometer,
    pub latitude: Degree,
    pub longitude: Degree,
    pub apogee_altitude: Kilometer,
    pub perigee_altitude: Kilometer,
    pub eccentricity: f64,
    pub inclination: Degree,
    /// Elapsed time since the element epoch (days).
    pub epoch_age_days: f64,
    pub stale: bool,
}

/// Ground footprint radius for an object at altitude `h` above a body of radius `radius`.
///
/// This is the straight-line distance to the horizon, `√(2·R·h + h²)`; negative altitudes
/// yield `0`.
pub fn footprint_radius(altitude: Kilometer, radius: Kilometer) -> Kilometer {
    let h = altitude.max(0.0);
    (2.0 * radius * h + h * h).sqrt()
}

impl KinematicState {
    /// Build a state and all its derived fields from a Cartesian solution.
    ///
    /// Arguments
    /// -----------------
    /// * `norad_id`, `at`: identity of the state.
    /// * `position`, `velocity`: inertial state in km and km/s.
    /// * `elements`: the validated elements the state was propagated from.
    /// * `dt`: seconds elapsed since the element epoch.
    /// * `params`: propagation constants and freshness bound.
    pub(crate) fn derive(
        norad_id: NoradId,
        at: Epoch,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        elements: &KeplerianElements,
        dt: f64,
        params: &PropagationParams,
    ) -> Self {
        let radius = params.body_radius_km;
        let altitude = position.norm() - radius;
        let (latitude, longitude) = sub_satellite_point(&position, &at);
        let epoch_age_days = dt / SECONDS_PER_DAY;

        Self {
            norad_id,
            at,
            position,
            velocity,
            altitude,
            speed: velocity.norm(),
            period: elements.period(params.mu),
            sunlit: is_sunlit(&position, &sun_direction(&at)),
            footprint_radius: footprint_radius(altitude, radius),
            latitude,
            longitude,
            apogee_altitude: elements.apogee_radius() - radius,
            perigee_altitude: elements.perigee_radius() - radius,
            eccentricity: elements.eccentricity,
            inclination: elements.inclination / RADEG,
            epoch_age_days,
            stale: epoch_age_days > params.max_epoch_age_days,
        }
    }

    /// Period in minutes.
    pub fn period_minutes(&self) -> f64 {
        self.period / 60.0
    }

    /// Euclidean distance to another state (km).
    pub fn distance_to(&self, other: &KinematicState) -> Kilometer {
        (self.position - other.position).norm()
    }

    /// Relative speed with respect to another state (km/s).
    pub fn relative_speed(&self, other: &KinematicState) -> KmPerSec {
        (self.velocity - other.velocity).norm()
    }
}

#[cfg(test)]
mod kinematic_state_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_footprint_radius() {
        assert_relative_eq!(footprint_radius(0.0, 6_378.137), 0.0);
        assert_relative_eq!(footprint_radius(-5.0, 6_378.137), 0.0);
        // ~2294 km horizon distance at 400 km
        let d = footprint_radius(400.0, 6_378.137);
        assert!((2_280.0..2_310.0).contains(&d), "d = {d}");
    }

    #[test]
    fn test_derived_fields() {
        let params = PropagationParams::default();
        let kep = KeplerianElements {
            semi_major_axis: 7_000.0,
            eccentricity: 0.01,
            inclination: 60.0 * RADEG,
            ascending_node_longitude: 0.0,
            periapsis_argument: 0.0,
            mean_anomaly: 0.0,
        };
        let (r, v) = kep.to_cartesian(params.mu).unwrap();
        let at = Epoch::from_gregorian_utc_at_midnight(2024, 6, 1);
        let state = KinematicState::derive(1, at, r, v, &kep, 0.5 * SECONDS_PER_DAY, &params);

        assert_relative_eq!(state.altitude, 7_000.0 * 0.99 - 6_378.137, epsilon = 1e-6);
        assert_relative_eq!(state.perigee_altitude, state.altitude, epsilon = 1e-6);
        assert_relative_eq!(state.inclination, 60.0, epsilon = 1e-12);
        assert_relative_eq!(state.epoch_age_days, 0.5);
        assert!(!state.stale);
        assert!(state.period_minutes() > 95.0 && state.period_minutes() < 100.0);
    }
}
