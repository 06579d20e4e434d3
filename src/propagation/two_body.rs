//! # Analytical propagators
//!
//! Two implementations of [`StatePropagator`]:
//!
//! - [`TwoBodyPropagator`]: Keplerian motion: only the mean anomaly advances, at the mean motion
//!   `n = √(μ / a³)`.
//! - [`J2SecularPropagator`]: Keplerian motion plus the first-order secular rates induced by the
//!   J2 zonal harmonic:
//!
//! ```text
//! p    = a (1 − e²)
//! k    = n J2 (R / p)²
//! dΩ/dt = −(3/2) k cos i
//! dω/dt =  (3/4) k (4 − 5 sin² i)
//! dM/dt =  n + (3/4) k √(1 − e²) (2 − 3 sin² i)
//! ```
//!
//! Short-periodic terms, drag and third-body perturbations are not modeled.
use nalgebra::Vector3;

use crate::{
    constants::J2_EARTH,
    kepler::principal_angle,
    orbit_type::keplerian_element::KeplerianElements,
    orbitrisk_errors::OrbitRiskError,
    propagation::{PropagationParams, StatePropagator},
};

/// Unperturbed two-body propagator.
#[derive(Debug, Clone)]
pub struct TwoBodyPropagator {
    params: PropagationParams,
}

impl TwoBodyPropagator {
    pub fn new(params: PropagationParams) -> Self {
        Self { params }
    }
}

impl StatePropagator for TwoBodyPropagator {
    fn name(&self) -> &'static str {
        "two-body"
    }

    fn params(&self) -> &PropagationParams {
        &self.params
    }

    fn cartesian_state(
        &self,
        elements: &KeplerianElements,
        dt: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        elements.solve_two_body_problem(dt, self.params.mu)
    }
}

/// Two-body propagator with J2 secular drift of Ω, ω and M.
#[derive(Debug, Clone)]
pub struct J2SecularPropagator {
    params: PropagationParams,
}

impl J2SecularPropagator {
    pub fn new(params: PropagationParams) -> Self {
        Self { params }
    }

    /// Secular rates `(dΩ/dt, dω/dt, dM/dt)` in rad/s.
    pub fn secular_rates(&self, elements: &KeplerianElements) -> (f64, f64, f64) {
        let n = elements.mean_motion(self.params.mu);
        let e2 = elements.eccentricity * elements.eccentricity;
        let p = elements.semi_major_axis * (1.0 - e2);
        let k = n * J2_EARTH * (self.params.body_radius_km / p).powi(2);
        let (sin_i, cos_i) = elements.inclination.sin_cos();
        let sin2_i = sin_i * sin_i;

        let node_rate = -1.5 * k * cos_i;
        let perigee_rate = 0.75 * k * (4.0 - 5.0 * sin2_i);
        let anomaly_rate = n + 0.75 * k * (1.0 - e2).sqrt() * (2.0 - 3.0 * sin2_i);
        (node_rate, perigee_rate, anomaly_rate)
    }

    /// Mean elements after `dt` seconds of secular drift.
    pub fn drifted(&self, elements: &KeplerianElements, dt: f64) -> KeplerianElements {
        let (node_rate, perigee_rate, anomaly_rate) = self.secular_rates(elements);
        KeplerianElements {
            ascending_node_longitude: principal_angle(
                elements.ascending_node_longitude + node_rate * dt,
            ),
            periapsis_argument: principal_angle(elements.periapsis_argument + perigee_rate * dt),
            mean_anomaly: principal_angle(elements.mean_anomaly + anomaly_rate * dt),
            ..*elements
        }
    }
}

impl StatePropagator for J2SecularPropagator {
    fn name(&self) -> &'static str {
        "j2-secular"
    }

    fn params(&self) -> &PropagationParams {
        &self.params
    }

    fn cartesian_state(
        &self,
        elements: &KeplerianElements,
        dt: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        self.drifted(elements, dt).to_cartesian(self.params.mu)
    }
}

#[cfg(test)]
mod two_body_test {
    use super::*;
    use crate::constants::{RADEG, SECONDS_PER_DAY};
    use approx::assert_relative_eq;

    fn sun_synchronous() -> KeplerianElements {
        KeplerianElements {
            semi_major_axis: 7_078.0,
            eccentricity: 0.001,
            inclination: 98.19 * RADEG,
            ascending_node_longitude: 0.0,
            periapsis_argument: 0.0,
            mean_anomaly: 0.0,
        }
    }

    #[test]
    fn test_two_body_matches_elements() {
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let kep = sun_synchronous();
        let (r, _) = prop.cartesian_state(&kep, 0.0).unwrap();
        assert_relative_eq!(r.norm(), kep.perigee_radius(), epsilon = 1e-6);
    }

    #[test]
    fn test_j2_nodal_regression_of_sun_synchronous_orbit() {
        // a sun-synchronous orbit precesses eastward by ~0.9856°/day
        let prop = J2SecularPropagator::new(PropagationParams::default());
        let (node_rate, _, _) = prop.secular_rates(&sun_synchronous());
        let deg_per_day = node_rate * SECONDS_PER_DAY / RADEG;
        assert_relative_eq!(deg_per_day, 0.9856, epsilon = 0.01);
    }

    #[test]
    fn test_j2_critical_inclination_freezes_perigee() {
        let prop = J2SecularPropagator::new(PropagationParams::default());
        let kep = KeplerianElements {
            inclination: (4.0_f64 / 5.0).sqrt().asin(),
            ..sun_synchronous()
        };
        let (_, perigee_rate, _) = prop.secular_rates(&kep);
        assert!(perigee_rate.abs() < 1e-15);
    }

    #[test]
    fn test_j2_reduces_to_two_body_at_epoch() {
        let params = PropagationParams::default();
        let kep = sun_synchronous();
        let (r_j2, v_j2) = J2SecularPropagator::new(params.clone())
            .cartesian_state(&kep, 0.0)
            .unwrap();
        let (r_2b, v_2b) = TwoBodyPropagator::new(params)
            .cartesian_state(&kep, 0.0)
            .unwrap();
        assert_relative_eq!(r_j2, r_2b, epsilon = 1e-9);
        assert_relative_eq!(v_j2, v_2b, epsilon = 1e-12);
    }
}
