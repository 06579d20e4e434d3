//! # Keplerian orbital elements
//!
//! This module defines the [`KeplerianElements`] struct, the **classical orbital element
//! representation** used by every propagator of the crate, and its conversion to a geocentric
//! Cartesian state.
//!
//! ## What are Keplerian elements?
//!
//! The six Keplerian elements are:
//!
//! 1. **a** – Semi-major axis (km)
//! 2. **e** – Eccentricity (unitless, `0 ≤ e < 1` for the closed orbits handled here)
//! 3. **i** – Inclination (radians, `0 ≤ i ≤ π`)
//! 4. **Ω** – Right ascension of the ascending node (radians)
//! 5. **ω** – Argument of perigee (radians)
//! 6. **M** – Mean anomaly (radians)
//!
//! ## Provided functionality
//!
//! - [`KeplerianElements::solve_kepler_equation`] – eccentric anomaly from mean anomaly
//!   (Newton–Raphson through the `roots` crate).
//! - [`KeplerianElements::to_cartesian`] – position/velocity in the geocentric inertial frame.
//! - [`KeplerianElements::solve_two_body_problem`] – advance the mean anomaly by `dt` and convert.
//!
//! ## Degeneracies
//!
//! The perifocal-to-inertial rotation `Rz(Ω)·Rx(i)·Rz(ω)` stays well defined for circular
//! (`e = 0`) and equatorial (`i = 0` or `i = π`) orbits: ω and Ω are then merely conventions,
//! and the resulting state is unique.
use std::fmt;

use nalgebra::Vector3;
use roots::{find_root_newton_raphson, SimpleConvergency};

use crate::{
    constants::{Kilometer, DPI},
    kepler::{mean_motion, orbital_period, principal_angle},
    orbitrisk_errors::OrbitRiskError,
    ref_system::rotmt,
};

/// Keplerian orbital elements (osculating, two-body).
///
/// Units
/// -----
/// * `semi_major_axis`: kilometers.
/// * `eccentricity`: unitless.
/// * `inclination`: radians.
/// * `ascending_node_longitude`: radians (Ω).
/// * `periapsis_argument`: radians (ω).
/// * `mean_anomaly`: radians (M).
///
/// See also
/// --------
/// * [`crate::catalog::OrbitalElementSet`] – the catalog record these elements are built from.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct KeplerianElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node_longitude: f64,
    pub periapsis_argument: f64,
    pub mean_anomaly: f64,
}

impl KeplerianElements {
    /// Mean motion in rad/s.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        mean_motion(self.semi_major_axis, mu)
    }

    /// Keplerian period in seconds.
    pub fn period(&self, mu: f64) -> f64 {
        orbital_period(self.semi_major_axis, mu)
    }

    /// Perigee radius (km from the body center).
    pub fn perigee_radius(&self) -> Kilometer {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Apogee radius (km from the body center).
    pub fn apogee_radius(&self) -> Kilometer {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Solve Kepler's equation `M = E − e·sin(E)` for the eccentric anomaly `E`.
    ///
    /// Arguments
    /// -----------------
    /// * `mean_anomaly`: mean anomaly in radians (any value, normalized internally).
    ///
    /// Return
    /// ----------
    /// * The eccentric anomaly in `[0, 2π)` neighborhood, or
    ///   [`OrbitRiskError::KeplerSolverFailed`] if Newton–Raphson does not converge.
    pub fn solve_kepler_equation(&self, mean_anomaly: f64) -> Result<f64, OrbitRiskError> {
        let ecc = self.eccentricity;
        let m = principal_angle(mean_anomaly);

        let f = |e_anom: f64| -> f64 { e_anom - ecc * e_anom.sin() - m };
        let df = |e_anom: f64| -> f64 { 1.0 - ecc * e_anom.cos() };

        // high eccentricities converge reliably from π
        let x0 = if ecc < 0.8 { m } else { std::f64::consts::PI };

        let mut tol = SimpleConvergency {
            eps: 1e-12,
            max_iter: 50,
        };

        Ok(find_root_newton_raphson(x0, &f, &df, &mut tol)?)
    }

    /// Convert the elements to a geocentric Cartesian state.
    ///
    /// Arguments
    /// -----------------
    /// * `mu`: gravitational parameter of the central body (km³/s²).
    ///
    /// Return
    /// ----------
    /// * `(position, velocity)` in km and km/s, inertial frame.
    pub fn to_cartesian(&self, mu: f64) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        let a = self.semi_major_axis;
        let ecc = self.eccentricity;
        let ecc_anom = self.solve_kepler_equation(self.mean_anomaly)?;

        let (sin_e, cos_e) = ecc_anom.sin_cos();
        let sqrt_one_minus_e2 = (1.0 - ecc * ecc).sqrt();
        let n = self.mean_motion(mu);
        let r = a * (1.0 - ecc * cos_e);

        let pos_pf = Vector3::new(a * (cos_e - ecc), a * sqrt_one_minus_e2 * sin_e, 0.0);
        let v_scale = n * a * a / r;
        let vel_pf = Vector3::new(-v_scale * sin_e, v_scale * sqrt_one_minus_e2 * cos_e, 0.0);

        let rot = rotmt(self.ascending_node_longitude, 2)
            * rotmt(self.inclination, 0)
            * rotmt(self.periapsis_argument, 2);

        Ok((rot * pos_pf, rot * vel_pf))
    }

    /// Advance the mean anomaly by `dt` seconds of unperturbed motion.
    pub fn advanced_by(&self, dt: f64, mu: f64) -> Self {
        Self {
            mean_anomaly: principal_angle(self.mean_anomaly + self.mean_motion(mu) * dt),
            ..*self
        }
    }

    /// Solve the two-body problem: state after `dt` seconds of Keplerian motion.
    ///
    /// Arguments
    /// -----------------
    /// * `dt`: elapsed time since the element epoch, in seconds (may be negative).
    /// * `mu`: gravitational parameter (km³/s²).
    ///
    /// Return
    /// ----------
    /// * `(position, velocity)` in km and km/s.
    pub fn solve_two_body_problem(
        &self,
        dt: f64,
        mu: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        self.advanced_by(dt, mu).to_cartesian(mu)
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 360.0 / DPI;
        writeln!(f, "Keplerian Elements")?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.3} km",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.4}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (right ascension node)  = {:.6} rad ({:.4}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of perigee)   = {:.6} rad ({:.4}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        writeln!(
            f,
            "  M   (mean anomaly)          = {:.6} rad ({:.4}°)",
            self.mean_anomaly,
            self.mean_anomaly * rad_to_deg
        )
    }
}
