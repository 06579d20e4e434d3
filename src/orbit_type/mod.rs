//! # Orbital element representations
//!
//! This module gathers the element representations understood by the propagators:
//!
//! - [`keplerian_element`](crate::orbit_type::keplerian_element): classical Keplerian elements
//!   `(a, e, i, Ω, ω, M)` in kilometers and radians, with the two-body solver.
//! - [`OrbitShape`]: the size parameter of a catalog record, which feeds may deliver either as a
//!   semi-major axis or as a mean motion.
//!
//! ## Typical workflow
//!
//! ```rust, no_run
//! use orbitrisk::constants::MU_EARTH_KM3_S2;
//! use orbitrisk::orbit_type::keplerian_element::KeplerianElements;
//!
//! let kep = KeplerianElements {
//!     semi_major_axis: 6_778.0,
//!     eccentricity: 0.0005,
//!     inclination: 0.9,
//!     ascending_node_longitude: 1.2,
//!     periapsis_argument: 0.3,
//!     mean_anomaly: 2.0,
//! };
//!
//! let (r, v) = kep.solve_two_body_problem(600.0, MU_EARTH_KM3_S2).unwrap();
//! println!("|r| = {} km, |v| = {} km/s", r.norm(), v.norm());
//! ```
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DPI, SECONDS_PER_DAY},
    kepler::semi_major_axis_from_mean_motion,
};

/// Classical Keplerian elements structure and the two-body solver.
pub mod keplerian_element;

/// Size parameter of an element set.
///
/// Variants
/// --------
/// * `SemiMajorAxis`: semi-major axis in kilometers.
/// * `MeanMotion`: mean motion in revolutions per day, as carried by two-line element feeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitShape {
    SemiMajorAxis(f64),
    MeanMotion(f64),
}

impl OrbitShape {
    /// Semi-major axis in kilometers for a body of gravitational parameter `mu` (km³/s²).
    ///
    /// A non-positive mean motion yields a non-finite axis, rejected by element validation.
    pub fn semi_major_axis(&self, mu: f64) -> f64 {
        match *self {
            OrbitShape::SemiMajorAxis(a) => a,
            OrbitShape::MeanMotion(rev_per_day) => {
                if rev_per_day <= 0.0 {
                    return f64::NAN;
                }
                let n = rev_per_day * DPI / SECONDS_PER_DAY;
                semi_major_axis_from_mean_motion(n, mu)
            }
        }
    }

    /// Raw value as supplied, for validation messages.
    pub fn raw_value(&self) -> f64 {
        match *self {
            OrbitShape::SemiMajorAxis(v) | OrbitShape::MeanMotion(v) => v,
        }
    }
}
