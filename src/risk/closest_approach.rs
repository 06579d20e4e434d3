//! # Closest approach of an object pair
//!
//! Time-domain search of the minimum separation of two prepared orbits over a bounded
//! look-ahead window.
//!
//! ## Algorithm
//!
//! 1. The separation `d(t) = |r_a(t) − r_b(t)|` is sampled at a fixed step over `[0, horizon]`.
//! 2. Every sampled local minimum is refined by a golden-section search over the two adjacent
//!    steps, to the configured time tolerance.
//! 3. The smallest refined minimum is the closest approach. It is *interior* when it does not
//!    sit on either end of the window; a boundary minimum means the pair is still diverging or
//!    converging at the window edges and no time of closest approach is reported.
//! 4. When the relative speed at the minimum vanishes, the approach time is undefined and the
//!    approach is flagged *degenerate*.
//!
//! Window edges around a minimum are found by marching outward one step at a time and
//! bisecting the first threshold crossing.
use nalgebra::Vector3;

use crate::{
    constants::{pair_key, Kilometer, KmPerSec},
    orbitrisk_errors::OrbitRiskError,
    propagation::{PreparedOrbit, StatePropagator},
};

/// Relative speed (km/s) below which the time of closest approach is undefined.
pub const DEGENERATE_RELATIVE_SPEED: KmPerSec = 1e-6;

/// Inverse golden ratio.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Closest approach of one pair within a look-ahead window.
///
/// Times are offsets in seconds from the evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    pub norad_a: u32,
    pub norad_b: u32,
    pub tca_offset: f64,
    pub miss_distance: Kilometer,
    pub relative_speed: KmPerSec,
    /// The minimum lies strictly inside the window.
    pub interior: bool,
    /// The relative motion vanishes at the minimum.
    pub degenerate: bool,
}

impl Approach {
    /// Offset of the closest approach, when it is well defined.
    pub fn time_to_closest_approach(&self) -> Option<f64> {
        (self.interior && !self.degenerate).then_some(self.tca_offset)
    }
}

/// Relative motion of two prepared orbits under one propagator.
pub struct PairMotion<'a> {
    propagator: &'a dyn StatePropagator,
    a: &'a PreparedOrbit,
    b: &'a PreparedOrbit,
    tolerance: f64,
}

impl<'a> PairMotion<'a> {
    /// Arguments
    /// -----------------
    /// * `propagator`: the model both orbits are sampled with.
    /// * `a`, `b`: the two orbits, in any order (the result is reported in canonical order).
    /// * `tolerance`: time resolution of the refinements, in seconds.
    pub fn new(
        propagator: &'a dyn StatePropagator,
        a: &'a PreparedOrbit,
        b: &'a PreparedOrbit,
        tolerance: f64,
    ) -> Self {
        Self {
            propagator,
            a,
            b,
            tolerance,
        }
    }

    /// Relative position and velocity `b − a` at offset `t`.
    pub fn relative_state(&self, t: f64) -> Result<(Vector3<f64>, Vector3<f64>), OrbitRiskError> {
        let (ra, va) = self.a.state_at(self.propagator, t)?;
        let (rb, vb) = self.b.state_at(self.propagator, t)?;
        Ok((rb - ra, vb - va))
    }

    /// Separation (km) at offset `t`.
    pub fn separation(&self, t: f64) -> Result<Kilometer, OrbitRiskError> {
        Ok(self.relative_state(t)?.0.norm())
    }

    /// Golden-section minimization of the separation over `[lo, hi]`.
    ///
    /// Return
    /// ----------
    /// * `(t, d)`: the offset of the minimum and the separation there.
    pub fn refine_minimum(&self, lo: f64, hi: f64) -> Result<(f64, Kilometer), OrbitRiskError> {
        let (mut lo, mut hi) = (lo.min(hi), lo.max(hi));
        let mut x1 = hi - INV_PHI * (hi - lo);
        let mut x2 = lo + INV_PHI * (hi - lo);
        let mut f1 = self.separation(x1)?;
        let mut f2 = self.separation(x2)?;

        while hi - lo > self.tolerance {
            if f1 <= f2 {
                hi = x2;
                x2 = x1;
                f2 = f1;
                x1 = hi - INV_PHI * (hi - lo);
                f1 = self.separation(x1)?;
            } else {
                lo = x1;
                x1 = x2;
                f1 = f2;
                x2 = lo + INV_PHI * (hi - lo);
                f2 = self.separation(x2)?;
            }
        }

        // the bracket ends can beat the interior probes when the minimum is on a boundary
        let mid = 0.5 * (lo + hi);
        let mut best = (mid, self.separation(mid)?);
        for t in [lo, hi] {
            let d = self.separation(t)?;
            if d < best.1 {
                best = (t, d);
            }
        }
        Ok(best)
    }

    /// Bisect the threshold crossing between an offset inside and one outside the threshold.
    fn crossing(
        &self,
        mut inside: f64,
        mut outside: f64,
        threshold: Kilometer,
    ) -> Result<f64, OrbitRiskError> {
        while (outside - inside).abs() > self.tolerance {
            let mid = 0.5 * (inside + outside);
            if self.separation(mid)? <= threshold {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        Ok(inside)
    }

    /// Edges of the interval around `tca` during which the separation stays within `threshold`.
    ///
    /// Arguments
    /// -----------------
    /// * `tca`: offset of a minimum whose separation is within the threshold.
    /// * `threshold`: distance threshold (km), closed.
    /// * `horizon`: window length (s); edges are clamped to `[0, horizon]`.
    /// * `step`: marching step (s).
    pub fn window_edges(
        &self,
        tca: f64,
        threshold: Kilometer,
        horizon: f64,
        step: f64,
    ) -> Result<(f64, f64), OrbitRiskError> {
        let start = self.march(tca, -step, threshold, 0.0)?;
        let end = self.march(tca, step, threshold, horizon)?;
        Ok((start, end))
    }

    fn march(
        &self,
        from: f64,
        delta: f64,
        threshold: Kilometer,
        bound: f64,
    ) -> Result<f64, OrbitRiskError> {
        let mut inside = from;
        loop {
            let next = if delta > 0.0 {
                (inside + delta).min(bound)
            } else {
                (inside + delta).max(bound)
            };
            if self.separation(next)? > threshold {
                return self.crossing(inside, next, threshold);
            }
            if next == bound {
                return Ok(bound);
            }
            inside = next;
        }
    }

    /// Qualify a refined minimum at offset `t` with separation `d`.
    pub fn approach_at(
        &self,
        t: f64,
        d: Kilometer,
        horizon: f64,
    ) -> Result<Approach, OrbitRiskError> {
        let (_, rel_vel) = self.relative_state(t)?;
        let relative_speed = rel_vel.norm();
        let margin = 2.0 * self.tolerance;
        let (norad_a, norad_b) = pair_key(self.a.norad_id, self.b.norad_id);
        Ok(Approach {
            norad_a,
            norad_b,
            tca_offset: t,
            miss_distance: d,
            relative_speed,
            interior: t > margin && t < horizon - margin,
            degenerate: relative_speed < DEGENERATE_RELATIVE_SPEED,
        })
    }

    /// Closest approach over `[0, horizon]`, whatever the distance.
    ///
    /// Arguments
    /// -----------------
    /// * `horizon`: window length in seconds (> 0).
    /// * `step`: sampling step in seconds (> 0).
    ///
    /// Return
    /// ----------
    /// * The [`Approach`] with the smallest refined separation; ties keep the earliest.
    pub fn search(&self, horizon: f64, step: f64) -> Result<Approach, OrbitRiskError> {
        let n_steps = (horizon / step).ceil().max(1.0) as usize;
        let time_of = |k: usize| (k as f64 * step).min(horizon);

        let samples = (0..=n_steps)
            .map(|k| self.separation(time_of(k)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut best: Option<(f64, Kilometer)> = None;
        for k in 0..samples.len() {
            let left = k.checked_sub(1).map_or(f64::INFINITY, |j| samples[j]);
            let right = samples.get(k + 1).copied().unwrap_or(f64::INFINITY);
            if samples[k] > left || samples[k] > right {
                continue;
            }
            let lo = time_of(k.saturating_sub(1));
            let hi = time_of((k + 1).min(n_steps));
            let (t, d) = self.refine_minimum(lo, hi)?;
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((t, d));
            }
        }

        // samples is never empty, so at least one local minimum exists
        let (t, d) = best.unwrap_or((0.0, samples[0]));
        self.approach_at(t, d, horizon)
    }
}

#[cfg(test)]
mod closest_approach_test {
    use super::*;
    use crate::{
        catalog::ObjectClass,
        constants::{MU_EARTH_KM3_S2, RADEG},
        kepler::{mean_motion, principal_angle},
        orbit_type::keplerian_element::KeplerianElements,
        propagation::{PropagationParams, TwoBodyPropagator},
    };
    use approx::assert_relative_eq;

    /// Circular orbit that crosses the +X node `at` seconds after the evaluation time.
    fn crossing_orbit(norad_id: u32, a: f64, inclination_deg: f64, at: f64) -> PreparedOrbit {
        let n = mean_motion(a, MU_EARTH_KM3_S2);
        PreparedOrbit {
            norad_id,
            class: ObjectClass::Payload,
            elements: KeplerianElements {
                semi_major_axis: a,
                eccentricity: 0.0,
                inclination: inclination_deg * RADEG,
                ascending_node_longitude: 0.0,
                periapsis_argument: 0.0,
                mean_anomaly: principal_angle(-n * at),
            },
            epoch_offset: 0.0,
        }
    }

    #[test]
    fn test_crossing_pair_minimum() {
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let a = crossing_orbit(2, 7_000.0, 51.6, 3_600.0);
        let b = crossing_orbit(1, 7_000.5, 97.0, 3_600.0);
        let motion = PairMotion::new(&prop, &a, &b, 1e-3);

        let approach = motion.search(4.0 * 3_600.0, 60.0).unwrap();
        assert_eq!((approach.norad_a, approach.norad_b), (1, 2));
        assert_relative_eq!(approach.tca_offset, 3_600.0, epsilon = 1.0);
        assert!(approach.miss_distance <= 0.5 + 1e-6);
        assert!(approach.miss_distance > 0.4);
        assert!(approach.relative_speed > 1.0);
        assert!(approach.time_to_closest_approach().is_some());

        let (start, end) = motion
            .window_edges(approach.tca_offset, 100.0, 4.0 * 3_600.0, 60.0)
            .unwrap();
        assert!(start < approach.tca_offset && end > approach.tca_offset);
        assert!(motion.separation(start).unwrap() <= 100.0);
        assert!(motion.separation(end + 1.0).unwrap() > 100.0);
    }

    #[test]
    fn test_boundary_minimum_is_not_interior() {
        // the pair converges at t = 3 h, beyond a 1 h window
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let a = crossing_orbit(1, 7_000.0, 51.6, 3.0 * 3_600.0);
        let b = crossing_orbit(2, 7_000.5, 97.0, 3.0 * 3_600.0);
        let motion = PairMotion::new(&prop, &a, &b, 1e-3);
        let approach = motion.search(600.0, 60.0).unwrap();
        assert!(!approach.interior);
        assert!(approach.time_to_closest_approach().is_none());
        assert!(approach.miss_distance > 100.0);
    }

    #[test]
    fn test_identical_orbits_are_degenerate() {
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let a = crossing_orbit(1, 7_000.0, 51.6, 0.0);
        let b = crossing_orbit(2, 7_000.0, 51.6, 0.0);
        let motion = PairMotion::new(&prop, &a, &b, 1e-3);
        let approach = motion.search(3_600.0, 60.0).unwrap();
        assert!(approach.degenerate);
        assert!(approach.time_to_closest_approach().is_none());
        assert!(approach.miss_distance < 1e-9);
    }
}
