//! # Conjunction probability model
//!
//! Closed-form mapping from encounter geometry to probabilities and scores.
//!
//! ```text
//! p0(d)   = exp(−d / L)                 d ≤ threshold, else 0
//! p       = 1 − (1 − p0)^(m_class · m_drag)
//! u       = v_rel / (v_rel + v_ref)
//! risk    = p · (1 + w·u) / (1 + w)
//! P_obj   = 1 − Π (1 − p_i)
//! score   = 100 · W / (W + k)
//! ```
//!
//! * `m_class` is the larger cross-section multiplier of the two objects and `m_drag` the
//!   space-weather drag multiplier. An exponent above one raises the probability at a given
//!   distance without breaking monotonicity.
//! * The urgency `u` only reweights the combined risk used for ranking; the probability itself
//!   does not depend on the relative speed.
//! * `W` is the class-weighted count of neighbours within the density radius.
use crate::{
    constants::{Kilometer, KmPerSec},
    risk::risk_params::RiskParams,
};

/// Miss-distance probability before cross-section and drag scaling.
///
/// Arguments
/// -----------------
/// * `distance`: closest-approach distance (km).
/// * `threshold`: screening threshold (km); beyond it the probability is exactly zero.
/// * `decay_length`: distance scale `L` (km).
pub fn base_probability(distance: Kilometer, threshold: Kilometer, decay_length: Kilometer) -> f64 {
    if distance.is_nan() || distance > threshold {
        return 0.0;
    }
    (-distance.max(0.0) / decay_length).exp()
}

/// Pair probability in `[0, 1]`, non-increasing in `distance`.
///
/// Arguments
/// -----------------
/// * `distance`: closest-approach distance (km).
/// * `threshold`: screening threshold (km).
/// * `class_multiplier`: cross-section multiplier of the pair (≥ 1).
/// * `drag_multiplier`: space-weather drag multiplier (≥ 1).
/// * `params`: model constants.
pub fn pair_probability(
    distance: Kilometer,
    threshold: Kilometer,
    class_multiplier: f64,
    drag_multiplier: f64,
    params: &RiskParams,
) -> f64 {
    let p0 = base_probability(distance, threshold, params.decay_length_km);
    let exponent = (class_multiplier * drag_multiplier).max(0.0);
    (1.0 - (1.0 - p0).powf(exponent)).clamp(0.0, 1.0)
}

/// Encounter urgency in `[0, 1)`.
pub fn urgency(relative_speed: KmPerSec, reference_speed: KmPerSec) -> f64 {
    let v = relative_speed.max(0.0);
    v / (v + reference_speed)
}

/// Combined risk in `[0, 1]` from a pair probability and its relative speed.
pub fn combined_risk(probability: f64, relative_speed: KmPerSec, params: &RiskParams) -> f64 {
    let w = params.urgency_weight;
    let u = urgency(relative_speed, params.reference_speed_kms);
    probability * (1.0 + w * u) / (1.0 + w)
}

/// Probability that at least one of several independent events occurs.
///
/// Probabilities are folded in the iteration order; callers pass them in a canonical order so
/// the floating-point result is reproducible.
pub fn at_least_one<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let none = probabilities
        .into_iter()
        .fold(1.0, |acc, p| acc * (1.0 - p.clamp(0.0, 1.0)));
    (1.0 - none).clamp(0.0, 1.0)
}

/// Debris-environment score in `[0, 100)` from a weighted neighbour count.
pub fn debris_environment_score(weighted_neighbours: f64, half_saturation: f64) -> f64 {
    let w = weighted_neighbours.max(0.0);
    100.0 * w / (w + half_saturation)
}

#[cfg(test)]
mod probability_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_probability_is_monotone_in_distance() {
        let params = RiskParams::default();
        let mut previous = f64::INFINITY;
        for i in 0..=220 {
            let d = i as f64 * 0.5;
            let p = pair_probability(d, 100.0, 1.5, 1.3, &params);
            assert!(p <= previous, "p({d}) = {p} > {previous}");
            assert!((0.0..=1.0).contains(&p));
            previous = p;
        }
        assert_eq!(pair_probability(100.000_1, 100.0, 1.0, 1.0, &params), 0.0);
        assert!(pair_probability(100.0, 100.0, 1.0, 1.0, &params) > 0.0);
    }

    #[test]
    fn test_neutral_multipliers_keep_base_probability() {
        let params = RiskParams::default();
        assert_relative_eq!(
            pair_probability(0.5, 100.0, 1.0, 1.0, &params),
            (-0.1_f64).exp(),
            epsilon = 1e-12
        );
        // a larger cross-section raises the probability
        assert!(
            pair_probability(10.0, 100.0, 1.5, 1.0, &params)
                > pair_probability(10.0, 100.0, 1.0, 1.0, &params)
        );
    }

    #[test]
    fn test_combined_risk_bounds() {
        let params = RiskParams::default();
        assert_relative_eq!(combined_risk(0.6, 0.0, &params), 0.4, epsilon = 1e-12);
        assert!(combined_risk(0.6, 14.0, &params) < 0.6);
        assert!(combined_risk(0.6, 14.0, &params) > combined_risk(0.6, 1.0, &params));
        assert_relative_eq!(urgency(1.0, 1.0), 0.5);
    }

    #[test]
    fn test_at_least_one() {
        assert_eq!(at_least_one(Vec::<f64>::new()), 0.0);
        assert_relative_eq!(at_least_one([0.5, 0.5]), 0.75);
        assert_relative_eq!(at_least_one([0.2]), 0.2);
        assert!(at_least_one([0.2, 0.01]) >= at_least_one([0.2]));
    }

    #[test]
    fn test_debris_score() {
        assert_eq!(debris_environment_score(0.0, 10.0), 0.0);
        assert_relative_eq!(debris_environment_score(10.0, 10.0), 50.0);
        assert!(debris_environment_score(1e6, 10.0) < 100.0);
    }
}
