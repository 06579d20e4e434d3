use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    constants::{Kilometer, NoradId, PairKey},
    orbitrisk_errors::OrbitRiskError,
    propagation::{PreparedOrbit, StatePropagator},
    risk::closest_approach::{Approach, PairMotion},
    screening::{
        altitude_shells::{pairs_within, ScreenPoint},
        ScreeningParams,
    },
};

/// A pair whose separation falls within the threshold somewhere in the look-ahead window.
///
/// `window_start` and `window_end` are offsets (s) from the evaluation time, and bracket the
/// closest approach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encounter {
    pub approach: Approach,
    pub window_start: f64,
    pub window_end: f64,
}

/// Encounters of one window screening, with the per-record failures met while sampling.
#[derive(Debug, Default)]
pub struct WindowScreening {
    pub encounters: Vec<Encounter>,
    pub failures: Vec<OrbitRiskError>,
}

/// Consecutive samples of one pair within the padded threshold.
#[derive(Debug, Clone, Copy)]
struct Run {
    last_sample: usize,
    best_sample: usize,
    best_distance: Kilometer,
}

/// Screen a set of orbits over `[0, horizon]` seconds from the evaluation time.
///
/// The orbits are sampled every `params.step_seconds`. At each sample the altitude-shell screen
/// runs with the threshold padded by `max_speed × step`, which bounds how much closer two objects
/// can get between samples. Runs of consecutive padded hits are refined by golden-section
/// search; a pair becomes an [`Encounter`] when its best refined separation is within the
/// threshold.
///
/// Arguments
/// -----------------
/// * `propagator`: model used to sample the orbits.
/// * `orbits`: prepared orbits with unique catalog numbers.
/// * `params`: threshold, step and tolerance.
/// * `horizon`: window length in seconds.
///
/// Return
/// ----------
/// * Encounters sorted by pair, and one failure per orbit that could not be propagated
///   (such orbits leave the screening from the failed sample on).
pub fn screen_window(
    propagator: &dyn StatePropagator,
    orbits: &[PreparedOrbit],
    params: &ScreeningParams,
    horizon: f64,
) -> WindowScreening {
    let mut result = WindowScreening::default();
    if orbits.len() < 2 {
        return result;
    }

    let step = params.step_seconds;
    let n_steps = (horizon / step).ceil().max(1.0) as usize;
    let time_of = |k: usize| (k as f64 * step).min(horizon);

    let mu = propagator.params().mu;
    let max_speed = orbits
        .iter()
        .map(|o| o.max_speed(mu))
        .fold(0.0_f64, f64::max);
    let padded = params.threshold_km + max_speed * step;

    let index: HashMap<NoradId, usize> = orbits
        .iter()
        .enumerate()
        .map(|(i, o)| (o.norad_id, i))
        .collect();

    let mut runs: HashMap<PairKey, SmallVec<[Run; 2]>> = HashMap::new();
    let mut failed: HashSet<NoradId> = HashSet::new();

    for k in 0..=n_steps {
        let t = time_of(k);
        let sampled: Vec<(NoradId, Result<ScreenPoint, OrbitRiskError>)> = orbits
            .par_iter()
            .filter(|o| !failed.contains(&o.norad_id))
            .map(|o| {
                let point = o.state_at(propagator, t).map(|(position, _)| ScreenPoint {
                    norad_id: o.norad_id,
                    position,
                });
                (o.norad_id, point)
            })
            .collect();

        let mut points = Vec::with_capacity(sampled.len());
        for (norad_id, sample) in sampled {
            match sample {
                Ok(point) => points.push(point),
                Err(err) => {
                    warn!(norad_id, sample = k, error = %err, "orbit dropped from window screening");
                    failed.insert(norad_id);
                    result.failures.push(err);
                }
            }
        }

        for pair in pairs_within(&points, padded) {
            let entry = runs.entry((pair.a, pair.b)).or_default();
            match entry.last_mut() {
                Some(run) if run.last_sample + 1 == k => {
                    run.last_sample = k;
                    if pair.distance < run.best_distance {
                        run.best_sample = k;
                        run.best_distance = pair.distance;
                    }
                }
                _ => entry.push(Run {
                    last_sample: k,
                    best_sample: k,
                    best_distance: pair.distance,
                }),
            }
        }
    }

    let mut pairs: Vec<(PairKey, SmallVec<[Run; 2]>)> = runs
        .into_iter()
        .filter(|((a, b), _)| !failed.contains(a) && !failed.contains(b))
        .collect();
    pairs.sort_by_key(|(key, _)| *key);

    debug!(
        orbits = orbits.len(),
        samples = n_steps + 1,
        padded_threshold_km = padded,
        padded_pairs = pairs.len(),
        "window sampling done"
    );

    let refined: Vec<Result<Option<Encounter>, OrbitRiskError>> = pairs
        .par_iter()
        .map(|((a, b), pair_runs)| {
            let motion = PairMotion::new(
                propagator,
                &orbits[index[a]],
                &orbits[index[b]],
                params.time_tolerance_seconds,
            );
            let mut best: Option<(f64, Kilometer)> = None;
            for run in pair_runs {
                let lo = time_of(run.best_sample.saturating_sub(1));
                let hi = time_of((run.best_sample + 1).min(n_steps));
                let (t, d) = motion.refine_minimum(lo, hi)?;
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((t, d));
                }
            }
            let Some((t, d)) = best else {
                return Ok(None);
            };
            if d > params.threshold_km {
                return Ok(None);
            }
            let approach = motion.approach_at(t, d, horizon)?;
            let (window_start, window_end) =
                motion.window_edges(t, params.threshold_km, horizon, step)?;
            Ok(Some(Encounter {
                approach,
                window_start,
                window_end,
            }))
        })
        .collect();

    for outcome in refined {
        match outcome {
            Ok(Some(encounter)) => result.encounters.push(encounter),
            Ok(None) => {}
            Err(err) => result.failures.push(err),
        }
    }
    result
}

#[cfg(test)]
mod window_test {
    use super::*;
    use crate::{
        catalog::ObjectClass,
        constants::{MU_EARTH_KM3_S2, RADEG},
        kepler::{mean_motion, principal_angle},
        orbit_type::keplerian_element::KeplerianElements,
        propagation::{PropagationParams, TwoBodyPropagator},
    };
    use approx::assert_relative_eq;

    fn circular(norad_id: NoradId, a: f64, inclination_deg: f64, node_at: f64) -> PreparedOrbit {
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
                mean_anomaly: principal_angle(-n * node_at),
            },
            epoch_offset: 0.0,
        }
    }

    #[test]
    fn test_converging_pair_is_found_later_in_window() {
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let orbits = vec![
            circular(10, 7_000.0, 51.6, 7_200.0),
            circular(20, 7_000.5, 97.0, 7_200.0),
            // far away in GEO
            circular(30, 42_164.0, 0.1, 0.0),
        ];
        let screening = screen_window(&prop, &orbits, &ScreeningParams::default(), 6.0 * 3_600.0);

        assert!(screening.failures.is_empty());
        assert_eq!(screening.encounters.len(), 1);
        let enc = screening.encounters[0];
        assert_eq!((enc.approach.norad_a, enc.approach.norad_b), (10, 20));
        assert_relative_eq!(enc.approach.tca_offset, 7_200.0, epsilon = 1.0);
        assert!(enc.approach.miss_distance < 0.51);
        assert!(enc.window_start < 7_200.0 && enc.window_end > 7_200.0);
    }

    #[test]
    fn test_separated_shells_never_meet() {
        // same plane, 500 km apart in radius
        let prop = TwoBodyPropagator::new(PropagationParams::default());
        let orbits = vec![
            circular(1, 6_878.0, 45.0, 0.0),
            circular(2, 7_378.0, 45.0, 0.0),
        ];
        let screening = screen_window(&prop, &orbits, &ScreeningParams::default(), 24.0 * 3_600.0);
        assert!(screening.encounters.is_empty());
    }
}
