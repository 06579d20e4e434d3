use std::cmp::Ordering;
use std::collections::BTreeMap;

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use crate::constants::{pair_key, Kilometer, NoradId};

/// Position of one object at the screening time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub norad_id: NoradId,
    pub position: Vector3<f64>,
}

/// Two objects found within the screening distance, in canonical order (`a < b`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePair {
    pub a: NoradId,
    pub b: NoradId,
    pub distance: Kilometer,
}

/// Index of the altitude shell of `radius`, for shells of thickness `width`.
#[inline]
fn shell_index(radius: f64, width: f64) -> i64 {
    (radius / width).floor() as i64
}

/// All pairs of points whose separation is at most `threshold` km.
///
/// Points are binned into geocentric-radius shells of thickness `threshold`. Two points closer
/// than `threshold` differ in radius by less than `threshold`, so only the same and the next shell
/// are compared. Inside that band the comparison is a sweep over the X coordinate. Shells are
/// scanned in parallel and the result is sorted by `(a, b)`.
///
/// Arguments
/// -----------------
/// * `points`: positions at a common time; catalog numbers are assumed unique.
/// * `threshold`: closed distance threshold in km (> 0).
///
/// Return
/// ----------
/// * Candidate pairs without self-pairs or mirrored duplicates.
pub fn pairs_within(points: &[ScreenPoint], threshold: Kilometer) -> Vec<CandidatePair> {
    if points.len() < 2 || threshold.partial_cmp(&0.0) != Some(Ordering::Greater) {
        return Vec::new();
    }

    let mut shells: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, point) in points.iter().enumerate() {
        shells
            .entry(shell_index(point.position.norm(), threshold))
            .or_default()
            .push(idx);
    }

    let keys: Vec<i64> = shells.keys().copied().collect();
    let threshold_sq = threshold * threshold;

    let mut pairs: Vec<CandidatePair> = keys
        .par_iter()
        .flat_map_iter(|key| {
            // (index, belongs to the current shell)
            let mut band: Vec<(usize, bool)> = shells[key].iter().map(|&i| (i, true)).collect();
            if let Some(next) = shells.get(&(key + 1)) {
                band.extend(next.iter().map(|&i| (i, false)));
            }
            band.sort_by(|(i, _), (j, _)| points[*i].position.x.total_cmp(&points[*j].position.x));

            let mut found = Vec::new();
            for (n, &(i, i_here)) in band.iter().enumerate() {
                let p = &points[i];
                for &(j, j_here) in &band[n + 1..] {
                    let q = &points[j];
                    if q.position.x - p.position.x > threshold {
                        break;
                    }
                    // pairs entirely in the next shell belong to that shell's scan
                    if !i_here && !j_here {
                        continue;
                    }
                    if p.norad_id == q.norad_id {
                        continue;
                    }
                    let dist_sq = (p.position - q.position).norm_squared();
                    if dist_sq <= threshold_sq {
                        let (a, b) = pair_key(p.norad_id, q.norad_id);
                        found.push(CandidatePair {
                            a,
                            b,
                            distance: dist_sq.sqrt(),
                        });
                    }
                }
            }
            found
        })
        .collect();

    pairs.sort_by(|p, q| (p.a, p.b).cmp(&(q.a, q.b)));
    pairs.dedup_by(|p, q| p.a == q.a && p.b == q.b);

    debug!(
        points = points.len(),
        shells = keys.len(),
        threshold_km = threshold,
        pairs = pairs.len(),
        "altitude-shell screening"
    );
    pairs
}
