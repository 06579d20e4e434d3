use std::collections::HashMap;

use hifitime::Epoch;
use rayon::prelude::*;

use crate::{
    catalog::ObjectClass,
    constants::{Hours, Kilometer, NoradId, Percent},
    propagation::KinematicState,
    risk::{
        conjunction::{ConjunctionEvent, TimeWindow},
        probability::{at_least_one, combined_risk, debris_environment_score, pair_probability},
        risk_params::{RiskLevel, RiskParams},
    },
    screening::{CandidatePair, Encounter},
    time::offset_seconds,
};

/// Per-object risk summary of one cycle.
///
/// `collision_probability` is a percentage. `closest_approach_km` and
/// `time_to_closest_approach_hours` come from the object's closest conjunction event and are
/// `None` without one (or when its approach time is undefined, for the latter).
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub norad_id: NoradId,
    pub risk_level: RiskLevel,
    pub collision_probability: Percent,
    pub nearby_objects_count: usize,
    pub closest_approach_km: Option<Kilometer>,
    pub time_to_closest_approach_hours: Option<Hours>,
    pub debris_environment_score: f64,
}

/// Turns screened encounters into scored events and per-object assessments.
#[derive(Debug, Clone)]
pub struct ConjunctionRiskAssessor {
    params: RiskParams,
    threshold_km: Kilometer,
}

impl ConjunctionRiskAssessor {
    /// Arguments
    /// -----------------
    /// * `params`: risk model constants and tiers.
    /// * `threshold_km`: screening threshold beyond which a pair probability is zero.
    pub fn new(params: RiskParams, threshold_km: Kilometer) -> Self {
        Self {
            params,
            threshold_km,
        }
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    /// Score one encounter.
    ///
    /// Arguments
    /// -----------------
    /// * `encounter`: closest approach and window, as offsets from `eval_time`.
    /// * `class_a`, `class_b`: classes of the two objects; the larger multiplier applies.
    /// * `drag_multiplier`: space-weather drag multiplier of the cycle.
    /// * `eval_time`: evaluation time the offsets refer to.
    pub fn score_encounter(
        &self,
        encounter: &Encounter,
        class_a: ObjectClass,
        class_b: ObjectClass,
        drag_multiplier: f64,
        eval_time: &Epoch,
    ) -> ConjunctionEvent {
        let approach = &encounter.approach;
        let class_multiplier = class_a
            .cross_section_multiplier()
            .max(class_b.cross_section_multiplier());
        let probability = pair_probability(
            approach.miss_distance,
            self.threshold_km,
            class_multiplier,
            drag_multiplier,
            &self.params,
        );

        ConjunctionEvent {
            norad_a: approach.norad_a,
            norad_b: approach.norad_b,
            probability,
            combined_risk: combined_risk(probability, approach.relative_speed, &self.params),
            risk_level: self.params.thresholds.classify(100.0 * probability),
            closest_approach_km: approach.miss_distance,
            relative_speed_kms: approach.relative_speed,
            tca: approach
                .time_to_closest_approach()
                .map(|dt| offset_seconds(eval_time, dt)),
            window: TimeWindow {
                start: offset_seconds(eval_time, encounter.window_start),
                end: offset_seconds(eval_time, encounter.window_end),
            },
        }
    }

    /// Score a batch of encounters, in parallel; output sorted by pair.
    pub fn score_encounters(
        &self,
        encounters: &[Encounter],
        classes: &HashMap<NoradId, ObjectClass>,
        drag_multiplier: f64,
        eval_time: &Epoch,
    ) -> Vec<ConjunctionEvent> {
        let class_of = |id: NoradId| classes.get(&id).copied().unwrap_or(ObjectClass::Unknown);
        let mut events: Vec<ConjunctionEvent> = encounters
            .par_iter()
            .map(|enc| {
                self.score_encounter(
                    enc,
                    class_of(enc.approach.norad_a),
                    class_of(enc.approach.norad_b),
                    drag_multiplier,
                    eval_time,
                )
            })
            .collect();
        events.sort_by_key(|e| (e.norad_a, e.norad_b));
        events
    }

    /// Per-object assessments, one per state, sorted by catalog number.
    ///
    /// Arguments
    /// -----------------
    /// * `states`: the cycle's kinematic states.
    /// * `classes`: class of every object, for the density weights.
    /// * `nearby`: pairs within the screening threshold at the evaluation time.
    /// * `density`: pairs within the density radius at the evaluation time.
    /// * `events`: scored conjunction events, sorted by pair.
    /// * `eval_time`: evaluation time.
    pub fn assess_objects(
        &self,
        states: &[KinematicState],
        classes: &HashMap<NoradId, ObjectClass>,
        nearby: &[CandidatePair],
        density: &[CandidatePair],
        events: &[ConjunctionEvent],
        eval_time: &Epoch,
    ) -> Vec<RiskAssessment> {
        let class_of = |id: NoradId| classes.get(&id).copied().unwrap_or(ObjectClass::Unknown);

        let mut nearby_count: HashMap<NoradId, usize> = HashMap::new();
        for pair in nearby {
            *nearby_count.entry(pair.a).or_default() += 1;
            *nearby_count.entry(pair.b).or_default() += 1;
        }

        let mut density_weight: HashMap<NoradId, f64> = HashMap::new();
        for pair in density {
            *density_weight.entry(pair.a).or_default() += class_of(pair.b).density_weight();
            *density_weight.entry(pair.b).or_default() += class_of(pair.a).density_weight();
        }

        let mut by_object: HashMap<NoradId, Vec<&ConjunctionEvent>> = HashMap::new();
        for event in events {
            by_object.entry(event.norad_a).or_default().push(event);
            by_object.entry(event.norad_b).or_default().push(event);
        }

        let mut assessments: Vec<RiskAssessment> = states
            .par_iter()
            .map(|state| {
                let id = state.norad_id;
                let own_events = by_object.get(&id).map(Vec::as_slice).unwrap_or(&[]);

                let probability = 100.0 * at_least_one(own_events.iter().map(|e| e.probability));
                let closest = own_events
                    .iter()
                    .min_by(|x, y| x.closest_approach_km.total_cmp(&y.closest_approach_km));

                RiskAssessment {
                    norad_id: id,
                    risk_level: self.params.thresholds.classify(probability),
                    collision_probability: probability,
                    nearby_objects_count: nearby_count.get(&id).copied().unwrap_or(0),
                    closest_approach_km: closest.map(|e| e.closest_approach_km),
                    time_to_closest_approach_hours: closest
                        .and_then(|e| e.hours_to_tca(eval_time)),
                    debris_environment_score: debris_environment_score(
                        density_weight.get(&id).copied().unwrap_or(0.0),
                        self.params.density_half_saturation,
                    ),
                }
            })
            .collect();

        assessments.sort_by_key(|a| a.norad_id);
        assessments
    }
}
