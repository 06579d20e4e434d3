mod common;

use common::*;
use itertools::Itertools;
use orbitrisk::{
    analytics::aggregate_probability,
    catalog::OrbitalElementSet,
    orbit_type::OrbitShape,
    propagation::{PropagationParams, StatePropagator, TwoBodyPropagator},
    risk::{
        probability::pair_probability, ConjunctionEvent, RiskLevel, RiskParams, RiskThresholds,
        TimeWindow,
    },
    snapshot::{to_json, ListQuery},
    space_weather::{SpaceWeatherContext, SpaceWeatherSnapshot},
    time::offset_seconds,
};

#[test]
fn test_period_increases_with_semi_major_axis() {
    let propagator = TwoBodyPropagator::new(PropagationParams::default());
    let periods: Vec<f64> = (0..20)
        .map(|k| {
            let a = 6_700.0 + 500.0 * k as f64;
            let set = OrbitalElementSet::new(
                10 + k,
                "PROBE",
                OrbitShape::SemiMajorAxis(a),
                0.01,
                63.4,
                40.0,
                270.0,
                15.0,
                t0(),
            );
            let state = propagator.propagate(&set, &offset_seconds(&t0(), 600.0)).unwrap();
            assert!(state.altitude > 0.0);
            assert!(state.period > 0.0);
            state.period
        })
        .collect();
    assert!(periods.iter().tuple_windows().all(|(p, q)| p < q));
}

#[test]
fn test_probability_non_increasing_with_distance() {
    let params = RiskParams::default();
    for (class_mult, drag) in [(1.0, 1.0), (1.2, 1.0), (1.5, 1.9)] {
        let probabilities: Vec<f64> = (0..=400)
            .map(|i| pair_probability(i as f64 * 0.25, 100.0, class_mult, drag, &params))
            .collect();
        assert!(probabilities.iter().tuple_windows().all(|(p, q)| q <= p));
    }
}

#[test]
fn test_risk_tiers_partition_probability_space() {
    let thresholds = RiskThresholds::default();
    let mut previous = RiskLevel::Low;
    for i in 0..=100_000 {
        let percent = i as f64 * 1e-3;
        let level = thresholds.classify(percent);
        assert!(level >= previous);
        previous = level;
    }
    assert_eq!(thresholds.classify(thresholds.medium), RiskLevel::Medium);
    assert_eq!(thresholds.classify(thresholds.high), RiskLevel::High);
    assert_eq!(thresholds.classify(thresholds.critical), RiskLevel::Critical);
}

fn event(a: u32, b: u32, probability: f64) -> ConjunctionEvent {
    ConjunctionEvent {
        norad_a: a,
        norad_b: b,
        probability,
        combined_risk: probability,
        risk_level: RiskLevel::High,
        closest_approach_km: 5.0,
        relative_speed_kms: 7.0,
        tca: Some(offset_seconds(&t0(), 3_600.0)),
        window: TimeWindow {
            start: offset_seconds(&t0(), 3_590.0),
            end: offset_seconds(&t0(), 3_610.0),
        },
    }
}

#[test]
fn test_aggregate_probability_grows_with_each_risky_pair() {
    assert_eq!(aggregate_probability(&[], &t0(), 24.0), 0.0);

    let mut events = Vec::new();
    let mut previous = 0.0;
    for (k, p) in [0.01, 0.2, 1e-6, 0.5, 0.03].into_iter().enumerate() {
        events.push(event(1, 2 + k as u32, p));
        let aggregate = aggregate_probability(&events, &t0(), 24.0);
        assert!(aggregate >= previous);
        assert!(aggregate <= 1.0);
        previous = aggregate;
    }
}

fn mixed_catalog() -> Vec<OrbitalElementSet> {
    let mut catalog = converging_pair();
    catalog.extend(separated_pair());
    catalog.push(stale_object());
    catalog.push(invalid_object());
    catalog.push(debris(5001, 6_990.0, 51.6, 7_300.0));
    catalog.push(circular(5002, "CENTAUR R/B", 7_010.0, 97.0, 7_250.0));
    catalog
}

#[test]
fn test_high_risk_is_the_filtered_listing() {
    let snapshot = engine()
        .assess(&mixed_catalog(), Some(&quiet_weather()), t0())
        .unwrap();

    let listed: Vec<u32> = snapshot
        .list_objects(&ListQuery::default())
        .into_iter()
        .filter(|r| {
            r.risk
                .as_ref()
                .is_some_and(|risk| risk.collision_risk_level.is_high_risk())
        })
        .map(|r| r.norad_id)
        .collect();
    let high_risk: Vec<u32> = snapshot.high_risk().into_iter().map(|r| r.norad_id).collect();

    assert!(!high_risk.is_empty());
    assert_eq!(listed, high_risk);
    assert_eq!(high_risk, snapshot.high_risk_ids());
}

#[test]
fn test_identical_inputs_give_identical_outputs() {
    let weather = SpaceWeatherContext::new(SpaceWeatherSnapshot::from_indices(210.0, 5.0, t0()));
    let engine = engine();
    let first = engine.assess(&mixed_catalog(), Some(&weather), t0()).unwrap();

    // input order must not matter either
    let mut shuffled = mixed_catalog();
    shuffled.reverse();
    let second = engine.assess(&shuffled, Some(&weather), t0()).unwrap();

    let query = ListQuery::default().include_weather(true);
    assert_eq!(
        to_json(&first.list_objects(&query)).unwrap(),
        to_json(&second.list_objects(&query)).unwrap()
    );
    assert_eq!(
        to_json(&first.dashboard_summary()).unwrap(),
        to_json(&second.dashboard_summary()).unwrap()
    );
    assert_eq!(first.events(), second.events());
}
