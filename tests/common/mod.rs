#![allow(dead_code)]

use approx::assert_relative_eq;
use hifitime::Epoch;
use orbitrisk::{
    catalog::{ObjectClass, OrbitalElementSet},
    constants::{NoradId, MU_EARTH_KM3_S2},
    engine::{AssessmentEngine, EngineConfig},
    orbit_type::OrbitShape,
    snapshot::payloads::OrbitalPayload,
    space_weather::{SpaceWeatherContext, SpaceWeatherSnapshot},
};

/// Evaluation time shared by the fixtures.
pub fn t0() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)
}

pub fn mean_motion_rad_s(a: f64) -> f64 {
    (MU_EARTH_KM3_S2 / (a * a * a)).sqrt()
}

/// Circular orbit with epoch `t0()`, RAAN and argument of perigee zero, crossing the +X
/// ascending node `node_at` seconds after `t0()`.
pub fn circular(norad_id: NoradId, name: &str, a: f64, inclination: f64, node_at: f64) -> OrbitalElementSet {
    let m0 = (-mean_motion_rad_s(a) * node_at).to_degrees().rem_euclid(360.0);
    OrbitalElementSet::new(
        norad_id,
        name,
        OrbitShape::SemiMajorAxis(a),
        0.0,
        inclination,
        0.0,
        0.0,
        m0,
        t0(),
    )
}

/// Two payloads on intersecting tracks converging to 0.5 km two hours after `t0()`.
pub fn converging_pair() -> Vec<OrbitalElementSet> {
    vec![
        circular(1001, "ALPHA", 7_000.0, 51.6, 7_200.0),
        circular(1002, "BRAVO", 7_000.5, 97.0, 7_200.0),
    ]
}

/// Two coplanar payloads whose shells are 500 km apart.
pub fn separated_pair() -> Vec<OrbitalElementSet> {
    vec![
        circular(2001, "LOWER", 7_000.0, 51.6, 0.0),
        circular(2002, "UPPER", 7_500.0, 51.6, 0.0),
    ]
}

/// A payload whose elements are ten years old, far from every other fixture.
pub fn stale_object() -> OrbitalElementSet {
    let mut set = circular(3001, "OLD TIMER", 8_200.0, 30.0, 0.0);
    set.epoch = Epoch::from_gregorian_utc_at_midnight(2014, 1, 1);
    set
}

/// A record with an eccentricity outside `[0, 1)`.
pub fn invalid_object() -> OrbitalElementSet {
    let mut set = circular(4001, "BROKEN", 7_200.0, 45.0, 0.0);
    set.eccentricity = 1.2;
    set
}

pub fn debris(norad_id: NoradId, a: f64, inclination: f64, node_at: f64) -> OrbitalElementSet {
    circular(norad_id, "COSMOS 2251 DEB", a, inclination, node_at).with_class(ObjectClass::Debris)
}

pub fn quiet_weather() -> SpaceWeatherContext {
    SpaceWeatherContext::new(SpaceWeatherSnapshot::from_indices(150.0, 2.0, t0()))
}

pub fn engine() -> AssessmentEngine {
    AssessmentEngine::new(EngineConfig::default()).unwrap()
}

pub fn assert_orbital_sane(orbital: &OrbitalPayload) {
    assert!(orbital.altitude > 0.0);
    assert!(orbital.period_minutes > 0.0);
    assert!(orbital.footprint_radius_km > 0.0);
    assert_relative_eq!(orbital.velocity_ms, orbital.velocity_kmh / 3.6, epsilon = 1e-6);
    assert!(orbital.perigee_km <= orbital.apogee_km + 1e-9);
}
