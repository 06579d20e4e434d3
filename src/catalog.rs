//! # Orbital element catalog
//!
//! Canonical per-object orbital parameters as handed over by the ingestion layer, and the
//! checks that decide whether a record can be propagated.
//!
//! ## Overview
//!
//! - [`ObjectClass`]: closed classification of tracked objects (`PAYLOAD`, `ROCKET_BODY`,
//!   `DEBRIS`, `UNKNOWN`), with the weights used by the risk model.
//! - [`OrbitalElementSet`]: identity, data source, classical elements (degrees) and epoch.
//! - [`check_batch`]: batch-level structural validation (empty input, duplicate ids).
//!
//! Angles are supplied in **degrees** (the unit used by element feeds) and converted to radians
//! by [`OrbitalElementSet::to_keplerian`], which is also where record-level validation happens.
use std::fmt;

use hifitime::Epoch;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, NoradId, EARTH_RADIUS_KM, RADEG},
    orbit_type::{keplerian_element::KeplerianElements, OrbitShape},
    orbitrisk_errors::OrbitRiskError,
};

/// Data source attached to records that do not name one.
pub const DEFAULT_DATA_SOURCE: &str = "Orbital Mechanics";

/// Classification of a tracked object.
///
/// The ordering is only used to key deterministic breakdown maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectClass {
    Payload,
    RocketBody,
    Debris,
    Unknown,
}

impl ObjectClass {
    /// Every class, in declaration order.
    pub const ALL: [ObjectClass; 4] = [
        ObjectClass::Payload,
        ObjectClass::RocketBody,
        ObjectClass::Debris,
        ObjectClass::Unknown,
    ];

    /// Derive a class from catalog naming conventions.
    ///
    /// Debris markers are checked first, then rocket-body markers, then explicit payload
    /// markers. Remaining names are payloads unless they are flagged as unidentified.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: catalog name, case-insensitive (e.g. `"COSMOS 2251 DEB"`, `"SL-16 R/B"`).
    ///
    /// Return
    /// ----------
    /// * The inferred [`ObjectClass`].
    pub fn classify_name(name: &str) -> Self {
        let upper = name.to_uppercase();
        let has_any = |patterns: &[&str]| patterns.iter().any(|p| upper.contains(p));

        if has_any(&["DEB", "DEBRIS", "FRAGMENT", "FRAG"]) {
            ObjectClass::Debris
        } else if has_any(&["R/B", "ROCKET BODY", "STAGE", "CENTAUR"]) {
            ObjectClass::RocketBody
        } else if has_any(&["PAYLOAD", "SAT", "SATELLITE"]) {
            ObjectClass::Payload
        } else if has_any(&["UNKNOWN", "TBD"]) {
            ObjectClass::Unknown
        } else {
            ObjectClass::Payload
        }
    }

    /// Effective cross-section multiplier applied to pair probabilities.
    pub fn cross_section_multiplier(&self) -> f64 {
        match self {
            ObjectClass::Debris => 1.5,
            ObjectClass::RocketBody => 1.2,
            ObjectClass::Payload | ObjectClass::Unknown => 1.0,
        }
    }

    /// Weight of one neighbour of this class in the debris-environment density.
    pub fn density_weight(&self) -> f64 {
        match self {
            ObjectClass::Debris => 3.0,
            ObjectClass::RocketBody => 2.0,
            ObjectClass::Payload | ObjectClass::Unknown => 1.0,
        }
    }

    /// Wire name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Payload => "PAYLOAD",
            ObjectClass::RocketBody => "ROCKET_BODY",
            ObjectClass::Debris => "DEBRIS",
            ObjectClass::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical orbital parameters of one tracked object.
///
/// Fields
/// -----------------
/// * `norad_id`: catalog number, unique within a batch.
/// * `name`: catalog name.
/// * `object_class`: class given by the feed, or `None` to infer it from `name`.
/// * `data_source`: provider label, counted by the dashboard metrics.
/// * `shape`: semi-major axis or mean motion.
/// * `eccentricity`: unitless, `[0, 1)`.
/// * `inclination`, `ascending_node`, `arg_perigee`, `mean_anomaly`: degrees.
/// * `epoch`: epoch of the elements.
///
/// See also
/// ------------
/// * [`OrbitalElementSet::to_keplerian`] – validation and conversion to radians.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElementSet {
    pub norad_id: NoradId,
    pub name: String,
    pub object_class: Option<ObjectClass>,
    pub data_source: String,
    pub shape: OrbitShape,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub ascending_node: Degree,
    pub arg_perigee: Degree,
    pub mean_anomaly: Degree,
    pub epoch: Epoch,
}

impl OrbitalElementSet {
    /// Build an element set with an inferred class and the default data source.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        norad_id: NoradId,
        name: impl Into<String>,
        shape: OrbitShape,
        eccentricity: f64,
        inclination: Degree,
        ascending_node: Degree,
        arg_perigee: Degree,
        mean_anomaly: Degree,
        epoch: Epoch,
    ) -> Self {
        Self {
            norad_id,
            name: name.into(),
            object_class: None,
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            shape,
            eccentricity,
            inclination,
            ascending_node,
            arg_perigee,
            mean_anomaly,
            epoch,
        }
    }

    /// Set an explicit object class, overriding name-based inference.
    pub fn with_class(mut self, class: ObjectClass) -> Self {
        self.object_class = Some(class);
        self
    }

    /// Set the provider label.
    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = source.into();
        self
    }

    /// Class of the object: the explicit one, else [`ObjectClass::classify_name`].
    pub fn class(&self) -> ObjectClass {
        self.object_class
            .unwrap_or_else(|| ObjectClass::classify_name(&self.name))
    }

    /// Validate the record and convert it to Keplerian elements in kilometers and radians.
    ///
    /// Arguments
    /// -----------------
    /// * `mu`: gravitational parameter of the central body (km³/s²).
    ///
    /// Return
    /// ----------
    /// * The [`KeplerianElements`] of the record, or [`OrbitRiskError::InvalidElements`] when a
    ///   value is non-finite, the eccentricity leaves `[0, 1)`, the inclination leaves
    ///   `[0°, 180°]`, the size parameter is not positive, or the perigee lies inside the Earth.
    pub fn to_keplerian(&self, mu: f64) -> Result<KeplerianElements, OrbitRiskError> {
        let invalid = |reason: String| OrbitRiskError::InvalidElements {
            norad_id: self.norad_id,
            reason,
        };

        let angles = [
            self.inclination,
            self.ascending_node,
            self.arg_perigee,
            self.mean_anomaly,
        ];
        if !self.eccentricity.is_finite()
            || !self.shape.raw_value().is_finite()
            || angles.iter().any(|a| !a.is_finite())
        {
            return Err(invalid("non-finite element value".into()));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(invalid(format!(
                "eccentricity {} outside [0, 1)",
                self.eccentricity
            )));
        }
        if !(0.0..=180.0).contains(&self.inclination) {
            return Err(invalid(format!(
                "inclination {}° outside [0°, 180°]",
                self.inclination
            )));
        }
        if self.shape.raw_value() <= 0.0 {
            return Err(invalid(format!(
                "non-positive size parameter {:?}",
                self.shape
            )));
        }

        let semi_major_axis = self.shape.semi_major_axis(mu);
        if !semi_major_axis.is_finite() || semi_major_axis <= 0.0 {
            return Err(invalid(format!("semi-major axis {semi_major_axis} km")));
        }

        let perigee = semi_major_axis * (1.0 - self.eccentricity);
        if perigee <= EARTH_RADIUS_KM {
            return Err(invalid(format!(
                "perigee radius {perigee:.3} km below the Earth surface"
            )));
        }

        Ok(KeplerianElements {
            semi_major_axis,
            eccentricity: self.eccentricity,
            inclination: self.inclination * RADEG,
            ascending_node_longitude: self.ascending_node * RADEG,
            periapsis_argument: self.arg_perigee * RADEG,
            mean_anomaly: self.mean_anomaly * RADEG,
        })
    }
}

/// Structural validation of a whole input batch.
///
/// Return
/// ----------
/// * [`OrbitRiskError::EmptyCatalog`] for an empty batch, [`OrbitRiskError::MalformedBatch`]
///   when a catalog number appears twice, `Ok(())` otherwise.
pub fn check_batch(catalog: &[OrbitalElementSet]) -> Result<(), OrbitRiskError> {
    if catalog.is_empty() {
        return Err(OrbitRiskError::EmptyCatalog);
    }
    match catalog.iter().map(|set| set.norad_id).duplicates().next() {
        Some(norad_id) => Err(OrbitRiskError::MalformedBatch(format!(
            "duplicate catalog number {norad_id}"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use crate::constants::MU_EARTH_KM3_S2;
    use approx::assert_relative_eq;

    fn sample(norad_id: NoradId) -> OrbitalElementSet {
        OrbitalElementSet::new(
            norad_id,
            "ISS (ZARYA)",
            OrbitShape::SemiMajorAxis(6_778.0),
            0.0005,
            51.64,
            120.0,
            80.0,
            10.0,
            Epoch::from_gregorian_utc_at_midnight(2024, 1, 1),
        )
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(
            ObjectClass::classify_name("COSMOS 2251 DEB"),
            ObjectClass::Debris
        );
        assert_eq!(
            ObjectClass::classify_name("SL-16 R/B"),
            ObjectClass::RocketBody
        );
        assert_eq!(
            ObjectClass::classify_name("CENTAUR UPPER"),
            ObjectClass::RocketBody
        );
        assert_eq!(
            ObjectClass::classify_name("starlink-1007"),
            ObjectClass::Payload
        );
        assert_eq!(ObjectClass::classify_name("TBD OBJECT"), ObjectClass::Unknown);
        assert_eq!(ObjectClass::classify_name("HUBBLE"), ObjectClass::Payload);
    }

    #[test]
    fn test_class_wire_names() {
        let json = serde_json::to_string(&ObjectClass::RocketBody).unwrap();
        assert_eq!(json, "\"ROCKET_BODY\"");
        assert_eq!(ObjectClass::Debris.to_string(), "DEBRIS");
    }

    #[test]
    fn test_explicit_class_overrides_name() {
        let set = sample(1).with_class(ObjectClass::Debris);
        assert_eq!(set.class(), ObjectClass::Debris);
        assert_eq!(sample(1).class(), ObjectClass::Payload);
    }

    #[test]
    fn test_to_keplerian_converts_degrees() {
        let kep = sample(1).to_keplerian(MU_EARTH_KM3_S2).unwrap();
        assert_relative_eq!(kep.inclination, 51.64 * RADEG);
        assert_relative_eq!(kep.semi_major_axis, 6_778.0);
    }

    #[test]
    fn test_invalid_elements_are_rejected() {
        let mut set = sample(7);
        set.eccentricity = 1.0;
        assert!(matches!(
            set.to_keplerian(MU_EARTH_KM3_S2),
            Err(OrbitRiskError::InvalidElements { norad_id: 7, .. })
        ));

        let mut set = sample(7);
        set.inclination = 180.5;
        assert!(set.to_keplerian(MU_EARTH_KM3_S2).is_err());

        let mut set = sample(7);
        set.inclination = 180.0;
        assert!(set.to_keplerian(MU_EARTH_KM3_S2).is_ok());

        let mut set = sample(7);
        set.shape = OrbitShape::SemiMajorAxis(6_000.0);
        assert!(set.to_keplerian(MU_EARTH_KM3_S2).is_err());

        let mut set = sample(7);
        set.mean_anomaly = f64::NAN;
        assert!(set.to_keplerian(MU_EARTH_KM3_S2).is_err());

        let mut set = sample(7);
        set.shape = OrbitShape::MeanMotion(-1.0);
        assert!(set.to_keplerian(MU_EARTH_KM3_S2).is_err());
    }

    #[test]
    fn test_check_batch() {
        assert_eq!(check_batch(&[]), Err(OrbitRiskError::EmptyCatalog));
        assert!(check_batch(&[sample(1), sample(2)]).is_ok());
        assert!(matches!(
            check_batch(&[sample(1), sample(1)]),
            Err(OrbitRiskError::MalformedBatch(_))
        ));
    }
}
