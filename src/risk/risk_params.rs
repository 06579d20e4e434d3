use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{Kilometer, KmPerSec, Percent},
    orbitrisk_errors::OrbitRiskError,
};

/// Discrete risk tier, strictly ordered `LOW < MEDIUM < HIGH < CRITICAL`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// HIGH or CRITICAL.
    pub fn is_high_risk(&self) -> bool {
        *self >= RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds (percent, inclusive) of the MEDIUM, HIGH and CRITICAL tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: Percent,
    pub high: Percent,
    pub critical: Percent,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.1,
            high: 1.0,
            critical: 10.0,
        }
    }
}

impl RiskThresholds {
    /// Tier of a probability expressed in percent.
    ///
    /// Each tier includes its lower bound, so exactly one tier applies to any value; NaN maps to
    /// [`RiskLevel::Low`].
    pub fn classify(&self, probability: Percent) -> RiskLevel {
        if probability >= self.critical {
            RiskLevel::Critical
        } else if probability >= self.high {
            RiskLevel::High
        } else if probability >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        let ordered = matches!(self.medium.partial_cmp(&0.0), Some(Greater | Equal))
            && self.medium < self.high
            && self.high < self.critical
            && self.critical <= 100.0;
        if !ordered {
            return Err(OrbitRiskError::InvalidConfig(format!(
                "risk thresholds must satisfy 0 <= medium < high < critical <= 100, got {} / {} / {}",
                self.medium, self.high, self.critical
            )));
        }
        Ok(())
    }
}

/// Configuration of the conjunction risk model.
///
/// Defaults
/// -----------------
/// * `decay_length_km`: 5 km, distance scale of `p0 = exp(−d / L)`
/// * `reference_speed_kms`: 1 km/s, speed at which urgency reaches one half
/// * `urgency_weight`: 0.5
/// * `density_radius_km`: 500 km
/// * `density_half_saturation`: 10 weighted neighbours for a score of 50
/// * `thresholds`: [`RiskThresholds::default`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub decay_length_km: Kilometer,
    pub reference_speed_kms: KmPerSec,
    pub urgency_weight: f64,
    pub density_radius_km: Kilometer,
    pub density_half_saturation: f64,
    pub thresholds: RiskThresholds,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            decay_length_km: 5.0,
            reference_speed_kms: 1.0,
            urgency_weight: 0.5,
            density_radius_km: 500.0,
            density_half_saturation: 10.0,
            thresholds: RiskThresholds::default(),
        }
    }
}

impl RiskParams {
    pub fn builder() -> RiskParamsBuilder {
        RiskParamsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        let gt0 = |x: f64| x.partial_cmp(&0.0) == Some(Greater);
        let ge0 = |x: f64| matches!(x.partial_cmp(&0.0), Some(Greater | Equal));
        if !gt0(self.decay_length_km) {
            return Err(OrbitRiskError::InvalidConfig(
                "decay_length_km must be > 0".into(),
            ));
        }
        if !gt0(self.reference_speed_kms) {
            return Err(OrbitRiskError::InvalidConfig(
                "reference_speed_kms must be > 0".into(),
            ));
        }
        if !ge0(self.urgency_weight) {
            return Err(OrbitRiskError::InvalidConfig(
                "urgency_weight must be >= 0".into(),
            ));
        }
        if !gt0(self.density_radius_km) || !gt0(self.density_half_saturation) {
            return Err(OrbitRiskError::InvalidConfig(
                "density_radius_km and density_half_saturation must be > 0".into(),
            ));
        }
        self.thresholds.validate()
    }
}

/// Builder for [`RiskParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct RiskParamsBuilder {
    params: RiskParams,
}

impl RiskParamsBuilder {
    pub fn decay_length_km(mut self, v: f64) -> Self {
        self.params.decay_length_km = v;
        self
    }
    pub fn reference_speed_kms(mut self, v: f64) -> Self {
        self.params.reference_speed_kms = v;
        self
    }
    pub fn urgency_weight(mut self, v: f64) -> Self {
        self.params.urgency_weight = v;
        self
    }
    pub fn density_radius_km(mut self, v: f64) -> Self {
        self.params.density_radius_km = v;
        self
    }
    pub fn density_half_saturation(mut self, v: f64) -> Self {
        self.params.density_half_saturation = v;
        self
    }
    pub fn thresholds(mut self, v: RiskThresholds) -> Self {
        self.params.thresholds = v;
        self
    }

    pub fn build(self) -> Result<RiskParams, OrbitRiskError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

#[cfg(test)]
mod risk_params_test {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(RiskLevel::Critical.is_high_risk());
        assert!(!RiskLevel::Medium.is_high_risk());
        assert_eq!(
            serde_json::to_string(&RiskLevel::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn test_classification_boundaries_are_closed_below() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(0.0), RiskLevel::Low);
        assert_eq!(t.classify(0.099_999), RiskLevel::Low);
        assert_eq!(t.classify(0.1), RiskLevel::Medium);
        assert_eq!(t.classify(1.0), RiskLevel::High);
        assert_eq!(t.classify(9.999), RiskLevel::High);
        assert_eq!(t.classify(10.0), RiskLevel::Critical);
        assert_eq!(t.classify(100.0), RiskLevel::Critical);
        assert_eq!(t.classify(f64::NAN), RiskLevel::Low);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RiskThresholds {
            medium: 5.0,
            high: 20.0,
            critical: 50.0,
        };
        assert!(t.validate().is_ok());
        assert_eq!(t.classify(10.0), RiskLevel::Medium);
        assert_eq!(t.classify(50.0), RiskLevel::Critical);
    }

    #[test]
    fn test_invalid_params() {
        let bad = RiskThresholds {
            medium: 1.0,
            high: 1.0,
            critical: 10.0,
        };
        assert!(RiskParams::builder().thresholds(bad).build().is_err());
        assert!(RiskParams::builder().decay_length_km(0.0).build().is_err());
        assert!(RiskParams::builder().build().is_ok());
    }
}
