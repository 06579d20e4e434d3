//! # Fleet analytics
//!
//! Single-threaded reduction of one cycle's states, assessments and events into fleet-wide
//! figures.
//!
//! ## Reductions
//!
//! - Counts are exact tallies over the cycle outputs.
//! - `collision_probability_24h = 1 − Π(1 − p_i)` over the events whose threshold window opens
//!   within the aggregate window, folded in pair order. It is `0` without events and never
//!   decreases when an event is added.
//! - `tracking_coverage` is the fraction of the catalog with a non-stale state; rejected and
//!   stale objects count in the denominator only.
//! - `confidence_level` is the catalog mean of `exp(−epoch_age / confidence_decay_days)`, with
//!   rejected objects contributing zero.
//! - Critical windows are the HIGH and CRITICAL events sorted by window start, ties broken by
//!   higher combined risk then by pair. High-risk pairs are the same events sorted by combined
//!   risk, highest first. Both lists are sorted before truncation.
//!
//! See also
//! ------------
//! * [`crate::risk::ConjunctionRiskAssessor`] – producer of the assessments and events.
//! * [`crate::snapshot`] – wire payloads built from [`FleetAnalytics`].
use std::cmp::Ordering::{Equal, Greater};
use std::collections::{BTreeSet, HashMap};

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ObjectClass, OrbitalElementSet},
    constants::{Hours, Kilometer, SECONDS_PER_HOUR},
    orbitrisk_errors::OrbitRiskError,
    propagation::KinematicState,
    risk::{
        probability::at_least_one, ConjunctionEvent, RiskAssessment, RiskLevel, RiskThresholds,
    },
    space_weather::SpaceWeatherSnapshot,
    time::offset_seconds,
};

/// Configuration of the fleet reductions.
///
/// Defaults
/// -----------------
/// * `confidence_decay_days`: 7 days
/// * `decay_perigee_km`: 350 km, scaled by the drag multiplier
/// * `aggregate_window_hours`: 24 h
/// * `critical_windows_limit`: 10
/// * `high_risk_pairs_limit`: 10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsParams {
    pub confidence_decay_days: f64,
    pub decay_perigee_km: Kilometer,
    pub aggregate_window_hours: Hours,
    pub critical_windows_limit: usize,
    pub high_risk_pairs_limit: usize,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            confidence_decay_days: 7.0,
            decay_perigee_km: 350.0,
            aggregate_window_hours: 24.0,
            critical_windows_limit: 10,
            high_risk_pairs_limit: 10,
        }
    }
}

impl AnalyticsParams {
    pub fn builder() -> AnalyticsParamsBuilder {
        AnalyticsParamsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        let gt0 = |x: f64| x.partial_cmp(&0.0) == Some(Greater);
        if !gt0(self.confidence_decay_days) {
            return Err(OrbitRiskError::InvalidConfig(
                "confidence_decay_days must be > 0".into(),
            ));
        }
        if !gt0(self.decay_perigee_km) {
            return Err(OrbitRiskError::InvalidConfig(
                "decay_perigee_km must be > 0".into(),
            ));
        }
        if !gt0(self.aggregate_window_hours) {
            return Err(OrbitRiskError::InvalidConfig(
                "aggregate_window_hours must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`AnalyticsParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsParamsBuilder {
    params: AnalyticsParams,
}

impl AnalyticsParamsBuilder {
    pub fn confidence_decay_days(mut self, v: f64) -> Self {
        self.params.confidence_decay_days = v;
        self
    }
    pub fn decay_perigee_km(mut self, v: f64) -> Self {
        self.params.decay_perigee_km = v;
        self
    }
    pub fn aggregate_window_hours(mut self, v: f64) -> Self {
        self.params.aggregate_window_hours = v;
        self
    }
    pub fn critical_windows_limit(mut self, v: usize) -> Self {
        self.params.critical_windows_limit = v;
        self
    }
    pub fn high_risk_pairs_limit(mut self, v: usize) -> Self {
        self.params.high_risk_pairs_limit = v;
        self
    }

    pub fn build(self) -> Result<AnalyticsParams, OrbitRiskError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Outputs of one cycle, borrowed by the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct CycleOutputs<'a> {
    /// The full input catalog, rejected records included.
    pub catalog: &'a [OrbitalElementSet],
    /// States of the accepted records, sorted by catalog number.
    pub states: &'a [KinematicState],
    pub assessments: &'a [RiskAssessment],
    /// Events sorted by pair.
    pub events: &'a [ConjunctionEvent],
    pub weather: &'a SpaceWeatherSnapshot,
    pub evaluated_at: Epoch,
}

/// Fleet-wide figures of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetAnalytics {
    pub total_objects: usize,
    /// Non-stale payloads.
    pub active_objects: usize,
    /// Objects with a non-stale state.
    pub tracked_objects: usize,
    pub high_risk_objects: usize,
    /// CRITICAL events.
    pub collision_alerts: usize,
    /// HIGH and CRITICAL events.
    pub high_risk_events: usize,
    /// Probability in `[0, 1]` that at least one event of the aggregate window occurs.
    pub collision_probability_24h: f64,
    pub risk_assessment: RiskLevel,
    pub orbital_decay_predictions: usize,
    pub space_weather_impact_score: f64,
    pub space_weather_kp: f64,
    /// Fraction in `[0, 1]`.
    pub tracking_coverage: f64,
    /// Fraction in `[0, 1]`.
    pub confidence_level: f64,
    /// Distinct data sources, sorted.
    pub data_sources: Vec<String>,
    pub critical_windows: Vec<ConjunctionEvent>,
    pub high_risk_pairs: Vec<ConjunctionEvent>,
    pub computed_at: Epoch,
}

impl FleetAnalytics {
    pub fn data_sources_active(&self) -> usize {
        self.data_sources.len()
    }
}

/// Reducer of cycle outputs into [`FleetAnalytics`].
#[derive(Debug, Clone, Default)]
pub struct FleetAnalyticsAggregator {
    params: AnalyticsParams,
    thresholds: RiskThresholds,
}

impl FleetAnalyticsAggregator {
    /// Arguments
    /// -----------------
    /// * `params`: reduction settings.
    /// * `thresholds`: tiers used to classify the aggregate probability.
    pub fn new(params: AnalyticsParams, thresholds: RiskThresholds) -> Self {
        Self { params, thresholds }
    }

    pub fn params(&self) -> &AnalyticsParams {
        &self.params
    }

    /// Reduce one cycle.
    pub fn aggregate(&self, cycle: CycleOutputs<'_>) -> FleetAnalytics {
        let total_objects = cycle.catalog.len();
        let fresh = || cycle.states.iter().filter(|s| !s.stale);

        let classes: HashMap<_, _> = cycle
            .catalog
            .iter()
            .map(|set| (set.norad_id, set.class()))
            .collect();
        let tracked_objects = fresh().count();
        let active_objects = fresh()
            .filter(|s| classes.get(&s.norad_id) == Some(&ObjectClass::Payload))
            .count();

        let collision_probability_24h = aggregate_probability(
            cycle.events,
            &cycle.evaluated_at,
            self.params.aggregate_window_hours,
        );

        let decay_limit = self.params.decay_perigee_km * cycle.weather.atmospheric_drag_factor;
        let orbital_decay_predictions = cycle
            .states
            .iter()
            .filter(|s| s.perigee_altitude < decay_limit)
            .count();

        let confidence_level = if total_objects == 0 {
            0.0
        } else {
            cycle
                .states
                .iter()
                .map(|s| (-s.epoch_age_days / self.params.confidence_decay_days).exp())
                .sum::<f64>()
                / total_objects as f64
        };

        let data_sources: Vec<String> = cycle
            .catalog
            .iter()
            .map(|set| set.data_source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        FleetAnalytics {
            total_objects,
            active_objects,
            tracked_objects,
            high_risk_objects: cycle
                .assessments
                .iter()
                .filter(|a| a.risk_level.is_high_risk())
                .count(),
            collision_alerts: cycle
                .events
                .iter()
                .filter(|e| e.risk_level == RiskLevel::Critical)
                .count(),
            high_risk_events: cycle
                .events
                .iter()
                .filter(|e| e.risk_level.is_high_risk())
                .count(),
            collision_probability_24h,
            risk_assessment: self.thresholds.classify(100.0 * collision_probability_24h),
            orbital_decay_predictions,
            space_weather_impact_score: cycle.weather.impact_score(),
            space_weather_kp: cycle.weather.indices.geomagnetic_kp,
            tracking_coverage: if total_objects == 0 {
                0.0
            } else {
                tracked_objects as f64 / total_objects as f64
            },
            confidence_level,
            data_sources,
            critical_windows: critical_windows(cycle.events, self.params.critical_windows_limit),
            high_risk_pairs: high_risk_pairs(cycle.events, self.params.high_risk_pairs_limit),
            computed_at: cycle.evaluated_at,
        }
    }
}

/// Probability that at least one event opening within `window_hours` of `from` occurs.
///
/// `events` must be sorted by pair for the result to be reproducible.
pub fn aggregate_probability(events: &[ConjunctionEvent], from: &Epoch, window_hours: Hours) -> f64 {
    let limit = offset_seconds(from, window_hours * SECONDS_PER_HOUR);
    at_least_one(
        events
            .iter()
            .filter(|e| e.window.start <= limit)
            .map(|e| e.probability),
    )
}

/// HIGH and CRITICAL events by window start, ties broken by higher combined risk then by pair.
pub fn critical_windows(events: &[ConjunctionEvent], limit: usize) -> Vec<ConjunctionEvent> {
    let mut windows: Vec<ConjunctionEvent> = events
        .iter()
        .filter(|e| e.risk_level.is_high_risk())
        .copied()
        .collect();
    windows.sort_by(|x, y| {
        x.window
            .start
            .partial_cmp(&y.window.start)
            .unwrap_or(Equal)
            .then(y.combined_risk.total_cmp(&x.combined_risk))
            .then((x.norad_a, x.norad_b).cmp(&(y.norad_a, y.norad_b)))
    });
    windows.truncate(limit);
    windows
}

/// HIGH and CRITICAL events by combined risk, highest first, ties broken by pair.
pub fn high_risk_pairs(events: &[ConjunctionEvent], limit: usize) -> Vec<ConjunctionEvent> {
    let mut pairs: Vec<ConjunctionEvent> = events
        .iter()
        .filter(|e| e.risk_level.is_high_risk())
        .copied()
        .collect();
    pairs.sort_by(|x, y| {
        y.combined_risk
            .total_cmp(&x.combined_risk)
            .then((x.norad_a, x.norad_b).cmp(&(y.norad_a, y.norad_b)))
    });
    pairs.truncate(limit);
    pairs
}

#[cfg(test)]
mod analytics_test {
    use super::*;
    use crate::risk::TimeWindow;

    fn t0() -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)
    }

    fn event(a: u32, b: u32, p: f64, risk: f64, level: RiskLevel, start: f64) -> ConjunctionEvent {
        ConjunctionEvent {
            norad_a: a,
            norad_b: b,
            probability: p,
            combined_risk: risk,
            risk_level: level,
            closest_approach_km: 1.0,
            relative_speed_kms: 10.0,
            tca: Some(offset_seconds(&t0(), start + 30.0)),
            window: TimeWindow {
                start: offset_seconds(&t0(), start),
                end: offset_seconds(&t0(), start + 60.0),
            },
        }
    }

    #[test]
    fn test_aggregate_probability() {
        assert_eq!(aggregate_probability(&[], &t0(), 24.0), 0.0);

        let one = [event(1, 2, 0.2, 0.1, RiskLevel::Critical, 100.0)];
        let two = [
            one[0],
            event(3, 4, 0.1, 0.05, RiskLevel::Critical, 200.0),
        ];
        let p1 = aggregate_probability(&one, &t0(), 24.0);
        let p2 = aggregate_probability(&two, &t0(), 24.0);
        assert!((p1 - 0.2).abs() < 1e-12);
        assert!((p2 - 0.28).abs() < 1e-12);

        // an event opening after the window is ignored
        let late = [one[0], event(3, 4, 0.5, 0.3, RiskLevel::Critical, 30.0 * 3_600.0)];
        assert!((aggregate_probability(&late, &t0(), 24.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_critical_windows_order() {
        let events = [
            event(1, 2, 0.2, 0.1, RiskLevel::Critical, 500.0),
            event(1, 3, 0.02, 0.01, RiskLevel::High, 100.0),
            event(2, 3, 0.3, 0.2, RiskLevel::Critical, 100.0),
            event(3, 4, 0.001, 0.001, RiskLevel::Medium, 50.0),
        ];
        let windows = critical_windows(&events, 10);
        let pairs: Vec<_> = windows.iter().map(|e| (e.norad_a, e.norad_b)).collect();
        assert_eq!(pairs, vec![(2, 3), (1, 3), (1, 2)]);

        assert_eq!(critical_windows(&events, 1).len(), 1);

        let ranked: Vec<_> = high_risk_pairs(&events, 10)
            .iter()
            .map(|e| (e.norad_a, e.norad_b))
            .collect();
        assert_eq!(ranked, vec![(2, 3), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_params_builder() {
        assert!(AnalyticsParams::builder().build().is_ok());
        assert!(AnalyticsParams::builder()
            .confidence_decay_days(0.0)
            .build()
            .is_err());
        let params: AnalyticsParams =
            serde_json::from_str(r#"{"critical_windows_limit": 3}"#).unwrap();
        assert_eq!(params.critical_windows_limit, 3);
        assert_eq!(params.decay_perigee_km, 350.0);
    }
}
