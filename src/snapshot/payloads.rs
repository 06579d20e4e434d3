//! Wire shapes of the snapshot queries.
//!
//! Every payload is a plain `serde::Serialize` struct rendered by `serde_json`. Timestamps are
//! ISO-8601 strings, risk levels and object classes their upper-case names, and optional
//! blocks are omitted rather than rendered as `null` when the caller did not request them.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    catalog::ObjectClass,
    constants::{Hours, Kilometer, KmPerSec, NoradId, Percent},
    risk::RiskLevel,
};

/// Orbital block of an object record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalPayload {
    pub altitude: Kilometer,
    pub velocity_kmh: f64,
    pub velocity_ms: f64,
    pub period_minutes: f64,
    pub apogee_km: Kilometer,
    pub perigee_km: Kilometer,
    pub inclination: f64,
    pub eccentricity: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub is_sunlit: bool,
    pub footprint_radius_km: Kilometer,
    pub stale: bool,
}

/// Current space-weather block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPayload {
    pub solar_flux_f107: f64,
    pub geomagnetic_kp: f64,
    pub solar_wind_speed: Option<f64>,
    pub magnetic_field_bt: Option<f64>,
    pub atmospheric_drag_factor: f64,
    pub valid_at: String,
}

/// Risk block of an object record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPayload {
    pub collision_risk_level: RiskLevel,
    pub collision_probability: Percent,
    pub nearby_objects_count: usize,
    pub closest_approach_km: Option<Kilometer>,
    pub debris_environment_score: f64,
    pub time_to_closest_approach_hours: Option<Hours>,
}

/// One object as listed by the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRecord {
    pub norad_id: NoradId,
    pub name: String,
    pub object_type: ObjectClass,
    pub data_source: String,
    pub epoch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital: Option<OrbitalPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_weather: Option<WeatherPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskPayload>,
    pub last_updated: String,
}

/// Name and catalog number of one side of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub name: String,
    pub norad_id: NoradId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskPairPayload {
    pub satellite1: ObjectRef,
    pub satellite2: ObjectRef,
    pub combined_risk: f64,
    pub probability: f64,
    pub closest_approach_km: Kilometer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalWindowPayload {
    pub satellite1: ObjectRef,
    pub satellite2: ObjectRef,
    pub time_window_start: String,
    pub time_window_end: String,
    pub time_of_closest_approach: Option<String>,
    pub risk_level: RiskLevel,
    pub probability: f64,
}

/// Fleet counters of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_satellites: usize,
    pub active_satellites: usize,
    pub high_risk_objects: usize,
    pub collision_alerts: usize,
    pub space_weather_kp: f64,
    pub data_sources_active: usize,
    pub data_sources_list: Vec<String>,
    pub tracking_coverage: f64,
    pub last_updated: String,
    pub status: String,
}

/// 24-hour predictive block of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveAnalytics {
    pub collision_probability_24h: f64,
    pub high_risk_events: usize,
    pub orbital_decay_predictions: usize,
    pub space_weather_impact_score: f64,
    pub active_tracking_satellites: usize,
    pub last_calculated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionPrediction {
    pub probability_score: f64,
    pub high_risk_pairs: Vec<HighRiskPairPayload>,
    pub critical_time_windows: Vec<CriticalWindowPayload>,
    pub risk_assessment: RiskLevel,
    pub confidence_level: f64,
    pub prediction_horizon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub system_metrics: DashboardMetrics,
    pub predictive_analytics: PredictiveAnalytics,
    pub collision_prediction: CollisionPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub total_satellites: usize,
    pub type_breakdown: BTreeMap<ObjectClass, usize>,
    pub timestamp: String,
}

/// Result of an on-demand pair prediction.
///
/// The window fields are `None` when the pair never comes within the screening threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPrediction {
    pub satellite1: ObjectRef,
    pub satellite2: ObjectRef,
    pub hours_ahead: u32,
    pub within_threshold: bool,
    pub probability: f64,
    pub collision_probability: Percent,
    pub combined_risk: f64,
    pub risk_level: RiskLevel,
    pub closest_approach_km: Kilometer,
    pub relative_speed_kms: KmPerSec,
    pub time_to_closest_approach_hours: Option<Hours>,
    pub time_of_closest_approach: Option<String>,
    pub time_window_start: Option<String>,
    pub time_window_end: Option<String>,
}
