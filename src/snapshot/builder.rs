use std::collections::BTreeMap;

use hifitime::Epoch;

use crate::{
    analytics::FleetAnalytics,
    catalog::{ObjectClass, OrbitalElementSet},
    constants::{NoradId, KMS_TO_KMH, KMS_TO_MS},
    propagation::KinematicState,
    risk::{ConjunctionEvent, RiskAssessment},
    snapshot::payloads::{
        CollisionPrediction, CriticalWindowPayload, DashboardMetrics, DashboardSummary,
        HighRiskPairPayload, ObjectRecord, ObjectRef, OrbitalPayload, PairPrediction,
        PredictiveAnalytics, RiskPayload, TypeSummary, WeatherPayload,
    },
    space_weather::SpaceWeatherSnapshot,
    time::to_iso8601,
};

/// Horizon label of the collision prediction.
pub const PREDICTION_HORIZON: &str = "24_hours";

/// Blocks to include in listed records, and how many records to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub include_orbital: bool,
    pub include_weather: bool,
    pub include_risk: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: None,
            include_orbital: true,
            include_weather: false,
            include_risk: true,
        }
    }
}

impl ListQuery {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
    pub fn include_orbital(mut self, v: bool) -> Self {
        self.include_orbital = v;
        self
    }
    pub fn include_weather(mut self, v: bool) -> Self {
        self.include_weather = v;
        self
    }
    pub fn include_risk(mut self, v: bool) -> Self {
        self.include_risk = v;
        self
    }
}

/// Pure packaging of cycle outputs into payloads.
///
/// The builder performs unit conversions and timestamp rendering only; every figure comes
/// from the cycle outputs it is handed.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsSnapshotBuilder {
    evaluated_at: Epoch,
}

impl AnalyticsSnapshotBuilder {
    pub fn new(evaluated_at: Epoch) -> Self {
        Self { evaluated_at }
    }

    fn stamp(&self) -> String {
        to_iso8601(&self.evaluated_at)
    }

    pub fn orbital(&self, state: &KinematicState) -> OrbitalPayload {
        OrbitalPayload {
            altitude: state.altitude,
            velocity_kmh: state.speed * KMS_TO_KMH,
            velocity_ms: state.speed * KMS_TO_MS,
            period_minutes: state.period_minutes(),
            apogee_km: state.apogee_altitude,
            perigee_km: state.perigee_altitude,
            inclination: state.inclination,
            eccentricity: state.eccentricity,
            latitude: state.latitude,
            longitude: state.longitude,
            is_sunlit: state.sunlit,
            footprint_radius_km: state.footprint_radius,
            stale: state.stale,
        }
    }

    pub fn weather(&self, weather: &SpaceWeatherSnapshot) -> WeatherPayload {
        WeatherPayload {
            solar_flux_f107: weather.indices.solar_flux_f107,
            geomagnetic_kp: weather.indices.geomagnetic_kp,
            solar_wind_speed: weather.indices.solar_wind_speed,
            magnetic_field_bt: weather.indices.magnetic_field_bt,
            atmospheric_drag_factor: weather.atmospheric_drag_factor,
            valid_at: to_iso8601(&weather.valid_at),
        }
    }

    pub fn risk(&self, assessment: &RiskAssessment) -> RiskPayload {
        RiskPayload {
            collision_risk_level: assessment.risk_level,
            collision_probability: assessment.collision_probability,
            nearby_objects_count: assessment.nearby_objects_count,
            closest_approach_km: assessment.closest_approach_km,
            debris_environment_score: assessment.debris_environment_score,
            time_to_closest_approach_hours: assessment.time_to_closest_approach_hours,
        }
    }

    /// One object record with the blocks requested by `query`.
    pub fn object_record(
        &self,
        set: &OrbitalElementSet,
        state: Option<&KinematicState>,
        assessment: Option<&RiskAssessment>,
        weather: &SpaceWeatherSnapshot,
        query: &ListQuery,
    ) -> ObjectRecord {
        ObjectRecord {
            norad_id: set.norad_id,
            name: set.name.clone(),
            object_type: set.class(),
            data_source: set.data_source.clone(),
            epoch: to_iso8601(&set.epoch),
            orbital: state
                .filter(|_| query.include_orbital)
                .map(|s| self.orbital(s)),
            space_weather: query.include_weather.then(|| self.weather(weather)),
            risk: assessment
                .filter(|_| query.include_risk)
                .map(|a| self.risk(a)),
            last_updated: self.stamp(),
        }
    }

    pub fn dashboard_metrics(&self, analytics: &FleetAnalytics) -> DashboardMetrics {
        DashboardMetrics {
            total_satellites: analytics.total_objects,
            active_satellites: analytics.active_objects,
            high_risk_objects: analytics.high_risk_objects,
            collision_alerts: analytics.collision_alerts,
            space_weather_kp: analytics.space_weather_kp,
            data_sources_active: analytics.data_sources_active(),
            data_sources_list: analytics.data_sources.clone(),
            tracking_coverage: analytics.tracking_coverage,
            last_updated: to_iso8601(&analytics.computed_at),
            status: "active".into(),
        }
    }

    pub fn predictive_analytics(&self, analytics: &FleetAnalytics) -> PredictiveAnalytics {
        PredictiveAnalytics {
            collision_probability_24h: analytics.collision_probability_24h,
            high_risk_events: analytics.high_risk_events,
            orbital_decay_predictions: analytics.orbital_decay_predictions,
            space_weather_impact_score: analytics.space_weather_impact_score,
            active_tracking_satellites: analytics.tracked_objects,
            last_calculated: to_iso8601(&analytics.computed_at),
        }
    }

    /// Collision prediction block; `refs` resolves a catalog number to its name.
    pub fn collision_prediction<F>(&self, analytics: &FleetAnalytics, refs: F) -> CollisionPrediction
    where
        F: Fn(NoradId) -> ObjectRef,
    {
        CollisionPrediction {
            probability_score: analytics.collision_probability_24h,
            high_risk_pairs: analytics
                .high_risk_pairs
                .iter()
                .map(|e| HighRiskPairPayload {
                    satellite1: refs(e.norad_a),
                    satellite2: refs(e.norad_b),
                    combined_risk: e.combined_risk,
                    probability: e.probability,
                    closest_approach_km: e.closest_approach_km,
                })
                .collect(),
            critical_time_windows: analytics
                .critical_windows
                .iter()
                .map(|e| CriticalWindowPayload {
                    satellite1: refs(e.norad_a),
                    satellite2: refs(e.norad_b),
                    time_window_start: to_iso8601(&e.window.start),
                    time_window_end: to_iso8601(&e.window.end),
                    time_of_closest_approach: e.tca.as_ref().map(to_iso8601),
                    risk_level: e.risk_level,
                    probability: e.probability,
                })
                .collect(),
            risk_assessment: analytics.risk_assessment,
            confidence_level: analytics.confidence_level,
            prediction_horizon: PREDICTION_HORIZON.into(),
        }
    }

    pub fn summary<F>(&self, analytics: &FleetAnalytics, refs: F) -> DashboardSummary
    where
        F: Fn(NoradId) -> ObjectRef,
    {
        DashboardSummary {
            system_metrics: self.dashboard_metrics(analytics),
            predictive_analytics: self.predictive_analytics(analytics),
            collision_prediction: self.collision_prediction(analytics, refs),
        }
    }

    /// Count of objects per class, classes absent from the catalog omitted.
    pub fn type_summary<I>(&self, classes: I) -> TypeSummary
    where
        I: IntoIterator<Item = ObjectClass>,
    {
        let mut type_breakdown: BTreeMap<ObjectClass, usize> = BTreeMap::new();
        for class in classes {
            *type_breakdown.entry(class).or_default() += 1;
        }
        TypeSummary {
            total_satellites: type_breakdown.values().sum(),
            type_breakdown,
            timestamp: self.stamp(),
        }
    }

    /// Pair prediction payload from a scored event.
    pub fn pair_prediction<F>(
        &self,
        event: &ConjunctionEvent,
        within_threshold: bool,
        hours_ahead: u32,
        refs: F,
    ) -> PairPrediction
    where
        F: Fn(NoradId) -> ObjectRef,
    {
        let window = within_threshold.then_some(event.window);
        PairPrediction {
            satellite1: refs(event.norad_a),
            satellite2: refs(event.norad_b),
            hours_ahead,
            within_threshold,
            probability: event.probability,
            collision_probability: event.probability_percent(),
            combined_risk: event.combined_risk,
            risk_level: event.risk_level,
            closest_approach_km: event.closest_approach_km,
            relative_speed_kms: event.relative_speed_kms,
            time_to_closest_approach_hours: event.hours_to_tca(&self.evaluated_at),
            time_of_closest_approach: event.tca.as_ref().map(to_iso8601),
            time_window_start: window.map(|w| to_iso8601(&w.start)),
            time_window_end: window.map(|w| to_iso8601(&w.end)),
        }
    }
}
