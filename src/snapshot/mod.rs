//! # Assessment snapshots
//!
//! The immutable result of one assessment cycle, owned by the caller, and the queries served
//! from it.
//!
//! ## Overview
//!
//! An [`AssessmentSnapshot`] keeps every catalog record of the cycle together with its outcome:
//! either a kinematic state and a risk assessment, or the reason it was rejected. Fleet
//! analytics, conjunction events, weather inputs and [`Diagnostic`]s complete it. Nothing in
//! it changes after the cycle; a new cycle produces a new snapshot.
//!
//! Queries go through [`AnalyticsSnapshotBuilder`], which only packages values into the
//! [`payloads`] shapes.
//!
//! ## Queries
//!
//! | Query | Payload |
//! |-------|---------|
//! | [`AssessmentSnapshot::list_objects`] | `Vec<ObjectRecord>`, assessed objects by catalog number |
//! | [`AssessmentSnapshot::get_object`] | [`ObjectRecord`], `UnknownObject` or the rejection error |
//! | [`AssessmentSnapshot::high_risk`] | HIGH and CRITICAL records |
//! | [`AssessmentSnapshot::dashboard_metrics`] | [`payloads::DashboardMetrics`] |
//! | [`AssessmentSnapshot::dashboard_analytics`] | [`payloads::PredictiveAnalytics`] |
//! | [`AssessmentSnapshot::collision_prediction`] | [`payloads::CollisionPrediction`] |
//! | [`AssessmentSnapshot::dashboard_summary`] | [`payloads::DashboardSummary`] |
//! | [`AssessmentSnapshot::type_summary`] | [`payloads::TypeSummary`] |
//! | [`AssessmentSnapshot::current_weather`] | [`payloads::WeatherPayload`] |
//! | [`AssessmentSnapshot::weather_forecast`] | [`SpaceWeatherForecast`] |
//!
//! Rejected records are not listed, but they still count in the dashboard totals.
use std::collections::BTreeMap;

use hifitime::Epoch;
use serde::Serialize;

use crate::{
    analytics::FleetAnalytics,
    catalog::{ObjectClass, OrbitalElementSet},
    constants::NoradId,
    orbitrisk_errors::OrbitRiskError,
    propagation::KinematicState,
    risk::{ConjunctionEvent, RiskAssessment},
    space_weather::{SpaceWeatherContext, SpaceWeatherForecast},
};

pub mod builder;
pub mod payloads;

pub use builder::{AnalyticsSnapshotBuilder, ListQuery};
pub use payloads::{ObjectRecord, ObjectRef, PairPrediction};

/// Category of a per-record diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    InvalidElements,
    StaleEpoch,
    DegenerateGeometry,
    PropagationFailed,
    WeatherFallback,
}

/// A non-fatal problem met during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norad_id: Option<NoradId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<NoradId>,
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic describing a record-level error.
    pub fn from_error(err: &OrbitRiskError) -> Self {
        let (kind, norad_id, partner_id) = match err {
            OrbitRiskError::InvalidElements { norad_id, .. } => {
                (DiagnosticKind::InvalidElements, Some(*norad_id), None)
            }
            OrbitRiskError::StaleEpoch { norad_id, .. } => {
                (DiagnosticKind::StaleEpoch, Some(*norad_id), None)
            }
            OrbitRiskError::DegenerateGeometry { norad_a, norad_b } => (
                DiagnosticKind::DegenerateGeometry,
                Some(*norad_a),
                Some(*norad_b),
            ),
            OrbitRiskError::MissingWeatherContext => (DiagnosticKind::WeatherFallback, None, None),
            _ => (DiagnosticKind::PropagationFailed, None, None),
        };
        Self {
            kind,
            norad_id,
            partner_id,
            message: err.to_string(),
        }
    }
}

/// What a cycle made of one catalog record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ObjectOutcome {
    Assessed {
        state: KinematicState,
        assessment: RiskAssessment,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObjectEntry {
    pub(crate) set: OrbitalElementSet,
    pub(crate) outcome: ObjectOutcome,
}

/// Outputs of one assessment cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSnapshot {
    pub(crate) evaluated_at: Epoch,
    pub(crate) entries: BTreeMap<NoradId, ObjectEntry>,
    pub(crate) events: Vec<ConjunctionEvent>,
    pub(crate) analytics: FleetAnalytics,
    pub(crate) weather: SpaceWeatherContext,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl AssessmentSnapshot {
    pub fn evaluated_at(&self) -> Epoch {
        self.evaluated_at
    }

    /// Number of catalog records, rejected ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn analytics(&self) -> &FleetAnalytics {
        &self.analytics
    }

    /// Conjunction events of the look-ahead window, sorted by pair.
    pub fn events(&self) -> &[ConjunctionEvent] {
        &self.events
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn weather(&self) -> &SpaceWeatherContext {
        &self.weather
    }

    fn builder(&self) -> AnalyticsSnapshotBuilder {
        AnalyticsSnapshotBuilder::new(self.evaluated_at)
    }

    /// State of an assessed object.
    pub fn state(&self, norad_id: NoradId) -> Option<&KinematicState> {
        match &self.entries.get(&norad_id)?.outcome {
            ObjectOutcome::Assessed { state, .. } => Some(state),
            ObjectOutcome::Rejected { .. } => None,
        }
    }

    /// Risk assessment of an assessed object.
    pub fn assessment(&self, norad_id: NoradId) -> Option<&RiskAssessment> {
        match &self.entries.get(&norad_id)?.outcome {
            ObjectOutcome::Assessed { assessment, .. } => Some(assessment),
            ObjectOutcome::Rejected { .. } => None,
        }
    }

    /// Element set of an assessed object.
    ///
    /// Return
    /// ----------
    /// * [`OrbitRiskError::UnknownObject`] for a catalog number absent from the cycle, the
    ///   stored [`OrbitRiskError::InvalidElements`] for a rejected record.
    pub fn element_set(&self, norad_id: NoradId) -> Result<&OrbitalElementSet, OrbitRiskError> {
        let entry = self
            .entries
            .get(&norad_id)
            .ok_or(OrbitRiskError::UnknownObject(norad_id))?;
        match &entry.outcome {
            ObjectOutcome::Assessed { .. } => Ok(&entry.set),
            ObjectOutcome::Rejected { reason } => Err(OrbitRiskError::InvalidElements {
                norad_id,
                reason: reason.clone(),
            }),
        }
    }

    /// Name and catalog number of any record of the cycle.
    pub fn object_ref(&self, norad_id: NoradId) -> ObjectRef {
        ObjectRef {
            name: self
                .entries
                .get(&norad_id)
                .map(|e| e.set.name.clone())
                .unwrap_or_default(),
            norad_id,
        }
    }

    fn assessed(&self) -> impl Iterator<Item = (&OrbitalElementSet, &KinematicState, &RiskAssessment)> {
        self.entries.values().filter_map(|e| match &e.outcome {
            ObjectOutcome::Assessed { state, assessment } => Some((&e.set, state, assessment)),
            ObjectOutcome::Rejected { .. } => None,
        })
    }

    /// Assessed objects by catalog number, at most `query.limit` of them.
    pub fn list_objects(&self, query: &ListQuery) -> Vec<ObjectRecord> {
        let builder = self.builder();
        self.assessed()
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|(set, state, assessment)| {
                builder.object_record(
                    set,
                    Some(state),
                    Some(assessment),
                    &self.weather.current,
                    query,
                )
            })
            .collect()
    }

    /// Full record of one object, all blocks included.
    pub fn get_object(&self, norad_id: NoradId) -> Result<ObjectRecord, OrbitRiskError> {
        let set = self.element_set(norad_id)?;
        let query = ListQuery::default().include_weather(true);
        Ok(self.builder().object_record(
            set,
            self.state(norad_id),
            self.assessment(norad_id),
            &self.weather.current,
            &query,
        ))
    }

    /// Records of the HIGH and CRITICAL objects, by catalog number.
    pub fn high_risk(&self) -> Vec<ObjectRecord> {
        let builder = self.builder();
        let query = ListQuery::default();
        self.assessed()
            .filter(|(_, _, assessment)| assessment.risk_level.is_high_risk())
            .map(|(set, state, assessment)| {
                builder.object_record(
                    set,
                    Some(state),
                    Some(assessment),
                    &self.weather.current,
                    &query,
                )
            })
            .collect()
    }

    pub fn high_risk_ids(&self) -> Vec<NoradId> {
        self.assessed()
            .filter(|(_, _, assessment)| assessment.risk_level.is_high_risk())
            .map(|(set, _, _)| set.norad_id)
            .collect()
    }

    pub fn dashboard_metrics(&self) -> payloads::DashboardMetrics {
        self.builder().dashboard_metrics(&self.analytics)
    }

    pub fn dashboard_analytics(&self) -> payloads::PredictiveAnalytics {
        self.builder().predictive_analytics(&self.analytics)
    }

    pub fn collision_prediction(&self) -> payloads::CollisionPrediction {
        self.builder()
            .collision_prediction(&self.analytics, |id| self.object_ref(id))
    }

    pub fn dashboard_summary(&self) -> payloads::DashboardSummary {
        self.builder()
            .summary(&self.analytics, |id| self.object_ref(id))
    }

    /// Object counts per class over the whole catalog.
    pub fn type_summary(&self) -> payloads::TypeSummary {
        self.builder()
            .type_summary(self.entries.values().map(|e| e.set.class()))
    }

    pub fn current_weather(&self) -> payloads::WeatherPayload {
        self.builder().weather(&self.weather.current)
    }

    /// Forecast for a horizon of `hours` (1 to 168).
    pub fn weather_forecast(&self, hours: u32) -> Result<SpaceWeatherForecast, OrbitRiskError> {
        self.weather.forecast(hours)
    }

    /// Classes of the records, for scoring on-demand predictions.
    pub(crate) fn class_of(&self, norad_id: NoradId) -> ObjectClass {
        self.entries
            .get(&norad_id)
            .map(|e| e.set.class())
            .unwrap_or(ObjectClass::Unknown)
    }
}

/// Render any payload as compact JSON.
pub fn to_json<T: Serialize>(payload: &T) -> Result<String, OrbitRiskError> {
    Ok(serde_json::to_string(payload)?)
}
