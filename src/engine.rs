//! # Assessment engine
//!
//! Entry point of the crate: one call runs a full assessment cycle over an element catalog and
//! returns an immutable [`AssessmentSnapshot`].
//!
//! ## Cycle
//!
//! 1. **Batch check**: an empty catalog or a duplicated catalog number aborts the cycle.
//! 2. **Weather**: the supplied context, else the configured fallback, else (unless
//!    `strict_weather`) a neutral context with drag multiplier `1.0`.
//! 3. **Propagation** (parallel): every record is validated and propagated to the evaluation
//!    time. Invalid records are rejected individually; stale epochs are flagged.
//! 4. **Screening**: instantaneous pairs within the threshold and within the density radius,
//!    then the window screen over the look-ahead.
//! 5. **Scoring** (parallel): encounters become conjunction events, states become per-object
//!    assessments.
//! 6. **Reduction**: fleet analytics, in canonical order.
//!
//! Per-record problems never abort the cycle; they are reported as [`Diagnostic`]s.
//!
//! ## Example
//!
//! ```rust, no_run
//! use hifitime::Epoch;
//! use orbitrisk::engine::{AssessmentEngine, EngineConfig};
//! use orbitrisk::snapshot::ListQuery;
//!
//! # fn load_catalog() -> Vec<orbitrisk::catalog::OrbitalElementSet> { Vec::new() }
//! let engine = AssessmentEngine::new(EngineConfig::default())?;
//! let catalog = load_catalog();
//! let now = Epoch::from_gregorian_utc_at_midnight(2024, 6, 1);
//!
//! let snapshot = engine.assess(&catalog, None, now)?;
//! for record in snapshot.high_risk() {
//!     println!("{} {}", record.norad_id, record.name);
//! }
//! let first = snapshot.list_objects(&ListQuery::default().limit(10));
//! # Ok::<(), orbitrisk::orbitrisk_errors::OrbitRiskError>(())
//! ```
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use hifitime::Epoch;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    analytics::{AnalyticsParams, CycleOutputs, FleetAnalyticsAggregator},
    catalog::{check_batch, ObjectClass, OrbitalElementSet},
    constants::{NoradId, SECONDS_PER_HOUR},
    orbitrisk_errors::OrbitRiskError,
    propagation::{build_propagator, KinematicState, PreparedOrbit, PropagationParams, StatePropagator},
    risk::{ConjunctionRiskAssessor, PairMotion, RiskParams},
    screening::{Encounter, ProximityScreener, ScreeningParams},
    snapshot::{
        AnalyticsSnapshotBuilder, AssessmentSnapshot, Diagnostic, DiagnosticKind, ObjectEntry,
        ObjectOutcome, PairPrediction,
    },
    space_weather::{
        SpaceWeatherContext, SpaceWeatherSnapshot, WeatherIndices, MAX_FORECAST_HOURS,
    },
};

/// Default horizon of an on-demand pair prediction, in hours.
pub const DEFAULT_PREDICTION_HOURS: u32 = 24;

/// Configuration of an [`AssessmentEngine`].
///
/// Fields
/// -----------------
/// * `propagation`, `screening`, `risk`, `analytics`: component settings.
/// * `worker_threads`: size of a dedicated worker pool; `None` uses rayon's global pool.
/// * `fallback_weather`: indices used when a cycle is run without weather.
/// * `strict_weather`: without weather nor fallback, fail with
///   [`OrbitRiskError::MissingWeatherContext`] instead of using a neutral multiplier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub propagation: PropagationParams,
    pub screening: ScreeningParams,
    pub risk: RiskParams,
    pub analytics: AnalyticsParams,
    pub worker_threads: Option<usize>,
    pub fallback_weather: Option<WeatherIndices>,
    pub strict_weather: bool,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse a JSON configuration, missing fields taking their defaults, and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, OrbitRiskError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OrbitRiskError> {
        self.propagation.validate()?;
        self.screening.validate()?;
        self.risk.validate()?;
        self.analytics.validate()?;
        if self.worker_threads == Some(0) {
            return Err(OrbitRiskError::InvalidConfig(
                "worker_threads must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`], with validation.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn propagation(mut self, v: PropagationParams) -> Self {
        self.config.propagation = v;
        self
    }
    pub fn screening(mut self, v: ScreeningParams) -> Self {
        self.config.screening = v;
        self
    }
    pub fn risk(mut self, v: RiskParams) -> Self {
        self.config.risk = v;
        self
    }
    pub fn analytics(mut self, v: AnalyticsParams) -> Self {
        self.config.analytics = v;
        self
    }
    pub fn worker_threads(mut self, v: usize) -> Self {
        self.config.worker_threads = Some(v);
        self
    }
    pub fn fallback_weather(mut self, v: WeatherIndices) -> Self {
        self.config.fallback_weather = Some(v);
        self
    }
    pub fn strict_weather(mut self, v: bool) -> Self {
        self.config.strict_weather = v;
        self
    }

    pub fn build(self) -> Result<EngineConfig, OrbitRiskError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Stateless assessment engine.
///
/// The engine holds configuration and components only; every cycle result lives in the
/// returned snapshot, so concurrent cycles on one engine are independent.
pub struct AssessmentEngine {
    config: EngineConfig,
    propagator: Box<dyn StatePropagator>,
    screener: ProximityScreener,
    assessor: ConjunctionRiskAssessor,
    aggregator: FleetAnalyticsAggregator,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for AssessmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentEngine")
            .field("config", &self.config)
            .field("propagator", &self.propagator.name())
            .finish()
    }
}

impl AssessmentEngine {
    /// Build an engine from a configuration.
    ///
    /// Return
    /// ----------
    /// * The engine, [`OrbitRiskError::InvalidConfig`] for an invalid configuration or
    ///   [`OrbitRiskError::ThreadPool`] when the dedicated pool cannot be created.
    pub fn new(config: EngineConfig) -> Result<Self, OrbitRiskError> {
        config.validate()?;
        let pool = config
            .worker_threads
            .map(|n| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("orbitrisk-{i}"))
                    .build()
                    .map_err(|e| OrbitRiskError::ThreadPool(e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            propagator: build_propagator(config.propagation.clone()),
            screener: ProximityScreener::new(config.screening.clone()),
            assessor: ConjunctionRiskAssessor::new(
                config.risk.clone(),
                config.screening.threshold_km,
            ),
            aggregator: FleetAnalyticsAggregator::new(
                config.analytics.clone(),
                config.risk.thresholds,
            ),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn propagator(&self) -> &dyn StatePropagator {
        self.propagator.as_ref()
    }

    fn install<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Weather of one cycle, with a diagnostic when a fallback is used.
    fn resolve_weather(
        &self,
        weather: Option<&SpaceWeatherContext>,
        evaluated_at: Epoch,
    ) -> Result<(SpaceWeatherContext, Option<Diagnostic>), OrbitRiskError> {
        if let Some(context) = weather {
            return Ok((context.clone(), None));
        }
        let (snapshot, message) = match self.config.fallback_weather {
            Some(indices) => (
                SpaceWeatherSnapshot::new(indices, evaluated_at),
                "no weather supplied, using the configured fallback indices",
            ),
            None if self.config.strict_weather => {
                return Err(OrbitRiskError::MissingWeatherContext)
            }
            None => (
                SpaceWeatherSnapshot::neutral(evaluated_at),
                "no weather supplied, using a neutral drag multiplier",
            ),
        };
        warn!(
            drag = snapshot.atmospheric_drag_factor,
            "{message}"
        );
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::WeatherFallback,
            norad_id: None,
            partner_id: None,
            message: message.into(),
        };
        Ok((SpaceWeatherContext::new(snapshot), Some(diagnostic)))
    }

    /// Run one assessment cycle.
    ///
    /// Arguments
    /// -----------------
    /// * `catalog`: the element sets of the cycle, unique catalog numbers.
    /// * `weather`: the cycle's weather, `None` to use the configured fallback.
    /// * `evaluated_at`: evaluation time; it must not precede the element epochs.
    ///
    /// Return
    /// ----------
    /// * The cycle snapshot, or a batch-level error: [`OrbitRiskError::EmptyCatalog`],
    ///   [`OrbitRiskError::MalformedBatch`], [`OrbitRiskError::MissingWeatherContext`].
    pub fn assess(
        &self,
        catalog: &[OrbitalElementSet],
        weather: Option<&SpaceWeatherContext>,
        evaluated_at: Epoch,
    ) -> Result<AssessmentSnapshot, OrbitRiskError> {
        check_batch(catalog)?;
        let (weather, fallback) = self.resolve_weather(weather, evaluated_at)?;
        Ok(self.install(|| self.run_cycle(catalog, weather, fallback, evaluated_at)))
    }

    fn run_cycle(
        &self,
        catalog: &[OrbitalElementSet],
        weather: SpaceWeatherContext,
        fallback: Option<Diagnostic>,
        evaluated_at: Epoch,
    ) -> AssessmentSnapshot {
        let started = Instant::now();
        let propagator = self.propagator.as_ref();
        let mut diagnostics: Vec<Diagnostic> = fallback.into_iter().collect();

        let propagated: Vec<(NoradId, Result<(PreparedOrbit, KinematicState), OrbitRiskError>)> =
            catalog
                .par_iter()
                .map(|set| {
                    let outcome = PreparedOrbit::new(propagator, set, &evaluated_at).and_then(
                        |orbit| {
                            let state = propagator.propagate(set, &evaluated_at)?;
                            Ok((orbit, state))
                        },
                    );
                    (set.norad_id, outcome)
                })
                .collect();

        let mut orbits = Vec::with_capacity(propagated.len());
        let mut states = Vec::with_capacity(propagated.len());
        let mut rejected: HashMap<NoradId, String> = HashMap::new();
        for (norad_id, outcome) in propagated {
            match outcome {
                Ok((orbit, state)) => {
                    if state.stale {
                        let stale = OrbitRiskError::StaleEpoch {
                            norad_id,
                            age_days: state.epoch_age_days,
                            max_age_days: self.config.propagation.max_epoch_age_days,
                        };
                        warn!(norad_id, age_days = state.epoch_age_days, "stale element epoch");
                        diagnostics.push(Diagnostic::from_error(&stale));
                    }
                    orbits.push(orbit);
                    states.push(state);
                }
                Err(err) => {
                    warn!(norad_id, error = %err, "element set rejected");
                    let mut diagnostic = Diagnostic::from_error(&err);
                    diagnostic.norad_id = Some(norad_id);
                    diagnostics.push(diagnostic);
                    let reason = match err {
                        OrbitRiskError::InvalidElements { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    rejected.insert(norad_id, reason);
                }
            }
        }
        orbits.sort_by_key(|o| o.norad_id);
        states.sort_by_key(|s| s.norad_id);

        let nearby = self.screener.screen_states(&states);
        let density = self
            .screener
            .pairs_within_radius(&states, self.config.risk.density_radius_km);
        let screening = self.screener.screen_window(propagator, &orbits);
        debug!(
            nearby = nearby.len(),
            density = density.len(),
            encounters = screening.encounters.len(),
            "screening done"
        );

        for failure in &screening.failures {
            diagnostics.push(Diagnostic::from_error(failure));
        }
        for encounter in screening
            .encounters
            .iter()
            .filter(|e| e.approach.degenerate)
        {
            let err = OrbitRiskError::DegenerateGeometry {
                norad_a: encounter.approach.norad_a,
                norad_b: encounter.approach.norad_b,
            };
            debug!(error = %err, "closest approach time undefined");
            diagnostics.push(Diagnostic::from_error(&err));
        }

        let classes: HashMap<NoradId, ObjectClass> =
            catalog.iter().map(|set| (set.norad_id, set.class())).collect();
        let drag = weather.current.atmospheric_drag_factor;

        let events =
            self.assessor
                .score_encounters(&screening.encounters, &classes, drag, &evaluated_at);
        let assessments = self.assessor.assess_objects(
            &states,
            &classes,
            &nearby,
            &density,
            &events,
            &evaluated_at,
        );

        let analytics = self.aggregator.aggregate(CycleOutputs {
            catalog,
            states: &states,
            assessments: &assessments,
            events: &events,
            weather: &weather.current,
            evaluated_at,
        });

        let rejected_count = rejected.len();
        let mut entries: BTreeMap<NoradId, ObjectEntry> = BTreeMap::new();
        let mut assessed: HashMap<NoradId, (KinematicState, _)> = states
            .into_iter()
            .zip(assessments)
            .map(|(state, assessment)| (state.norad_id, (state, assessment)))
            .collect();
        for set in catalog {
            let outcome = match assessed.remove(&set.norad_id) {
                Some((state, assessment)) => ObjectOutcome::Assessed { state, assessment },
                None => ObjectOutcome::Rejected {
                    reason: rejected
                        .remove(&set.norad_id)
                        .unwrap_or_else(|| "not propagated".into()),
                },
            };
            entries.insert(
                set.norad_id,
                ObjectEntry {
                    set: set.clone(),
                    outcome,
                },
            );
        }

        info!(
            objects = catalog.len(),
            rejected = rejected_count,
            candidates = nearby.len(),
            events = events.len(),
            high_risk = analytics.high_risk_objects,
            propagator = propagator.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "assessment cycle complete"
        );

        AssessmentSnapshot {
            evaluated_at,
            entries,
            events,
            analytics,
            weather,
            diagnostics,
        }
    }

    /// Predict the closest approach of one pair over the next `hours_ahead` hours.
    ///
    /// Arguments
    /// -----------------
    /// * `snapshot`: a snapshot produced by this engine; its evaluation time and weather apply.
    /// * `norad_a`, `norad_b`: the two objects, distinct.
    /// * `hours_ahead`: search window, `1..=168` hours.
    ///
    /// Return
    /// ----------
    /// * The [`PairPrediction`]; [`OrbitRiskError::InvalidQuery`] for a self-pair or a window
    ///   outside `1..=168`, [`OrbitRiskError::UnknownObject`] for an unknown catalog number,
    ///   the rejection error for a rejected record.
    pub fn predict_collision(
        &self,
        snapshot: &AssessmentSnapshot,
        norad_a: NoradId,
        norad_b: NoradId,
        hours_ahead: u32,
    ) -> Result<PairPrediction, OrbitRiskError> {
        if norad_a == norad_b {
            return Err(OrbitRiskError::InvalidQuery(format!(
                "cannot predict a collision of object {norad_a} with itself"
            )));
        }
        if !(1..=MAX_FORECAST_HOURS).contains(&hours_ahead) {
            return Err(OrbitRiskError::InvalidQuery(format!(
                "prediction window {hours_ahead} h outside 1..={MAX_FORECAST_HOURS}"
            )));
        }

        let at = snapshot.evaluated_at();
        let propagator = self.propagator.as_ref();
        let a = PreparedOrbit::new(propagator, snapshot.element_set(norad_a)?, &at)?;
        let b = PreparedOrbit::new(propagator, snapshot.element_set(norad_b)?, &at)?;

        let screening = &self.config.screening;
        let horizon = hours_ahead as f64 * SECONDS_PER_HOUR;
        let motion = PairMotion::new(propagator, &a, &b, screening.time_tolerance_seconds);
        let approach = motion.search(horizon, screening.step_seconds)?;

        let within_threshold = approach.miss_distance <= screening.threshold_km;
        let (window_start, window_end) = if within_threshold {
            motion.window_edges(
                approach.tca_offset,
                screening.threshold_km,
                horizon,
                screening.step_seconds,
            )?
        } else {
            (approach.tca_offset, approach.tca_offset)
        };
        if approach.degenerate {
            debug!(norad_a, norad_b, "closest approach time undefined");
        }

        let event = self.assessor.score_encounter(
            &Encounter {
                approach,
                window_start,
                window_end,
            },
            snapshot.class_of(norad_a),
            snapshot.class_of(norad_b),
            snapshot.weather().current.atmospheric_drag_factor,
            &at,
        );

        Ok(AnalyticsSnapshotBuilder::new(at).pair_prediction(
            &event,
            within_threshold,
            hours_ahead,
            |id| snapshot.object_ref(id),
        ))
    }
}

#[cfg(test)]
mod engine_test {
    use super::*;

    #[test]
    fn test_config_from_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{"screening": {"threshold_km": 50.0}, "worker_threads": 2, "strict_weather": true}"#,
        )
        .unwrap();
        assert_eq!(config.screening.threshold_km, 50.0);
        assert_eq!(config.screening.step_seconds, 60.0);
        assert_eq!(config.worker_threads, Some(2));
        assert!(config.strict_weather);
        assert_eq!(config.risk, RiskParams::default());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"screening": {"threshold_km": -1.0}}"#),
            Err(OrbitRiskError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(OrbitRiskError::Serialization(_))
        ));
        assert!(EngineConfig::builder().worker_threads(0).build().is_err());
    }

    #[test]
    fn test_missing_weather_policy() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);

        let strict = AssessmentEngine::new(
            EngineConfig::builder().strict_weather(true).build().unwrap(),
        )
        .unwrap();
        assert_eq!(
            strict.resolve_weather(None, t0).unwrap_err(),
            OrbitRiskError::MissingWeatherContext
        );

        let lenient = AssessmentEngine::new(EngineConfig::default()).unwrap();
        let (context, diagnostic) = lenient.resolve_weather(None, t0).unwrap();
        assert_eq!(context.current.atmospheric_drag_factor, 1.0);
        assert_eq!(diagnostic.unwrap().kind, DiagnosticKind::WeatherFallback);

        let fallback = AssessmentEngine::new(
            EngineConfig::builder()
                .strict_weather(true)
                .fallback_weather(WeatherIndices {
                    solar_flux_f107: 250.0,
                    geomagnetic_kp: 2.0,
                    solar_wind_speed: None,
                    magnetic_field_bt: None,
                })
                .build()
                .unwrap(),
        )
        .unwrap();
        let (context, _) = fallback.resolve_weather(None, t0).unwrap();
        assert!((context.current.atmospheric_drag_factor - 1.3).abs() < 1e-12);
    }
}
