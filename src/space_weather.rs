//! # Space-weather context
//!
//! Environmental indices supplied by the caller and the quantities derived from them.
//!
//! The engine never fetches weather. A [`SpaceWeatherContext`] is built upstream from the
//! provider feeds and handed to each assessment cycle together with the element catalog.
//!
//! ## Derived quantities
//!
//! - **Atmospheric drag multiplier** ([`drag_multiplier`]): `1.0` under quiet conditions, raised
//!   by solar flux above 150 sfu and by geomagnetic activity above Kp 4, capped at `2.0`.
//! - **Impact score** ([`SpaceWeatherSnapshot::impact_score`]): a `0–10` summary combining Kp and
//!   the drag multiplier.
//! - **Forecast** ([`SpaceWeatherContext::forecast`]): a caller-supplied forecast when one
//!   exists for the requested horizon, else a persistence forecast of the current conditions.
use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::orbitrisk_errors::OrbitRiskError;

/// Solar flux (sfu) above which drag increases.
const QUIET_SOLAR_FLUX: f64 = 150.0;
/// Kp index above which drag increases.
const QUIET_KP: f64 = 4.0;
/// Upper bound of the drag multiplier.
const MAX_DRAG_MULTIPLIER: f64 = 2.0;
/// Longest forecast horizon, in hours.
pub const MAX_FORECAST_HOURS: u32 = 168;

/// Raw indices of one weather observation.
///
/// Fields
/// -----------------
/// * `solar_flux_f107`: F10.7 solar radio flux (sfu).
/// * `geomagnetic_kp`: planetary Kp index (`0–9`).
/// * `solar_wind_speed`: km/s, informational.
/// * `magnetic_field_bt`: interplanetary field magnitude (nT), informational.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherIndices {
    pub solar_flux_f107: f64,
    pub geomagnetic_kp: f64,
    #[serde(default)]
    pub solar_wind_speed: Option<f64>,
    #[serde(default)]
    pub magnetic_field_bt: Option<f64>,
}

impl Default for WeatherIndices {
    /// Quiet-sun conditions, under which the drag multiplier is exactly `1.0`.
    fn default() -> Self {
        Self {
            solar_flux_f107: QUIET_SOLAR_FLUX,
            geomagnetic_kp: 2.0,
            solar_wind_speed: None,
            magnetic_field_bt: None,
        }
    }
}

/// Atmospheric drag multiplier implied by a solar flux and a Kp index.
///
/// Arguments
/// -----------------
/// * `f107`: F10.7 solar flux in sfu.
/// * `kp`: planetary Kp index.
///
/// Return
/// ----------
/// * `1 + 0.3·(F10.7 − 150)/100` (flux above 150) `+ 0.2·(Kp − 4)/5` (Kp above 4), at most 2.
pub fn drag_multiplier(f107: f64, kp: f64) -> f64 {
    let mut factor = 1.0;
    if f107 > QUIET_SOLAR_FLUX {
        factor += 0.3 * (f107 - QUIET_SOLAR_FLUX) / 100.0;
    }
    if kp > QUIET_KP {
        factor += 0.2 * (kp - QUIET_KP) / 5.0;
    }
    factor.min(MAX_DRAG_MULTIPLIER)
}

/// One weather observation and its derived drag multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceWeatherSnapshot {
    pub indices: WeatherIndices,
    pub atmospheric_drag_factor: f64,
    pub valid_at: Epoch,
}

impl SpaceWeatherSnapshot {
    /// Build a snapshot, deriving the drag multiplier from the indices.
    pub fn new(indices: WeatherIndices, valid_at: Epoch) -> Self {
        Self {
            atmospheric_drag_factor: drag_multiplier(
                indices.solar_flux_f107,
                indices.geomagnetic_kp,
            ),
            indices,
            valid_at,
        }
    }

    /// Snapshot from F10.7 and Kp alone.
    pub fn from_indices(f107: f64, kp: f64, valid_at: Epoch) -> Self {
        Self::new(
            WeatherIndices {
                solar_flux_f107: f107,
                geomagnetic_kp: kp,
                ..WeatherIndices::default()
            },
            valid_at,
        )
    }

    /// Neutral snapshot used when no weather is available: multiplier exactly `1.0`.
    pub fn neutral(valid_at: Epoch) -> Self {
        Self {
            indices: WeatherIndices::default(),
            atmospheric_drag_factor: 1.0,
            valid_at,
        }
    }

    /// Space-weather impact score in `[0, 10]`.
    pub fn impact_score(&self) -> f64 {
        let kp_part = 0.5 * self.indices.geomagnetic_kp / 9.0;
        let drag_part = 0.5 * (self.atmospheric_drag_factor - 1.0);
        10.0 * (kp_part + drag_part).clamp(0.0, 1.0)
    }
}

/// Trend strings of a weather forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceWeatherForecast {
    pub forecast_hours: u32,
    pub solar_flux_trend: String,
    pub geomagnetic_risk: String,
    pub atmospheric_drag_trend: String,
}

impl SpaceWeatherForecast {
    /// Persistence forecast: current conditions are assumed to hold over the horizon.
    pub fn persistence(current: &SpaceWeatherSnapshot, hours: u32) -> Self {
        let geomagnetic_risk = if current.indices.geomagnetic_kp < QUIET_KP {
            "low"
        } else {
            "moderate"
        };
        let atmospheric_drag_trend = if current.atmospheric_drag_factor > 1.1 {
            "increasing"
        } else {
            "stable"
        };
        Self {
            forecast_hours: hours,
            solar_flux_trend: "stable".into(),
            geomagnetic_risk: geomagnetic_risk.into(),
            atmospheric_drag_trend: atmospheric_drag_trend.into(),
        }
    }
}

/// Weather inputs of one assessment cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceWeatherContext {
    pub current: SpaceWeatherSnapshot,
    pub forecasts: Vec<SpaceWeatherForecast>,
}

impl SpaceWeatherContext {
    pub fn new(current: SpaceWeatherSnapshot) -> Self {
        Self {
            current,
            forecasts: Vec::new(),
        }
    }

    /// Attach a provider forecast.
    pub fn with_forecast(mut self, forecast: SpaceWeatherForecast) -> Self {
        self.forecasts.push(forecast);
        self
    }

    /// Forecast for a horizon of `hours` (1 to 168).
    ///
    /// Return
    /// ----------
    /// * The provider forecast with that horizon if one was supplied, else the persistence
    ///   forecast; [`OrbitRiskError::InvalidQuery`] for a horizon outside `1..=168`.
    pub fn forecast(&self, hours: u32) -> Result<SpaceWeatherForecast, OrbitRiskError> {
        if !(1..=MAX_FORECAST_HOURS).contains(&hours) {
            return Err(OrbitRiskError::InvalidQuery(format!(
                "forecast horizon {hours} h outside 1..={MAX_FORECAST_HOURS}"
            )));
        }
        Ok(self
            .forecasts
            .iter()
            .find(|f| f.forecast_hours == hours)
            .cloned()
            .unwrap_or_else(|| SpaceWeatherForecast::persistence(&self.current, hours)))
    }
}
