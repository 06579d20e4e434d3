//! # Constants and type definitions for orbitrisk
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Geophysical constants of the reference body (Earth, WGS84)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, km/s ↔ km/h)
//! - Core type aliases shared by propagation, screening and risk modules
//!
//! Lengths are expressed in **kilometers**, velocities in **km/s** and times in **seconds**
//! unless a name or alias says otherwise.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-6;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Earth equatorial radius in kilometers (GRS1980/WGS84)
pub const EARTH_RADIUS_KM: f64 = 6_378.137;

/// Earth gravitational parameter μ in km³/s² (WGS84)
pub const MU_EARTH_KM3_S2: f64 = 398_600.4418;

/// Second zonal harmonic of the Earth gravity field (unitless)
pub const J2_EARTH: f64 = 1.082_626_68e-3;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// km/s → km/h
pub const KMS_TO_KMH: f64 = 3_600.0;

/// km/s → m/s
pub const KMS_TO_MS: f64 = 1_000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Duration in hours
pub type Hours = f64;
/// Percentage in `[0, 100]`
pub type Percent = f64;

/// NORAD catalog number identifying a tracked object
pub type NoradId = u32;

/// Canonically ordered pair of catalog numbers (lower id first)
pub type PairKey = (NoradId, NoradId);

/// Build the canonical ordering of an unordered pair of catalog numbers.
///
/// Arguments
/// -----------------
/// * `a`, `b`: the two catalog numbers, in any order.
///
/// Return
/// ----------
/// * `(min, max)` so that `(a, b)` and `(b, a)` collapse onto one key.
#[inline]
pub fn pair_key(a: NoradId, b: NoradId) -> PairKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
