//! # Reference frames and illumination geometry
//!
//! Helpers to move a geocentric inertial (ECI) position into Earth-fixed coordinates and to
//! decide whether an object is illuminated by the Sun.
//!
//! ## Frames
//!
//! - **ECI**: geocentric, equatorial, axes fixed with respect to the mean equinox. All states
//!   produced by the propagators live in this frame.
//! - **ECEF**: geocentric, rotating with the Earth. Obtained from ECI by a single rotation of the
//!   Greenwich Mean Sidereal Time around the polar axis (precession, nutation and polar motion are
//!   neglected).
//!
//! ## Solar model
//!
//! The solar direction uses the low-precision formulae of the *Astronomical Almanac*
//! (accuracy about 0.01° over 1950–2050), and the Earth shadow is a cylinder of radius
//! [`EARTH_RADIUS_KM`] aligned with the anti-solar direction.
use hifitime::Epoch;
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{Degree, EARTH_RADIUS_KM, RADEG, T2000},
    kepler::angle_diff,
    time::gmst_at,
};

/// Rotation matrix of angle `alpha` (radians) around the coordinate axis `k`.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians
/// * `k`: axis index, 0 = X, 1 = Y, 2 = Z; any other value falls back to Z
///
/// Returns
/// --------
/// * the active rotation matrix
pub fn rotmt(alpha: f64, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        _ => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotate an ECI position into the Earth-fixed frame at a given epoch.
pub fn eci_to_ecef(position: &Vector3<f64>, epoch: &Epoch) -> Vector3<f64> {
    rotmt(-gmst_at(epoch), 2) * position
}

/// Geocentric latitude and longitude (degrees) of the sub-satellite point.
///
/// Arguments
/// ---------
/// * `position`: ECI position in km
/// * `epoch`: evaluation epoch
///
/// Returns
/// --------
/// * `(latitude, longitude)` with latitude in `[-90, 90]` and longitude in `[-180, 180]`
pub fn sub_satellite_point(position: &Vector3<f64>, epoch: &Epoch) -> (Degree, Degree) {
    let ecef = eci_to_ecef(position, epoch);
    let r = ecef.norm();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let latitude = (ecef.z / r).clamp(-1.0, 1.0).asin();
    let longitude = angle_diff(ecef.y.atan2(ecef.x), 0.0);
    (latitude / RADEG, longitude / RADEG)
}

/// Unit vector from the Earth center toward the Sun at a given epoch (ECI, mean equator).
pub fn sun_direction(epoch: &Epoch) -> Vector3<f64> {
    let n = epoch.to_mjd_utc_days() - T2000;

    let mean_longitude = (280.460 + 0.985_647_4 * n) * RADEG;
    let mean_anomaly = (357.528 + 0.985_600_3 * n) * RADEG;
    let ecliptic_longitude = mean_longitude
        + (1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin()) * RADEG;
    let obliquity = (23.439 - 0.000_000_4 * n) * RADEG;

    Vector3::new(
        ecliptic_longitude.cos(),
        obliquity.cos() * ecliptic_longitude.sin(),
        obliquity.sin() * ecliptic_longitude.sin(),
    )
}

/// Cylindrical-shadow illumination test.
///
/// An object is sunlit when it is on the day side of the terminator plane, or when its
/// distance from the Earth–Sun axis exceeds the Earth radius.
pub fn is_sunlit(position: &Vector3<f64>, sun_dir: &Vector3<f64>) -> bool {
    let along = position.dot(sun_dir);
    if along >= 0.0 {
        return true;
    }
    let perpendicular = position - along * sun_dir;
    perpendicular.norm() > EARTH_RADIUS_KM
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotmt_z_axis() {
        let rot = rotmt(std::f64::consts::FRAC_PI_2, 2);
        let v = rot * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_sun_direction_near_march_equinox() {
        // around the March equinox the Sun sits close to the +X axis
        let epoch = Epoch::from_gregorian_utc_hms(2024, 3, 20, 3, 6, 0);
        let sun = sun_direction(&epoch);
        assert_relative_eq!(sun.norm(), 1.0, epsilon = 1e-12);
        assert!(sun.x > 0.999);
        assert!(sun.z.abs() < 0.01);
    }

    #[test]
    fn test_shadow_cylinder() {
        let sun = Vector3::new(1.0, 0.0, 0.0);
        assert!(is_sunlit(&Vector3::new(7000.0, 0.0, 0.0), &sun));
        assert!(!is_sunlit(&Vector3::new(-7000.0, 0.0, 0.0), &sun));
        assert!(is_sunlit(&Vector3::new(-7000.0, 0.0, 6500.0), &sun));
    }

    #[test]
    fn test_sub_satellite_point_latitude() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let (lat, lon) = sub_satellite_point(&Vector3::new(0.0, 0.0, 7000.0), &epoch);
        assert_relative_eq!(lat, 90.0, epsilon = 1e-9);
        assert!((-180.0..=180.0).contains(&lon));

        let (lat, _) = sub_satellite_point(&Vector3::new(7000.0, 0.0, 0.0), &epoch);
        assert_relative_eq!(lat, 0.0, epsilon = 1e-12);
    }
}
