use super::constants::DPI;
use std::f64::consts::PI;

/// Principal value of an angle in radians, in `[0, 2π)`.
pub(crate) fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Principal difference `a − b` between two angles, in `[-π, π]`.
pub(crate) fn angle_diff(a: f64, b: f64) -> f64 {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Mean motion (rad/s) of an orbit of semi-major axis `a` (km) around a body of parameter `mu`.
#[inline]
pub(crate) fn mean_motion(semi_major_axis: f64, mu: f64) -> f64 {
    (mu / semi_major_axis.powi(3)).sqrt()
}

/// Semi-major axis (km) of an orbit of mean motion `n` (rad/s), inverse of [`mean_motion`].
#[inline]
pub(crate) fn semi_major_axis_from_mean_motion(n: f64, mu: f64) -> f64 {
    (mu / (n * n)).cbrt()
}

/// Keplerian period (seconds) of an orbit of semi-major axis `a` (km).
#[inline]
pub(crate) fn orbital_period(semi_major_axis: f64, mu: f64) -> f64 {
    DPI / mean_motion(semi_major_axis, mu)
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use crate::constants::MU_EARTH_KM3_S2;
    use approx::assert_relative_eq;

    #[test]
    fn test_principal_angle() {
        assert_relative_eq!(principal_angle(-PI / 2.0), 1.5 * PI, epsilon = 1e-14);
        assert_relative_eq!(principal_angle(5.0 * PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_diff() {
        assert_relative_eq!(angle_diff(0.1, DPI - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(DPI - 0.1, 0.1), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_period_of_geostationary_orbit() {
        // one sidereal day at a = 42164.17 km
        let period = orbital_period(42_164.17, MU_EARTH_KM3_S2);
        assert_relative_eq!(period, 86_164.09, epsilon = 1.0);
    }

    #[test]
    fn test_mean_motion_round_trip() {
        let a = 6_778.0;
        let n = mean_motion(a, MU_EARTH_KM3_S2);
        assert_relative_eq!(
            semi_major_axis_from_mean_motion(n, MU_EARTH_KM3_S2),
            a,
            epsilon = 1e-9
        );
    }
}
