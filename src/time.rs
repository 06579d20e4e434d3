use hifitime::{Duration, Epoch};

use crate::constants::{Hours, DPI, SECONDS_PER_DAY, SECONDS_PER_HOUR, T2000};

/// Render an epoch as an ISO-8601 UTC timestamp with millisecond precision.
///
/// Argument
/// --------
/// * `epoch`: the epoch to render
///
/// Return
/// ------
/// * a string in the format `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn to_iso8601(epoch: &Epoch) -> String {
    let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
    format!(
        "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{:03}Z",
        nanos / 1_000_000
    )
}

/// Signed elapsed time from `from` to `to`, in seconds.
#[inline]
pub fn seconds_between(from: &Epoch, to: &Epoch) -> f64 {
    (*to - *from).to_seconds()
}

/// Signed elapsed time from `from` to `to`, in hours.
#[inline]
pub fn hours_between(from: &Epoch, to: &Epoch) -> Hours {
    seconds_between(from, to) / SECONDS_PER_HOUR
}

/// Signed elapsed time from `from` to `to`, in days.
#[inline]
pub fn days_between(from: &Epoch, to: &Epoch) -> f64 {
    seconds_between(from, to) / SECONDS_PER_DAY
}

/// Shift an epoch by a (possibly fractional) number of seconds.
#[inline]
pub fn offset_seconds(epoch: &Epoch, seconds: f64) -> Epoch {
    *epoch + Duration::from_seconds(seconds)
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date.
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate. UTC is used in place
/// of UT1; the sub-second difference is far below the resolution of
/// the ground-track fields produced by this crate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / SECONDS_PER_DAY;

    let h = tjm.fract() * DPI;
    let gmst = gmst0 + h * RAP;

    gmst.rem_euclid(DPI)
}

/// GMST (radians) at a given epoch, see [`gmst`].
pub fn gmst_at(epoch: &Epoch) -> f64 {
    gmst(epoch.to_mjd_utc_days())
}

/// Julian centuries elapsed since J2000.0 at a given epoch (UTC scale).
pub fn julian_centuries_since_j2000(epoch: &Epoch) -> f64 {
    (epoch.to_mjd_utc_days() - T2000) / 36525.0
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_iso8601() {
        let epoch = Epoch::from_gregorian_utc_hms(2024, 3, 9, 7, 5, 3);
        assert_eq!(to_iso8601(&epoch), "2024-03-09T07:05:03.000Z");
    }

    #[test]
    fn test_hours_between_is_signed() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let t1 = Epoch::from_gregorian_utc_hms(2024, 1, 1, 6, 0, 0);
        assert_relative_eq!(hours_between(&t0, &t1), 6.0, epsilon = 1e-9);
        assert_relative_eq!(hours_between(&t1, &t0), -6.0, epsilon = 1e-9);
        assert_relative_eq!(days_between(&t0, &t1), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_seconds() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let t1 = offset_seconds(&t0, 7_200.0);
        assert_eq!(t1, Epoch::from_gregorian_utc_hms(2024, 1, 1, 2, 0, 0));
    }

    #[test]
    fn test_gmst() {
        let tut = 57028.478514610404;
        assert_relative_eq!(gmst(tut), 4.851925725092499, epsilon = 1e-12);

        assert_relative_eq!(gmst(T2000), 4.894961212789145, epsilon = 1e-12);
    }
}
