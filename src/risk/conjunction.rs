use hifitime::Epoch;

use crate::{
    constants::{Hours, Kilometer, KmPerSec, NoradId, Percent},
    risk::risk_params::RiskLevel,
    time::hours_between,
};

/// Interval during which a pair stays within the screening threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: Epoch,
    pub end: Epoch,
}

impl TimeWindow {
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).to_seconds()
    }
}

/// Risk-scored close approach of one pair.
///
/// Fields
/// -----------------
/// * `norad_a`, `norad_b`: the pair, `norad_a < norad_b`.
/// * `probability`: pair collision probability in `[0, 1]`.
/// * `combined_risk`: probability reweighted by encounter urgency, in `[0, 1]`.
/// * `risk_level`: tier of `probability` in percent.
/// * `closest_approach_km`, `relative_speed_kms`: geometry at the closest approach.
/// * `tca`: time of closest approach, `None` when the minimum sits on the window boundary or the
///   relative motion is degenerate.
/// * `window`: threshold-crossing interval around the closest approach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjunctionEvent {
    pub norad_a: NoradId,
    pub norad_b: NoradId,
    pub probability: f64,
    pub combined_risk: f64,
    pub risk_level: RiskLevel,
    pub closest_approach_km: Kilometer,
    pub relative_speed_kms: KmPerSec,
    pub tca: Option<Epoch>,
    pub window: TimeWindow,
}

impl ConjunctionEvent {
    /// Whether `norad_id` is one of the two objects.
    pub fn involves(&self, norad_id: NoradId) -> bool {
        self.norad_a == norad_id || self.norad_b == norad_id
    }

    /// The other object of the pair.
    pub fn partner_of(&self, norad_id: NoradId) -> Option<NoradId> {
        if self.norad_a == norad_id {
            Some(self.norad_b)
        } else if self.norad_b == norad_id {
            Some(self.norad_a)
        } else {
            None
        }
    }

    pub fn probability_percent(&self) -> Percent {
        100.0 * self.probability
    }

    /// Hours from `from` to the closest approach.
    pub fn hours_to_tca(&self, from: &Epoch) -> Option<Hours> {
        self.tca.map(|tca| hours_between(from, &tca))
    }
}

#[cfg(test)]
mod conjunction_test {
    use super::*;
    use crate::time::offset_seconds;

    #[test]
    fn test_event_accessors() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let event = ConjunctionEvent {
            norad_a: 3,
            norad_b: 8,
            probability: 0.12,
            combined_risk: 0.1,
            risk_level: RiskLevel::Critical,
            closest_approach_km: 1.2,
            relative_speed_kms: 9.0,
            tca: Some(offset_seconds(&t0, 5_400.0)),
            window: TimeWindow {
                start: offset_seconds(&t0, 5_390.0),
                end: offset_seconds(&t0, 5_410.0),
            },
        };
        assert!(event.involves(8));
        assert_eq!(event.partner_of(3), Some(8));
        assert_eq!(event.partner_of(4), None);
        assert!((event.hours_to_tca(&t0).unwrap() - 1.5).abs() < 1e-9);
        assert!((event.window.duration_seconds() - 20.0).abs() < 1e-9);
        assert!((event.probability_percent() - 12.0).abs() < 1e-12);
    }
}
