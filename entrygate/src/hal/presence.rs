use std::time::Duration;

/// One of the two sensing zones a vehicle crosses while passing the barrier.
#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Zone {
    Entry,
    Exit,
}

pub trait PresenceSensor {
    fn is_present(&self) -> bool {
        self.state() == PresenceState::Present
    }

    fn state(&self) -> PresenceState;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum PresenceState {
    #[default]
    Clear,
    Present,
}

/// Distance sensor, e.g. an ultrasonic ranger pointed across the lane.
pub trait Rangefinder {
    /// Distance to the nearest object in centimetres, `None` when no echo came back.
    fn distance_cm(&self) -> Option<f32>;
}

// 343 m/s
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Time for a sound burst to reach an object `distance_cm` away and come back.
pub fn echo_round_trip(distance_cm: f32) -> Duration {
    let us = 2.0 * distance_cm.max(0.0) / SPEED_OF_SOUND_CM_PER_US;
    Duration::from_micros(us as u64)
}

/// Turns a [`Rangefinder`] into a [`PresenceSensor`]: anything closer than the
/// threshold is a vehicle.
pub struct ThresholdPresence<R> {
    rangefinder: R,
    threshold_cm: f32,
}

impl<R: Rangefinder> ThresholdPresence<R> {
    pub fn new(rangefinder: R, threshold_cm: f32) -> Self {
        Self {
            rangefinder,
            threshold_cm,
        }
    }
}

impl<R: Rangefinder> PresenceSensor for ThresholdPresence<R> {
    fn state(&self) -> PresenceState {
        match self.rangefinder.distance_cm() {
            // A zero reading is a glitch of the ranger, not a car touching it
            Some(d) if d > 0.0 && d <= self.threshold_cm => PresenceState::Present,
            _ => PresenceState::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::GateConfig;

    struct FixedRange(Cell<Option<f32>>);

    impl Rangefinder for FixedRange {
        fn distance_cm(&self) -> Option<f32> {
            self.0.get()
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let sensor = ThresholdPresence::new(FixedRange(Cell::new(Some(30.0))), 30.0);
        assert!(sensor.is_present());

        sensor.rangefinder.0.set(Some(30.5));
        assert!(!sensor.is_present());

        sensor.rangefinder.0.set(Some(4.0));
        assert_eq!(sensor.state(), PresenceState::Present);
    }

    #[test]
    fn test_missing_echo_and_zero_read_as_clear() {
        let sensor = ThresholdPresence::new(FixedRange(Cell::new(None)), 30.0);
        assert_eq!(sensor.state(), PresenceState::Clear);

        sensor.rangefinder.0.set(Some(0.0));
        assert_eq!(sensor.state(), PresenceState::Clear);
    }

    #[test]
    fn test_echo_round_trip() {
        assert_eq!(echo_round_trip(0.0), Duration::ZERO);
        assert_eq!(echo_round_trip(-5.0), Duration::ZERO);
        // 60cm out and back
        assert_eq!(echo_round_trip(60.0).as_micros(), 3_498);
    }

    #[test]
    fn test_listening_past_both_thresholds_fits_one_poll() {
        let config = GateConfig::default();
        let listen = echo_round_trip(config.entry_threshold_cm * 2.0)
            + echo_round_trip(config.exit_threshold_cm * 2.0);
        assert!(listen * 2 < config.poll_period);
    }
}
