use std::time::Duration;

use anyhow::{ensure, Context};

use crate::svc::{Date, TimeOfDay};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Budget for a whole transit, from admission to the exit sensor.
    #[serde(with = "millis")]
    pub operation_timeout: Duration,
    /// Time for the arm to finish moving before sensor reads are trusted.
    #[serde(with = "millis")]
    pub actuator_settle: Duration,
    /// Delay between the exit sensor firing and closing behind the vehicle.
    #[serde(with = "millis")]
    pub exit_settle: Duration,
    pub warning_beeps: u8,
    #[serde(with = "millis")]
    pub beep_duration: Duration,
    #[serde(with = "millis")]
    pub beep_gap: Duration,
    #[serde(with = "millis")]
    pub status_interval: Duration,
    #[serde(with = "millis")]
    pub poll_period: Duration,
    pub entry_threshold_cm: f32,
    pub exit_threshold_cm: f32,
    pub utc_offset_minutes: i32,
    pub fallback_date: Date,
    pub fallback_time: TimeOfDay,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(10),
            actuator_settle: Duration::from_millis(500),
            exit_settle: Duration::from_millis(1_000),
            warning_beeps: 3,
            beep_duration: Duration::from_millis(200),
            beep_gap: Duration::from_millis(200),
            status_interval: Duration::from_secs(5),
            poll_period: Duration::from_millis(20),
            entry_threshold_cm: 30.0,
            exit_threshold_cm: 30.0,
            utc_offset_minutes: 60,
            fallback_date: Date::from_dmy(1, 1, 2025),
            fallback_time: TimeOfDay::default(),
        }
    }
}

impl GateConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let config: GateConfig = serde_json::from_str(s).context("invalid gate config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.actuator_settle < self.operation_timeout,
            "actuator_settle must be shorter than operation_timeout"
        );
        ensure!(
            self.exit_settle < self.operation_timeout,
            "exit_settle must be shorter than operation_timeout"
        );
        ensure!(self.warning_beeps > 0, "warning_beeps must be at least 1");
        ensure!(!self.poll_period.is_zero(), "poll_period must be non-zero");
        ensure!(
            self.entry_threshold_cm > 0.0 && self.exit_threshold_cm > 0.0,
            "sensor thresholds must be positive"
        );
        Ok(())
    }

    pub fn utc_offset_secs(&self) -> i64 {
        i64::from(self.utc_offset_minutes) * 60
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GateConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GateConfig::from_json(
            r#"{ "operation_timeout": 15000, "warning_beeps": 5, "fallback_date": "03/03/2025" }"#,
        )
        .unwrap();
        assert_eq!(config.operation_timeout, Duration::from_secs(15));
        assert_eq!(config.warning_beeps, 5);
        assert_eq!(config.fallback_date.to_string(), "03/03/2025");
        assert_eq!(config.exit_settle, GateConfig::default().exit_settle);
    }

    #[test]
    fn test_rejects_settle_longer_than_timeout() {
        let err = GateConfig::from_json(r#"{ "operation_timeout": 400 }"#).unwrap_err();
        assert!(err.to_string().contains("actuator_settle"));
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(GateConfig::from_json(r#"{ "fallback_date": "2025-01-01" }"#).is_err());
    }

    #[test]
    fn test_serialized_durations_are_millis() {
        let json = serde_json::to_value(GateConfig::default()).unwrap();
        assert_eq!(json["operation_timeout"], 10_000);
        assert_eq!(json["fallback_time"], "00:00:00");
    }
}
