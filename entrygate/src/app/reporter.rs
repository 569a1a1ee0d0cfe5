use std::fmt;
use std::time::Duration;

use crate::svc::Instant;

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    VehicleWaiting,
    RequestWithoutVehicle,
    Idle,
    OverrideActive,
}

impl Status {
    pub fn idle(vehicle_present: bool, request_pressed: bool) -> Self {
        match (vehicle_present, request_pressed) {
            (true, _) => Status::VehicleWaiting,
            (false, true) => Status::RequestWithoutVehicle,
            (false, false) => Status::Idle,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::VehicleWaiting => "vehicle waiting, press the button for a ticket",
            Status::RequestWithoutVehicle => "button pressed but no vehicle at the entry",
            Status::Idle => "system idle",
            Status::OverrideActive => "manual override, barrier held open",
        };
        f.write_str(text)
    }
}

/// Rate limits status narration without ever blocking the caller.
pub struct StatusReporter {
    interval: Duration,
    last_report: Option<Instant>,
}

impl StatusReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: None,
        }
    }

    /// Returns `status` when a report is due.
    pub fn poll(&mut self, now: Instant, status: Status) -> Option<Status> {
        let due = self
            .last_report
            .map_or(true, |t| now.duration_since(t) >= self.interval);

        if due {
            self.last_report = Some(now);
            Some(status)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_status_is_exclusive() {
        assert_eq!(Status::idle(true, true), Status::VehicleWaiting);
        assert_eq!(Status::idle(true, false), Status::VehicleWaiting);
        assert_eq!(Status::idle(false, true), Status::RequestWithoutVehicle);
        assert_eq!(Status::idle(false, false), Status::Idle);
    }

    #[test]
    fn test_reports_once_per_interval() {
        let mut reporter = StatusReporter::new(Duration::from_millis(5_000));

        let reports = (0..600)
            .filter_map(|i| reporter.poll(Instant::from_millis(i * 20), Status::Idle))
            .count();

        // t = 0, 5000, 10000
        assert_eq!(reports, 3);
    }

    #[test]
    fn test_first_poll_reports_immediately() {
        let mut reporter = StatusReporter::new(Duration::from_secs(60));
        assert_eq!(
            reporter.poll(Instant::from_millis(123), Status::OverrideActive),
            Some(Status::OverrideActive)
        );
        assert_eq!(reporter.poll(Instant::from_millis(124), Status::Idle), None);
    }
}
