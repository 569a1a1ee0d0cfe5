use std::fmt;

use crate::app::reporter::Status;
use crate::svc::wall_clock::{Date, WallTime};

/// Everything the gate narrates. Nothing in the control logic reads these back.
#[derive(Clone, Eq, PartialEq, Debug, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    Startup { daily_count: u32 },
    TransitAdmitted { ticket: u32 },
    EntryCleared,
    TransitCompleted { daily_count: u32 },
    TransitTimedOut,
    FraudDetected,
    WarningBeep { remaining: u8 },
    GateOpened,
    GateClosed,
    OverrideEngaged,
    OverrideReleased,
    DailyReset { date: Date },
    Status { status: Status },
}

impl fmt::Display for GateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateEvent::Startup { daily_count } => {
                write!(f, "gate controller started, {daily_count} vehicles today")
            }
            GateEvent::TransitAdmitted { ticket } => write!(f, "ticket #{ticket} issued"),
            GateEvent::EntryCleared => write!(f, "vehicle cleared entry zone"),
            GateEvent::TransitCompleted { daily_count } => {
                write!(f, "vehicle passed, {daily_count} vehicles today")
            }
            GateEvent::TransitTimedOut => write!(f, "transit timed out"),
            GateEvent::FraudDetected => write!(f, "second vehicle detected, closing now"),
            GateEvent::WarningBeep { remaining } => {
                write!(f, "closing warning, {remaining} beeps left")
            }
            GateEvent::GateOpened => write!(f, "barrier open"),
            GateEvent::GateClosed => write!(f, "barrier closed"),
            GateEvent::OverrideEngaged => write!(f, "manual override engaged"),
            GateEvent::OverrideReleased => write!(f, "manual override released"),
            GateEvent::DailyReset { date } => write!(f, "new day {date}, counter reset"),
            GateEvent::Status { status } => write!(f, "{status}"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub struct EventRecord {
    pub timestamp: WallTime,
    #[serde(flatten)]
    pub event: GateEvent,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.event)
    }
}

pub trait EventSink {
    fn emit(&self, record: &EventRecord);
}

/// Narrates events through the `log` facade.
#[derive(Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, record: &EventRecord) {
        match record.event {
            GateEvent::FraudDetected | GateEvent::TransitTimedOut => log::warn!("{record}"),
            _ => log::info!("{record}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::svc::wall_clock::TimeOfDay;

    fn record(event: GateEvent) -> EventRecord {
        EventRecord {
            timestamp: WallTime {
                date: "02/01/2025".parse().unwrap(),
                time: TimeOfDay::new(9, 30, 0).unwrap(),
            },
            event,
        }
    }

    #[test]
    fn test_record_display() {
        assert_snapshot!(
            record(GateEvent::TransitAdmitted { ticket: 8 }),
            @"[02/01/2025 09:30:00] ticket #8 issued"
        );
        assert_snapshot!(
            record(GateEvent::Status { status: Status::VehicleWaiting }),
            @"[02/01/2025 09:30:00] vehicle waiting, press the button for a ticket"
        );
    }

    #[test]
    fn test_record_serializes_flat() {
        let json = serde_json::to_string(&record(GateEvent::DailyReset {
            date: "02/01/2025".parse().unwrap(),
        }))
        .unwrap();
        assert_snapshot!(
            json,
            @r###"{"timestamp":{"date":"02/01/2025","time":"09:30:00"},"event":"daily_reset","date":"02/01/2025"}"###
        );
    }

    #[test_log::test]
    fn test_log_sink_accepts_every_event() {
        let sink = LogEventSink;
        sink.emit(&record(GateEvent::FraudDetected));
        sink.emit(&record(GateEvent::GateClosed));
    }
}
