//! Supervision of one admitted vehicle, from the barrier opening to the
//! vehicle reaching the exit zone.
//!
//! A single deadline, measured from admission, covers both phases. Within a
//! tick the checks run in a fixed order: a vehicle at the entry while waiting
//! for the exit is tailgating and wins over everything else, then progress,
//! then the deadline.

use std::time::Duration;

use crate::svc::Instant;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Phase {
    AwaitingEntryClear,
    AwaitingExitDetect,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub enum Outcome {
    Pending,
    Success,
    Timeout,
    Fraud,
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        *self != Outcome::Pending
    }
}

/// Sensor values sampled once per tick, entry before exit.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Readings {
    pub entry: bool,
    pub exit: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TransitAttempt {
    start_time: Instant,
    phase: Phase,
    outcome: Outcome,
}

impl TransitAttempt {
    pub fn admit(now: Instant) -> Self {
        Self {
            start_time: now,
            phase: Phase::AwaitingEntryClear,
            outcome: Outcome::Pending,
        }
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Advances the attempt by one tick. Once resolved the outcome never changes.
    pub fn poll(&mut self, now: Instant, readings: Readings, timeout: Duration) -> Outcome {
        if self.outcome.is_resolved() {
            return self.outcome;
        }

        let expired = now.duration_since(self.start_time) > timeout;

        match self.phase {
            Phase::AwaitingEntryClear => {
                if !readings.entry {
                    self.phase = Phase::AwaitingExitDetect;
                } else if expired {
                    self.outcome = Outcome::Timeout;
                }
            }
            Phase::AwaitingExitDetect => {
                if readings.entry {
                    self.outcome = Outcome::Fraud;
                } else if readings.exit {
                    self.outcome = Outcome::Success;
                } else if expired {
                    self.outcome = Outcome::Timeout;
                }
            }
        }

        self.outcome
    }
}
