use std::time::Duration;

use crate::hal::barrier::{Barrier, Position};
use crate::hal::status_led::{Indication, StatusLed};
use crate::svc::Instant;

/// Owns the barrier position. The actuator and the indicators are commanded
/// on every call, so `position()` always mirrors the last command sent.
pub struct GateControl<'a> {
    barrier: &'a dyn Barrier,
    led: &'a dyn StatusLed,
    settle: Duration,
    position: Position,
    last_command: Option<Instant>,
}

impl<'a> GateControl<'a> {
    pub fn new(barrier: &'a dyn Barrier, led: &'a dyn StatusLed, settle: Duration) -> Self {
        Self {
            barrier,
            led,
            settle,
            position: Position::Closed,
            last_command: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn open(&mut self, now: Instant) {
        self.command(Position::Open, now);
    }

    pub fn close(&mut self, now: Instant) {
        self.command(Position::Closed, now);
    }

    /// Whether the arm has had time to stop moving since the last command.
    pub fn is_settled(&self, now: Instant) -> bool {
        self.last_command
            .map_or(true, |t| now.duration_since(t) >= self.settle)
    }

    fn command(&mut self, position: Position, now: Instant) {
        self.barrier.set_position(position);
        self.led.indicate(Indication::from(position));

        if position != self.position {
            log::debug!("barrier {:?} -> {:?}", self.position, position);
        }

        self.position = position;
        self.last_command = Some(now);
    }
}
