use crate::hal::barrier::Barrier;
use crate::hal::buzzer::Buzzer;
use crate::hal::presence::{PresenceSensor, Zone};
use crate::hal::status_led::StatusLed;
use crate::hal::switch::Switch;
use crate::svc::{Clock, CounterStore, EventSink, WallClock};

pub mod barrier;
pub mod buzzer;
pub mod presence;
pub mod status_led;
pub mod switch;
pub mod wifi;

/// Everything the gate logic talks to. Boards implement this once; tests use fakes.
pub trait Platform {
    fn presence(&self, zone: Zone) -> &(dyn PresenceSensor + '_);
    fn request_button(&self) -> &(dyn Switch + '_);
    /// `None` on builds without an override lever.
    fn override_lever(&self) -> Option<&(dyn Switch + '_)>;
    fn barrier(&self) -> &(dyn Barrier + '_);
    fn status_led(&self) -> &(dyn StatusLed + '_);
    fn buzzer(&self) -> &(dyn Buzzer + '_);
    fn clock(&self) -> &(dyn Clock + '_);
    fn wall_clock(&self) -> &(dyn WallClock + '_);
    /// `None` on builds without non-volatile storage.
    fn counter_store(&self) -> Option<&(dyn CounterStore + '_)>;
    fn event_sink(&self) -> &(dyn EventSink + '_);
}
