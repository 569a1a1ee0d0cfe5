use std::time::Duration;

pub trait Buzzer {
    /// Start a beep and return immediately; the driver silences itself after `duration`.
    fn beep(&self, duration: Duration);
}
