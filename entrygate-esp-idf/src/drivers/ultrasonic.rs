//! HC-SR04 ultrasonic rangefinder.
//!
//! A 10µs pulse on TRIG starts a measurement; ECHO then stays high for the
//! round-trip time of the sound burst. Reads busy-wait only as long as an echo
//! from `max_range_cm` takes, so both sensors fit in one poll period. Anything
//! farther reads as nothing in range.
//!
//! Without an echo the module holds ECHO high for about 38ms. A read that
//! finds ECHO still high skips the trigger and repeats the previous result.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use entrygate::hal::presence::{echo_round_trip, Rangefinder, SPEED_OF_SOUND_CM_PER_US};

// Delay between the end of the trigger pulse and the rising edge of ECHO
const ECHO_START: Duration = Duration::from_micros(600);

pub struct HcSr04 {
    trigger: RefCell<PinDriver<'static, AnyOutputPin, Output>>,
    echo: PinDriver<'static, AnyInputPin, Input>,
    echo_timeout: Duration,
    last: Cell<Option<f32>>,
}

impl HcSr04 {
    pub fn new(
        trigger: AnyOutputPin,
        echo: AnyInputPin,
        max_range_cm: f32,
    ) -> anyhow::Result<HcSr04> {
        let mut trigger = PinDriver::output(trigger)?;
        trigger.set_low()?;
        let echo = PinDriver::input(echo)?;

        let echo_timeout = ECHO_START + echo_round_trip(max_range_cm);

        Ok(Self {
            trigger: RefCell::new(trigger),
            echo,
            echo_timeout,
            last: Cell::new(None),
        })
    }

    fn pulse_trigger(&self) -> anyhow::Result<()> {
        let mut trigger = self.trigger.try_borrow_mut()?;
        trigger.set_low()?;
        Ets::delay_us(2);
        trigger.set_high()?;
        Ets::delay_us(10);
        trigger.set_low()?;
        Ok(())
    }

    fn measure(&self) -> Option<f32> {
        if let Err(e) = self.pulse_trigger() {
            log::error!("ultrasonic trigger: {e}");
            return None;
        }

        let deadline = Instant::now() + self.echo_timeout;
        let rise = wait_until(deadline, || self.echo.is_high())?;
        let fall = wait_until(deadline, || self.echo.is_low())?;

        let round_trip_us = fall.duration_since(rise).as_micros() as f32;
        Some(round_trip_us * SPEED_OF_SOUND_CM_PER_US / 2.0)
    }
}

fn wait_until(deadline: Instant, condition: impl Fn() -> bool) -> Option<Instant> {
    while !condition() {
        if Instant::now() > deadline {
            return None;
        }
    }
    Some(Instant::now())
}

impl Rangefinder for HcSr04 {
    fn distance_cm(&self) -> Option<f32> {
        if self.echo.is_high() {
            return self.last.get();
        }

        let distance = self.measure();
        self.last.set(distance);
        distance
    }
}
