use std::cell::RefCell;

use esp_idf_hal::gpio::AnyOutputPin;
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, CHANNEL0, TIMER0};
use esp_idf_hal::prelude::*;
use entrygate::hal::barrier::{Barrier, Position};

/// Hobby servo driving the barrier arm: 50Hz, 1ms pulse closed, 2ms pulse open.
pub struct ServoBarrier {
    _timer: LedcTimerDriver<'static>,
    driver: RefCell<LedcDriver<'static>>,
    closed_duty: u32,
    open_duty: u32,
}

impl ServoBarrier {
    pub fn new(channel: CHANNEL0, timer: TIMER0, pin: AnyOutputPin) -> anyhow::Result<ServoBarrier> {
        let config = TimerConfig::default()
            .frequency(50.Hz().into())
            .resolution(Resolution::Bits14);
        let timer = LedcTimerDriver::new(timer, &config)?;
        let driver = LedcDriver::new(channel, &timer, pin)?;

        // One period is 20ms
        let max_duty = driver.get_max_duty();

        Ok(Self {
            _timer: timer,
            driver: RefCell::new(driver),
            closed_duty: max_duty / 20,
            open_duty: max_duty / 10,
        })
    }
}

impl Barrier for ServoBarrier {
    fn set_position(&self, position: Position) {
        let duty = match position {
            Position::Closed => self.closed_duty,
            Position::Open => self.open_duty,
        };

        match self.driver.try_borrow_mut() {
            Ok(mut driver) => {
                if let Err(e) = driver.set_duty(duty) {
                    log::error!("servo: {e}");
                }
            }
            Err(e) => log::error!("servo busy: {e}"),
        }
    }
}
