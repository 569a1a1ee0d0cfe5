use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_svc::timer::OnceTimer;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
use entrygate::hal::buzzer::Buzzer;

type BuzzerPin = Arc<Mutex<PinDriver<'static, AnyOutputPin, Output>>>;

/// Active buzzer on a GPIO. A one-shot timer silences it, so `beep` never blocks.
pub struct EspBuzzer {
    pin: BuzzerPin,
    silence: RefCell<EspTimer>,
}

impl EspBuzzer {
    pub fn new(pin: AnyOutputPin, timers: &EspTaskTimerService) -> anyhow::Result<EspBuzzer> {
        let mut driver = PinDriver::output(pin)?;
        driver.set_low()?;
        let pin = Arc::new(Mutex::new(driver));

        let timer_pin = pin.clone();
        let silence = timers.timer(move || {
            if let Ok(mut pin) = timer_pin.lock() {
                pin.set_low().ok();
            }
        })?;

        Ok(Self {
            pin,
            silence: RefCell::new(silence),
        })
    }
}

impl Buzzer for EspBuzzer {
    fn beep(&self, duration: Duration) {
        if let Ok(mut pin) = self.pin.lock() {
            if let Err(e) = pin.set_high() {
                log::error!("buzzer: {e}");
                return;
            }
        }

        if let Ok(mut silence) = self.silence.try_borrow_mut() {
            if let Err(e) = silence.after(duration) {
                log::error!("buzzer timer: {e}");
            }
        }
    }
}
