use std::cell::RefCell;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use entrygate::hal::status_led::{Indication, StatusLed};

type Led = PinDriver<'static, AnyOutputPin, Output>;

/// Red/green pair next to the barrier.
pub struct EspStatusLed {
    leds: RefCell<(Led, Led)>,
}

impl EspStatusLed {
    pub fn new(red: AnyOutputPin, green: AnyOutputPin) -> anyhow::Result<EspStatusLed> {
        let red = PinDriver::output(red)?;
        let green = PinDriver::output(green)?;
        Ok(Self {
            leds: RefCell::new((red, green)),
        })
    }
}

impl StatusLed for EspStatusLed {
    fn indicate(&self, indication: Indication) {
        let Ok(mut leds) = self.leds.try_borrow_mut() else {
            return;
        };
        let (red, green) = &mut *leds;

        let (red_on, green_on) = match indication {
            Indication::Off => (false, false),
            Indication::Red => (true, false),
            Indication::Green => (false, true),
        };

        let result = red
            .set_level(red_on.into())
            .and_then(|_| green.set_level(green_on.into()));

        if let Err(e) = result {
            log::error!("status led: {e}");
        }
    }
}
