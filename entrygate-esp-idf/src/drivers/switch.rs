use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use entrygate::hal::switch::{Switch, SwitchState};

/// Active-low switch to ground: the ticket button or the override lever.
pub struct EspSwitch {
    input: PinDriver<'static, AnyIOPin, Input>,
}

impl EspSwitch {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<EspSwitch> {
        let mut input = PinDriver::input(pin)?;
        input.set_pull(Pull::Up)?;
        Ok(Self { input })
    }
}

impl Switch for EspSwitch {
    fn state(&self) -> SwitchState {
        if self.input.is_low() {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }
}
