use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use entrygate::hal::presence::{PresenceSensor, PresenceState};

/// Contact or inductive-loop detector that pulls the line low while a vehicle is over it.
pub struct EspPresenceSwitch {
    input: PinDriver<'static, AnyIOPin, Input>,
}

impl EspPresenceSwitch {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<EspPresenceSwitch> {
        let mut input = PinDriver::input(pin)?;
        input.set_pull(Pull::Up)?;
        Ok(Self { input })
    }
}

impl PresenceSensor for EspPresenceSwitch {
    fn state(&self) -> PresenceState {
        if self.input.is_low() {
            PresenceState::Present
        } else {
            PresenceState::Clear
        }
    }
}
