/// A contact input: the ticket request button or the manual override lever.
pub trait Switch {
    fn is_on(&self) -> bool {
        self.state() == SwitchState::On
    }

    fn state(&self) -> SwitchState;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum SwitchState {
    #[default]
    Off,
    On,
}
