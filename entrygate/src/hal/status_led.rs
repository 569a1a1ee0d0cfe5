use crate::hal::barrier::Position;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Indication {
    Off,
    Red,
    Green,
}

impl From<Position> for Indication {
    fn from(position: Position) -> Self {
        match position {
            Position::Open => Indication::Green,
            Position::Closed => Indication::Red,
        }
    }
}

pub trait StatusLed {
    fn indicate(&self, indication: Indication);
}
