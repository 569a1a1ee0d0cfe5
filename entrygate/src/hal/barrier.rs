#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum Position {
    #[default]
    Closed,
    Open,
}

/// Two-position barrier actuator. Commands are fire-and-forget: the arm is
/// assumed to reach the position within the configured settle delay.
pub trait Barrier {
    fn set_position(&self, position: Position);
}
