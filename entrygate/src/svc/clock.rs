use std::cell::Cell;
use std::ops::Add;
use std::time::Duration;

/// Monotonic milliseconds since the clock was created.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Instant(u64);

impl Instant {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn to_millis(&self) -> u64 {
        self.0
    }

    /// Zero when `earlier` is actually later.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Instant(self.0.saturating_add(ms))
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct StdClock {
    start: std::time::Instant,
}

impl Default for StdClock {
    fn default() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for StdClock {
    fn now(&self) -> Instant {
        let t_ms = self.start.elapsed().as_millis();
        Instant(u64::try_from(t_ms).unwrap_or(u64::MAX))
    }
}

/// A clock that only moves when told to. Lets the control loop run without
/// real time passing.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, t: Instant) {
        self.now.set(t);
    }

    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
