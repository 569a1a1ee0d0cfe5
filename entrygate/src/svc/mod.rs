pub use clock::{Clock, Instant, ManualClock, StdClock};
pub use counter_store::{CounterStore, MemoryCounterStore};
pub use events::{EventRecord, EventSink, GateEvent, LogEventSink};
pub use wall_clock::{
    select_wall_clock, Date, NetworkWallClock, StaticWallClock, SystemTimeSource, TimeOfDay,
    TimeSource, WallClock, WallTime,
};

pub mod clock;
pub mod counter_store;
pub mod events;
pub mod wall_clock;
