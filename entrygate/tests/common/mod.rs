#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::time::Duration;

use anyhow::bail;
use entrygate::app::App;
use entrygate::config::GateConfig;
use entrygate::hal::barrier::{Barrier, Position};
use entrygate::hal::buzzer::Buzzer;
use entrygate::hal::presence::{PresenceSensor, PresenceState, Zone};
use entrygate::hal::status_led::{Indication, StatusLed};
use entrygate::hal::switch::{Switch, SwitchState};
use entrygate::hal::Platform;
use entrygate::svc::{
    Clock, CounterStore, Date, EventRecord, EventSink, GateEvent, Instant, ManualClock,
    MemoryCounterStore, TimeOfDay, WallClock, WallTime,
};

pub const POLL: Duration = Duration::from_millis(20);

#[derive(Default)]
pub struct FakeInput(Cell<bool>);

impl FakeInput {
    pub fn set(&self, on: bool) {
        self.0.set(on);
    }
}

impl PresenceSensor for FakeInput {
    fn state(&self) -> PresenceState {
        if self.0.get() {
            PresenceState::Present
        } else {
            PresenceState::Clear
        }
    }
}

impl Switch for FakeInput {
    fn state(&self) -> SwitchState {
        if self.0.get() {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }
}

#[derive(Default)]
pub struct Recorder {
    pub positions: RefCell<Vec<Position>>,
    pub indications: RefCell<Vec<Indication>>,
    pub beeps: RefCell<Vec<Duration>>,
    pub events: RefCell<Vec<GateEvent>>,
}

impl Barrier for Recorder {
    fn set_position(&self, position: Position) {
        self.positions.borrow_mut().push(position);
    }
}

impl StatusLed for Recorder {
    fn indicate(&self, indication: Indication) {
        self.indications.borrow_mut().push(indication);
    }
}

impl Buzzer for Recorder {
    fn beep(&self, duration: Duration) {
        self.beeps.borrow_mut().push(duration);
    }
}

impl EventSink for Recorder {
    fn emit(&self, record: &EventRecord) {
        self.events.borrow_mut().push(record.event.clone());
    }
}

pub struct FakeWallClock(Cell<Date>);

impl FakeWallClock {
    pub fn set_date(&self, date: &str) {
        self.0.set(date.parse().unwrap());
    }
}

impl WallClock for FakeWallClock {
    fn now(&self) -> WallTime {
        WallTime {
            date: self.0.get(),
            time: TimeOfDay::default(),
        }
    }
}

pub struct BrokenStore;

impl CounterStore for BrokenStore {
    fn load_counter(&self) -> anyhow::Result<u32> {
        bail!("eeprom not responding")
    }

    fn save_counter(&self, _value: u32) -> anyhow::Result<()> {
        bail!("eeprom not responding")
    }

    fn load_reset_date(&self) -> anyhow::Result<Option<Date>> {
        bail!("eeprom not responding")
    }

    fn save_reset_date(&self, _date: Date) -> anyhow::Result<()> {
        bail!("eeprom not responding")
    }
}

pub enum Store {
    None,
    Memory(MemoryCounterStore),
    Broken(BrokenStore),
}

pub struct FakePlatform {
    pub entry: FakeInput,
    pub exit: FakeInput,
    pub button: FakeInput,
    pub lever: Option<FakeInput>,
    pub hw: Recorder,
    pub clock: ManualClock,
    pub wall_clock: FakeWallClock,
    pub store: Store,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            entry: FakeInput::default(),
            exit: FakeInput::default(),
            button: FakeInput::default(),
            lever: Some(FakeInput::default()),
            hw: Recorder::default(),
            clock: ManualClock::new(Instant::from_millis(0)),
            wall_clock: FakeWallClock(Cell::new("01/01/2025".parse().unwrap())),
            store: Store::Memory(MemoryCounterStore::default()),
        }
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    pub fn without_lever(mut self) -> Self {
        self.lever = None;
        self
    }

    pub fn stored_count(&self) -> Option<u32> {
        match &self.store {
            Store::Memory(store) => Some(store.value()),
            _ => None,
        }
    }

    pub fn stored_reset_date(&self) -> Option<Date> {
        match &self.store {
            Store::Memory(store) => store.reset_date(),
            _ => None,
        }
    }

    pub fn events(&self) -> Vec<GateEvent> {
        self.hw.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.hw.events.borrow_mut().clear();
    }

    pub fn beeps(&self) -> usize {
        self.hw.beeps.borrow().len()
    }

    pub fn last_commanded(&self) -> Option<Position> {
        self.hw.positions.borrow().last().copied()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl Platform for FakePlatform {
    fn presence(&self, zone: Zone) -> &(dyn PresenceSensor + '_) {
        match zone {
            Zone::Entry => &self.entry,
            Zone::Exit => &self.exit,
        }
    }

    fn request_button(&self) -> &(dyn Switch + '_) {
        &self.button
    }

    fn override_lever(&self) -> Option<&(dyn Switch + '_)> {
        self.lever.as_ref().map(|lever| lever as &dyn Switch)
    }

    fn barrier(&self) -> &(dyn Barrier + '_) {
        &self.hw
    }

    fn status_led(&self) -> &(dyn StatusLed + '_) {
        &self.hw
    }

    fn buzzer(&self) -> &(dyn Buzzer + '_) {
        &self.hw
    }

    fn clock(&self) -> &(dyn Clock + '_) {
        &self.clock
    }

    fn wall_clock(&self) -> &(dyn WallClock + '_) {
        &self.wall_clock
    }

    fn counter_store(&self) -> Option<&(dyn CounterStore + '_)> {
        match &self.store {
            Store::None => None,
            Store::Memory(store) => Some(store as &dyn CounterStore),
            Store::Broken(store) => Some(store as &dyn CounterStore),
        }
    }

    fn event_sink(&self) -> &(dyn EventSink + '_) {
        &self.hw
    }
}

pub fn config() -> GateConfig {
    GateConfig::default()
}

/// Runs the loop for `duration` of simulated time, one tick per poll period.
pub fn run_for(app: &mut App, platform: &FakePlatform, duration: Duration) {
    let end = platform.now() + duration;
    while platform.now() < end {
        tick(app, platform);
    }
}

pub fn tick(app: &mut App, platform: &FakePlatform) {
    app.update();
    platform.clock.advance(POLL);
}

/// Ticks until `done` holds, giving up after `limit` of simulated time.
pub fn run_until(
    app: &mut App,
    platform: &FakePlatform,
    limit: Duration,
    done: impl Fn(&App) -> bool,
) -> bool {
    let end = platform.now() + limit;
    while platform.now() < end {
        tick(app, platform);
        if done(app) {
            return true;
        }
    }
    false
}
