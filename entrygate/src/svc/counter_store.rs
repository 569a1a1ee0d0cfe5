use std::cell::Cell;

use crate::svc::wall_clock::Date;

/// Non-volatile home of the daily vehicle counter and the date it was last
/// reset. Best effort: callers log failures and carry on with the in-memory
/// values.
pub trait CounterStore {
    fn load_counter(&self) -> anyhow::Result<u32>;
    fn save_counter(&self, value: u32) -> anyhow::Result<()>;

    /// `None` until a reset date has been saved once.
    fn load_reset_date(&self) -> anyhow::Result<Option<Date>>;
    fn save_reset_date(&self, date: Date) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct MemoryCounterStore {
    value: Cell<u32>,
    reset_date: Cell<Option<Date>>,
}

impl MemoryCounterStore {
    pub fn new(value: u32) -> Self {
        Self {
            value: Cell::new(value),
            reset_date: Cell::new(None),
        }
    }

    pub fn with_reset_date(self, date: Date) -> Self {
        self.reset_date.set(Some(date));
        self
    }

    pub fn value(&self) -> u32 {
        self.value.get()
    }

    pub fn reset_date(&self) -> Option<Date> {
        self.reset_date.get()
    }
}

impl CounterStore for MemoryCounterStore {
    fn load_counter(&self) -> anyhow::Result<u32> {
        Ok(self.value.get())
    }

    fn save_counter(&self, value: u32) -> anyhow::Result<()> {
        self.value.set(value);
        Ok(())
    }

    fn load_reset_date(&self) -> anyhow::Result<Option<Date>> {
        Ok(self.reset_date.get())
    }

    fn save_reset_date(&self, date: Date) -> anyhow::Result<()> {
        self.reset_date.set(Some(date));
        Ok(())
    }
}
