use crate::svc::{CounterStore, Date};

/// Vehicles that completed a transit today.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DailyCounter {
    count: u32,
    last_reset_date: Date,
}

impl DailyCounter {
    pub fn new(count: u32, last_reset_date: Date) -> Self {
        Self {
            count,
            last_reset_date,
        }
    }

    /// Starts from the persisted count and reset date. Without a store the
    /// count starts at zero; without a saved date the day starts today.
    pub fn restore(store: Option<&dyn CounterStore>, today: Date) -> Self {
        let count = match store.map(|s| s.load_counter()) {
            Some(Ok(count)) => count,
            Some(Err(e)) => {
                log::warn!("Cannot load counter, starting from zero: {e:#}");
                0
            }
            None => 0,
        };

        let last_reset_date = match store.map(|s| s.load_reset_date()) {
            Some(Ok(Some(date))) => date,
            Some(Ok(None)) => {
                persist_reset_date(store, today);
                today
            }
            Some(Err(e)) => {
                log::warn!("Cannot load reset date, assuming {today}: {e:#}");
                today
            }
            None => today,
        };

        Self::new(count, last_reset_date)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_reset_date(&self) -> Date {
        self.last_reset_date
    }

    /// The number the vehicle being admitted will get if it makes it through.
    pub fn next_ticket(&self) -> u32 {
        self.count.saturating_add(1)
    }

    pub fn record_success(&mut self, store: Option<&dyn CounterStore>) -> u32 {
        self.count = self.count.saturating_add(1);
        persist(store, self.count);
        self.count
    }

    /// Resets the count when `today` differs from the last reset date.
    /// Returns whether a reset happened.
    pub fn roll_over(&mut self, today: Date, store: Option<&dyn CounterStore>) -> bool {
        if today == self.last_reset_date {
            return false;
        }

        self.count = 0;
        self.last_reset_date = today;
        persist(store, self.count);
        persist_reset_date(store, today);
        true
    }
}

fn persist(store: Option<&dyn CounterStore>, value: u32) {
    if let Some(store) = store {
        if let Err(e) = store.save_counter(value) {
            log::warn!("Cannot persist counter {value}: {e:#}");
        }
    }
}

fn persist_reset_date(store: Option<&dyn CounterStore>, date: Date) {
    if let Some(store) = store {
        if let Err(e) = store.save_reset_date(date) {
            log::warn!("Cannot persist reset date {date}: {e:#}");
        }
    }
}
