use std::cell::Cell;
use std::time::{Duration, Instant};

use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use entrygate::svc::{SystemTimeSource, TimeSource};

const SYNC_POLL: Duration = Duration::from_millis(100);

/// System time as set by SNTP. Reports nothing until the first sync completes.
pub struct SntpTimeSource {
    sntp: EspSntp,
    synced: Cell<bool>,
}

impl SntpTimeSource {
    pub fn start() -> anyhow::Result<SntpTimeSource> {
        let sntp = EspSntp::new_default()?;
        Ok(Self {
            sntp,
            synced: Cell::new(false),
        })
    }

    fn is_synced(&self) -> bool {
        if !self.synced.get() && self.sntp.get_sync_status() == SyncStatus::Completed {
            self.synced.set(true);
        }
        self.synced.get()
    }

    pub fn wait_for_sync(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.is_synced() {
                return true;
            }
            std::thread::sleep(SYNC_POLL);
        }
        self.is_synced()
    }
}

impl TimeSource for SntpTimeSource {
    fn unix_time(&self) -> Option<i64> {
        if self.is_synced() {
            SystemTimeSource.unix_time()
        } else {
            None
        }
    }
}
