use std::cell::RefCell;

use anyhow::Context;
use embedded_svc::storage::RawStorage;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use entrygate::svc::{CounterStore, Date};

const NAMESPACE: &str = "entrygate";
const COUNTER_KEY: &str = "daily_count";
const RESET_DATE_KEY: &str = "reset_date";

/// Daily counter kept in the default NVS partition, little-endian u32. The
/// reset date sits next to it as its `dd/mm/yyyy` text.
pub struct NvsCounterStore {
    nvs: RefCell<EspNvs<NvsDefault>>,
}

impl NvsCounterStore {
    pub fn new(partition: EspDefaultNvsPartition) -> anyhow::Result<NvsCounterStore> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        Ok(Self {
            nvs: RefCell::new(nvs),
        })
    }
}

impl CounterStore for NvsCounterStore {
    fn load_counter(&self) -> anyhow::Result<u32> {
        let nvs = self.nvs.try_borrow()?;
        let mut buf = [0u8; 4];

        match nvs.get_raw(COUNTER_KEY, &mut buf)? {
            Some(bytes) => {
                let bytes: [u8; 4] = bytes.try_into().context("corrupt counter entry")?;
                Ok(u32::from_le_bytes(bytes))
            }
            None => Ok(0),
        }
    }

    fn save_counter(&self, value: u32) -> anyhow::Result<()> {
        let mut nvs = self.nvs.try_borrow_mut()?;
        nvs.set_raw(COUNTER_KEY, &value.to_le_bytes())?;
        Ok(())
    }

    fn load_reset_date(&self) -> anyhow::Result<Option<Date>> {
        let nvs = self.nvs.try_borrow()?;
        let mut buf = [0u8; 16];

        match nvs.get_raw(RESET_DATE_KEY, &mut buf)? {
            Some(bytes) => {
                let text = std::str::from_utf8(bytes).context("corrupt reset date entry")?;
                Ok(Some(text.parse::<Date>()?))
            }
            None => Ok(None),
        }
    }

    fn save_reset_date(&self, date: Date) -> anyhow::Result<()> {
        let mut nvs = self.nvs.try_borrow_mut()?;
        nvs.set_raw(RESET_DATE_KEY, date.to_string().as_bytes())?;
        Ok(())
    }
}
