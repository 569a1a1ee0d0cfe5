use std::time::Duration;

use anyhow::anyhow;
use esp_idf_hal::gpio::{IOPin, InputPin, OutputPin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::timer::EspTaskTimerService;
use entrygate::config::GateConfig;
use entrygate::hal::barrier::Barrier;
use entrygate::hal::buzzer::Buzzer;
use entrygate::hal::presence::{PresenceSensor, ThresholdPresence, Zone};
use entrygate::hal::status_led::StatusLed;
use entrygate::hal::switch::Switch;
use entrygate::hal::wifi::{connect_and_wait, WifiConfig};
use entrygate::hal::Platform;
use entrygate::svc::{
    select_wall_clock, Clock, CounterStore, EventSink, LogEventSink, StaticWallClock, StdClock,
    WallClock,
};

use crate::drivers::barrier::ServoBarrier;
use crate::drivers::buzzer::EspBuzzer;
use crate::drivers::nvs::NvsCounterStore;
use crate::drivers::presence::EspPresenceSwitch;
use crate::drivers::sntp::SntpTimeSource;
use crate::drivers::status_led::EspStatusLed;
use crate::drivers::switch::EspSwitch;
use crate::drivers::ultrasonic::HcSr04;
use crate::drivers::wifi::EspWifi;

const WIFI_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const SNTP_SYNC_TIMEOUT: Duration = Duration::from_secs(15);

// Rangefinders listen this far past the presence threshold
const RANGE_MARGIN: f32 = 2.0;

pub enum SensorKind {
    Digital,
    Ultrasonic,
}

pub struct Config {
    pub gate: GateConfig,
    pub wifi: Option<WifiConfig<'static>>,
    pub sensor_kind: SensorKind,
    pub override_lever: bool,
    pub persist_counter: bool,
}

/// Board wiring (ESP32-C3):
///
/// | GPIO | digital build        | ultrasonic build   |
/// |------|----------------------|--------------------|
/// | 0    | entry loop           | entry TRIG         |
/// | 1    | exit loop            | entry ECHO         |
/// | 2    |                      | exit TRIG          |
/// | 3    |                      | exit ECHO          |
/// | 4    | ticket button        | ticket button      |
/// | 5    | override lever       | override lever     |
/// | 6    | barrier servo        | barrier servo      |
/// | 7    | buzzer               | buzzer             |
/// | 10   | red LED              | red LED            |
/// | 8    | green LED            | green LED          |
pub struct PlatformImpl {
    entry: Box<dyn PresenceSensor>,
    exit: Box<dyn PresenceSensor>,
    button: EspSwitch,
    lever: Option<EspSwitch>,
    barrier: ServoBarrier,
    status_led: EspStatusLed,
    buzzer: EspBuzzer,
    clock: StdClock,
    wall_clock: Box<dyn WallClock>,
    counter_store: Option<NvsCounterStore>,
    event_sink: LogEventSink,
    _wifi: EspWifi,
}

impl PlatformImpl {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let peripherals = Peripherals::take().ok_or_else(|| anyhow!("Peripherals already taken"))?;
        let pins = peripherals.pins;

        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let timers = EspTaskTimerService::new()?;

        let wifi = EspWifi::new(peripherals.modem, sys_loop, nvs.clone())?;
        let time_source = config.wifi.as_ref().and_then(|wifi_config| {
            start_network_time(&wifi, wifi_config)
                .map_err(|e| log::error!("Network time unavailable: {e:#}"))
                .ok()
        });
        let fallback = StaticWallClock::new(config.gate.fallback_date, config.gate.fallback_time);
        let wall_clock = select_wall_clock(time_source, config.gate.utc_offset_secs(), fallback);

        let (entry, exit): (Box<dyn PresenceSensor>, Box<dyn PresenceSensor>) =
            match config.sensor_kind {
                SensorKind::Digital => (
                    Box::new(EspPresenceSwitch::new(pins.gpio0.downgrade())?),
                    Box::new(EspPresenceSwitch::new(pins.gpio1.downgrade())?),
                ),
                SensorKind::Ultrasonic => (
                    Box::new(ThresholdPresence::new(
                        HcSr04::new(
                            pins.gpio0.downgrade_output(),
                            pins.gpio1.downgrade_input(),
                            config.gate.entry_threshold_cm * RANGE_MARGIN,
                        )?,
                        config.gate.entry_threshold_cm,
                    )),
                    Box::new(ThresholdPresence::new(
                        HcSr04::new(
                            pins.gpio2.downgrade_output(),
                            pins.gpio3.downgrade_input(),
                            config.gate.exit_threshold_cm * RANGE_MARGIN,
                        )?,
                        config.gate.exit_threshold_cm,
                    )),
                ),
            };

        let button = EspSwitch::new(pins.gpio4.downgrade())?;
        let lever = if config.override_lever {
            Some(EspSwitch::new(pins.gpio5.downgrade())?)
        } else {
            None
        };

        let barrier = ServoBarrier::new(
            peripherals.ledc.channel0,
            peripherals.ledc.timer0,
            pins.gpio6.downgrade_output(),
        )?;
        let buzzer = EspBuzzer::new(pins.gpio7.downgrade_output(), &timers)?;
        let status_led =
            EspStatusLed::new(pins.gpio10.downgrade_output(), pins.gpio8.downgrade_output())?;

        let counter_store = if config.persist_counter {
            NvsCounterStore::new(nvs)
                .map_err(|e| log::error!("Counter will not be persisted: {e:#}"))
                .ok()
        } else {
            None
        };

        Ok(Self {
            entry,
            exit,
            button,
            lever,
            barrier,
            status_led,
            buzzer,
            clock: StdClock::default(),
            wall_clock,
            counter_store,
            event_sink: LogEventSink,
            _wifi: wifi,
        })
    }
}

fn start_network_time(wifi: &EspWifi, config: &WifiConfig) -> anyhow::Result<SntpTimeSource> {
    connect_and_wait(wifi, config, WIFI_CONNECT_TIMEOUT)?;
    let sntp = SntpTimeSource::start()?;
    if !sntp.wait_for_sync(SNTP_SYNC_TIMEOUT) {
        log::warn!("SNTP not synchronised after {}s", SNTP_SYNC_TIMEOUT.as_secs());
    }
    Ok(sntp)
}

impl Platform for PlatformImpl {
    fn presence(&self, zone: Zone) -> &(dyn PresenceSensor + '_) {
        match zone {
            Zone::Entry => self.entry.as_ref(),
            Zone::Exit => self.exit.as_ref(),
        }
    }

    fn request_button(&self) -> &(dyn Switch + '_) {
        &self.button
    }

    fn override_lever(&self) -> Option<&(dyn Switch + '_)> {
        self.lever.as_ref().map(|lever| lever as &dyn Switch)
    }

    fn barrier(&self) -> &(dyn Barrier + '_) {
        &self.barrier
    }

    fn status_led(&self) -> &(dyn StatusLed + '_) {
        &self.status_led
    }

    fn buzzer(&self) -> &(dyn Buzzer + '_) {
        &self.buzzer
    }

    fn clock(&self) -> &(dyn Clock + '_) {
        &self.clock
    }

    fn wall_clock(&self) -> &(dyn WallClock + '_) {
        self.wall_clock.as_ref()
    }

    fn counter_store(&self) -> Option<&(dyn CounterStore + '_)> {
        self.counter_store
            .as_ref()
            .map(|store| store as &dyn CounterStore)
    }

    fn event_sink(&self) -> &(dyn EventSink + '_) {
        &self.event_sink
    }
}
