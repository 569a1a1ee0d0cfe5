use std::time::Instant;

use esp_idf_sys as _;
use entrygate::app::App;
use entrygate::config::GateConfig;
use entrygate::hal::wifi::WifiConfig;

use entrygate_esp_idf::platform::{Config, PlatformImpl, SensorKind};

fn main() -> anyhow::Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let gate = match option_env!("ENTRYGATE_CONFIG") {
        Some(json) => GateConfig::from_json(json)?,
        None => GateConfig::default(),
    };

    let config = Config {
        gate,
        wifi: WifiConfig::from_env_var().transpose()?,
        #[cfg(feature = "ultrasonic")]
        sensor_kind: SensorKind::Ultrasonic,
        #[cfg(not(feature = "ultrasonic"))]
        sensor_kind: SensorKind::Digital,
        override_lever: cfg!(feature = "override-lever"),
        persist_counter: cfg!(feature = "nvs-counter"),
    };

    log::info!("Create platform");
    let platform = PlatformImpl::new(&config)?;

    log::info!("Create app");
    let period = config.gate.poll_period;
    let mut app = App::new(&platform, config.gate);

    log::info!("Start loop");

    loop {
        let next_wakeup = Instant::now() + period;

        {
            let start = Instant::now();
            app.update();

            log::trace!("app update took {}ms", (Instant::now() - start).as_millis());
        }

        if let Some(delay) = next_wakeup.checked_duration_since(Instant::now()) {
            std::thread::sleep(delay);
        } else {
            log::error!("no delay");
        }
    }
}
