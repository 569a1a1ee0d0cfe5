use std::cell::RefCell;
use std::time::Duration;

use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::WifiWait;
use entrygate::hal::wifi::{Wifi, WifiConfig};

const START_TIMEOUT: Duration = Duration::from_secs(20);

pub struct EspWifi {
    esp_wifi: RefCell<esp_idf_svc::wifi::EspWifi<'static>>,
    sys_loop: EspSystemEventLoop,
}

fn to_esp_wifi_config(src: &WifiConfig) -> Configuration {
    let &WifiConfig { ssid, password } = src;

    let auth_method = if password.is_empty() {
        log::info!("Wi-Fi password is empty. Authentication is disabled.");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    Configuration::Client(ClientConfiguration {
        ssid: ssid.into(),
        password: password.into(),
        auth_method,
        ..Default::default()
    })
}

impl EspWifi {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<EspWifi> {
        let esp_wifi = esp_idf_svc::wifi::EspWifi::new(modem, sys_loop.clone(), Some(nvs))?;
        Ok(Self {
            esp_wifi: RefCell::new(esp_wifi),
            sys_loop,
        })
    }
}

impl Wifi for EspWifi {
    fn connect(&self, config: &WifiConfig) -> anyhow::Result<()> {
        let config = to_esp_wifi_config(config);

        let mut esp_wifi = self.esp_wifi.try_borrow_mut()?;

        esp_wifi.set_configuration(&config)?;
        esp_wifi.start()?;

        let started = {
            let matcher = || esp_wifi.is_started().unwrap_or(false);
            WifiWait::new(&self.sys_loop)?.wait_with_timeout(START_TIMEOUT, matcher)
        };

        anyhow::ensure!(started, "Wi-Fi did not start");

        esp_wifi.connect()?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.esp_wifi
            .try_borrow()
            .map(|esp_wifi| esp_wifi.is_connected().unwrap_or(false))
            .unwrap_or(false)
    }
}
