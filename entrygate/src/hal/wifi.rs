use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, ensure};

const LINK_POLL: Duration = Duration::from_millis(50);

/// Station link used to reach the network time servers.
pub trait Wifi {
    fn connect(&self, config: &WifiConfig) -> anyhow::Result<()>;

    fn is_connected(&self) -> bool;
}

/// Starts joining the network and blocks until the link is up or `timeout`
/// has passed. Meant for boot, before the control loop runs.
pub fn connect_and_wait(
    wifi: &dyn Wifi,
    config: &WifiConfig,
    timeout: Duration,
) -> anyhow::Result<()> {
    wifi.connect(config)?;

    let deadline = Instant::now() + timeout;
    while !wifi.is_connected() {
        if Instant::now() >= deadline {
            bail!("not connected to {} after {}ms", config.ssid, timeout.as_millis());
        }
        std::thread::sleep(LINK_POLL);
    }

    log::info!("Wi-Fi connected to {}", config.ssid);
    Ok(())
}

#[derive(Eq, PartialEq, Debug)]
pub struct WifiConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl<'a> WifiConfig<'a> {
    /// Parses `ssid:password`. The password may itself contain colons.
    pub fn parse(s: &'a str) -> anyhow::Result<Self> {
        let (ssid, password) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected ssid:password"))?;
        ensure!(!ssid.is_empty(), "Wi-Fi SSID must be non-empty");
        Ok(WifiConfig { ssid, password })
    }
}

impl WifiConfig<'static> {
    /// Reads the credentials baked in at build time, if any.
    pub fn from_env_var() -> Option<anyhow::Result<Self>> {
        option_env!("ENTRYGATE_WIFI_CONFIG").map(WifiConfig::parse)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Link comes up after `polls_until_up` calls to `is_connected`.
    struct FakeWifi {
        connect_calls: Cell<u32>,
        polls_until_up: Cell<u32>,
    }

    impl FakeWifi {
        fn new(polls_until_up: u32) -> Self {
            Self {
                connect_calls: Cell::new(0),
                polls_until_up: Cell::new(polls_until_up),
            }
        }
    }

    impl Wifi for FakeWifi {
        fn connect(&self, _config: &WifiConfig) -> anyhow::Result<()> {
            self.connect_calls.set(self.connect_calls.get() + 1);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            let left = self.polls_until_up.get();
            self.polls_until_up.set(left.saturating_sub(1));
            left == 0
        }
    }

    const CONFIG: WifiConfig<'static> = WifiConfig {
        ssid: "gatehouse",
        password: "secret",
    };

    #[test_log::test]
    fn test_connect_and_wait_returns_once_link_is_up() {
        let wifi = FakeWifi::new(2);
        connect_and_wait(&wifi, &CONFIG, Duration::from_secs(5)).unwrap();
        assert_eq!(wifi.connect_calls.get(), 1);
    }

    #[test_log::test]
    fn test_connect_and_wait_gives_up_without_link() {
        let wifi = FakeWifi::new(u32::MAX);
        let err = connect_and_wait(&wifi, &CONFIG, Duration::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "not connected to gatehouse after 0ms");
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let config = WifiConfig::parse("gatehouse:s3cr:et").unwrap();
        assert_eq!(config.ssid, "gatehouse");
        assert_eq!(config.password, "s3cr:et");
    }

    #[test]
    fn test_parse_allows_open_network() {
        let config = WifiConfig::parse("guest:").unwrap();
        assert_eq!(config.password, "");
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(WifiConfig::parse("no-separator").is_err());
        assert!(WifiConfig::parse(":password").is_err());
    }
}
