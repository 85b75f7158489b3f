//! Agent configuration loaded from environment variables.
//!
//! All fields have defaults matching a stock Raspberry Pi grow box with
//! Mosquitto running locally. Override via environment or a `.env` file.

use std::path::PathBuf;
use std::time::Duration;

use growbox_core::config::{parse_i2c_address, parse_or, secs_or, string_or, var};
use growbox_core::error::ConfigError;

/// Default broker host.
pub const DEFAULT_MQTT_HOST: &str = "localhost";

/// Default broker port (plain MQTT).
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default MQTT keep-alive.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Default time allowed for the broker to acknowledge the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest keep-alive the MQTT client accepts.
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Default Linux I2C bus device for the BME680.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Default BME680 address (SDO pulled low).
pub const DEFAULT_BME680_ADDRESS: u8 = 0x76;

/// Default IIO device directory exposed by the `dht11` kernel driver.
pub const DEFAULT_IIO_DEVICE: &str = "/sys/bus/iio/devices/iio:device0";

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

/// MQTT broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
}

impl BrokerConfig {
    /// Load broker settings.
    ///
    /// | Env Var                     | Default                   |
    /// |-----------------------------|---------------------------|
    /// | `MQTT_HOST`                 | `localhost`               |
    /// | `MQTT_PORT`                 | `1883`                    |
    /// | `MQTT_CLIENT_ID`            | `growbox-<model>-<pid>`   |
    /// | `MQTT_KEEP_ALIVE_SECS`      | `30`                      |
    /// | `MQTT_CONNECT_TIMEOUT_SECS` | `10`                      |
    pub fn from_lookup<F>(lookup: &F, model: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = string_or(lookup, "MQTT_HOST", DEFAULT_MQTT_HOST);
        let port = parse_or(lookup, "MQTT_PORT", DEFAULT_MQTT_PORT)?;
        let client_id = var(lookup, "MQTT_CLIENT_ID")
            .unwrap_or_else(|| format!("growbox-{model}-{}", std::process::id()));

        let keep_alive = secs_or(lookup, "MQTT_KEEP_ALIVE_SECS", DEFAULT_KEEP_ALIVE)?;
        if keep_alive.as_secs() < MIN_KEEP_ALIVE_SECS {
            return Err(ConfigError::InvalidValue {
                key: "MQTT_KEEP_ALIVE_SECS",
                value: keep_alive.as_secs().to_string(),
                reason: format!("must be at least {MIN_KEEP_ALIVE_SECS} seconds"),
            });
        }

        let connect_timeout =
            secs_or(lookup, "MQTT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?;

        Ok(Self {
            host,
            port,
            client_id,
            keep_alive,
            connect_timeout,
        })
    }

    /// `host:port`, used in logs and diagnostics.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Settings shared by both agent binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub broker: BrokerConfig,
    /// Fixed delay between the end of one tick and the start of the next.
    pub interval: Duration,
}

impl AgentConfig {
    /// Load the broker settings plus `SAMPLE_INTERVAL_SECS`, which defaults
    /// to `default_interval` for the given sensor model.
    pub fn from_lookup<F>(
        lookup: &F,
        model: &str,
        default_interval: Duration,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            broker: BrokerConfig::from_lookup(lookup, model)?,
            interval: secs_or(lookup, "SAMPLE_INTERVAL_SECS", default_interval)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Location of the BME680 on the I2C bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bme680Config {
    pub i2c_bus: PathBuf,
    pub address: u8,
}

impl Bme680Config {
    /// `BME680_I2C_BUS` (default `/dev/i2c-1`) and `BME680_I2C_ADDRESS`
    /// (default `0x76`).
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = match var(lookup, "BME680_I2C_ADDRESS") {
            Some(raw) => parse_i2c_address("BME680_I2C_ADDRESS", &raw)?,
            None => DEFAULT_BME680_ADDRESS,
        };
        Ok(Self {
            i2c_bus: PathBuf::from(string_or(lookup, "BME680_I2C_BUS", DEFAULT_I2C_BUS)),
            address,
        })
    }

    /// `bus @ 0xNN`, used in diagnostics.
    pub fn location(&self) -> String {
        format!("{} @ 0x{:02x}", self.i2c_bus.display(), self.address)
    }
}

/// Location of the AM2301 IIO device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Am2301Config {
    pub iio_device: PathBuf,
}

impl Am2301Config {
    /// `AM2301_IIO_DEVICE` (default `/sys/bus/iio/devices/iio:device0`).
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            iio_device: PathBuf::from(string_or(lookup, "AM2301_IIO_DEVICE", DEFAULT_IIO_DEVICE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let lookup = lookup_from(&[]);
        let cfg = AgentConfig::from_lookup(&lookup, "bme680", Duration::from_secs(5)).unwrap();

        assert_eq!(cfg.broker.host, "localhost");
        assert_eq!(cfg.broker.port, 1883);
        assert!(cfg.broker.client_id.starts_with("growbox-bme680-"));
        assert_eq!(cfg.broker.keep_alive, DEFAULT_KEEP_ALIVE);
        assert_eq!(cfg.broker.endpoint(), "localhost:1883");
        assert_eq!(cfg.interval, Duration::from_secs(5));
    }

    #[test]
    fn environment_overrides_defaults() {
        let lookup = lookup_from(&[
            ("MQTT_HOST", "broker.lan"),
            ("MQTT_PORT", "8883"),
            ("MQTT_CLIENT_ID", "tent-1"),
            ("SAMPLE_INTERVAL_SECS", "10"),
        ]);
        let cfg = AgentConfig::from_lookup(&lookup, "am2301", Duration::from_secs(2)).unwrap();

        assert_eq!(cfg.broker.endpoint(), "broker.lan:8883");
        assert_eq!(cfg.broker.client_id, "tent-1");
        assert_eq!(cfg.interval, Duration::from_secs(10));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let lookup = lookup_from(&[("MQTT_PORT", "70000")]);
        assert!(BrokerConfig::from_lookup(&lookup, "bme680").is_err());
    }

    #[test]
    fn short_keep_alive_is_rejected() {
        let lookup = lookup_from(&[("MQTT_KEEP_ALIVE_SECS", "2")]);
        assert!(BrokerConfig::from_lookup(&lookup, "bme680").is_err());
    }

    #[test]
    fn bme680_location() {
        let lookup = lookup_from(&[("BME680_I2C_ADDRESS", "0x77")]);
        let cfg = Bme680Config::from_lookup(&lookup).unwrap();
        assert_eq!(cfg.address, 0x77);
        assert_eq!(cfg.location(), "/dev/i2c-1 @ 0x77");
    }

    #[test]
    fn bme680_bad_address() {
        let lookup = lookup_from(&[("BME680_I2C_ADDRESS", "banana")]);
        assert!(Bme680Config::from_lookup(&lookup).is_err());
    }

    #[test]
    fn am2301_device_override() {
        let lookup = lookup_from(&[("AM2301_IIO_DEVICE", "/tmp/iio:device3")]);
        assert_eq!(
            Am2301Config::from_lookup(&lookup).iio_device,
            PathBuf::from("/tmp/iio:device3")
        );
    }
}
