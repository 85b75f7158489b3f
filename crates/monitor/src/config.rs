//! Monitor configuration loaded from environment variables.

use std::path::PathBuf;

use growbox_agent::config::{Am2301Config, Bme680Config};
use growbox_core::config::{flag_or, list_or, string_or};
use growbox_core::error::ConfigError;

/// Units checked when `MONITOR_SERVICES` is unset.
pub const DEFAULT_SERVICES: &[&str] = &[
    "growcam.service",
    "home-assistant@homeassistant",
    "mosquitto",
    "grafana-server",
    "influxdb",
];

/// Where the kernel `w1-therm` driver exposes 1-Wire devices.
pub const DEFAULT_W1_DEVICES_DIR: &str = "/sys/bus/w1/devices";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub services: Vec<String>,
    /// Run `systemctl restart` through `sudo`.
    pub use_sudo: bool,
    pub disk_path: PathBuf,
    pub w1_devices_dir: PathBuf,
    pub bme680: Bme680Config,
    pub am2301: Am2301Config,
}

impl MonitorConfig {
    /// Load configuration.
    ///
    /// | Env Var              | Default                         |
    /// |----------------------|---------------------------------|
    /// | `MONITOR_SERVICES`   | five grow-box units             |
    /// | `MONITOR_USE_SUDO`   | `true`                          |
    /// | `MONITOR_DISK_PATH`  | `/`                             |
    /// | `W1_DEVICES_DIR`     | `/sys/bus/w1/devices`           |
    ///
    /// Sensor locations use the same variables as the agents.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            services: list_or(lookup, "MONITOR_SERVICES", DEFAULT_SERVICES),
            use_sudo: flag_or(lookup, "MONITOR_USE_SUDO", true)?,
            disk_path: PathBuf::from(string_or(lookup, "MONITOR_DISK_PATH", "/")),
            w1_devices_dir: PathBuf::from(string_or(
                lookup,
                "W1_DEVICES_DIR",
                DEFAULT_W1_DEVICES_DIR,
            )),
            bme680: Bme680Config::from_lookup(lookup)?,
            am2301: Am2301Config::from_lookup(lookup),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MonitorConfig::from_lookup(&|_: &str| None).unwrap();
        assert_eq!(cfg.services.len(), 5);
        assert!(cfg.services.contains(&"mosquitto".to_string()));
        assert!(cfg.use_sudo);
        assert_eq!(cfg.disk_path, PathBuf::from("/"));
        assert_eq!(cfg.w1_devices_dir, PathBuf::from("/sys/bus/w1/devices"));
        assert_eq!(cfg.bme680.address, 0x76);
    }

    #[test]
    fn overrides() {
        let lookup = |key: &str| match key {
            "MONITOR_SERVICES" => Some("mosquitto,influxdb".to_string()),
            "MONITOR_USE_SUDO" => Some("false".to_string()),
            "MONITOR_DISK_PATH" => Some("/data".to_string()),
            _ => None,
        };
        let cfg = MonitorConfig::from_lookup(&lookup).unwrap();
        assert_eq!(cfg.services, vec!["mosquitto", "influxdb"]);
        assert!(!cfg.use_sudo);
        assert_eq!(cfg.disk_path, PathBuf::from("/data"));
    }
}
