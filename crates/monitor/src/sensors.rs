//! One-shot probe of every attached sensor.
//!
//! Each probe is independent: a failing sensor is logged and reported
//! without stopping the others.

use std::fs;
use std::path::Path;

use growbox_agent::config::{Am2301Config, Bme680Config};
use growbox_agent::sensor::am2301::read_milli;
use growbox_agent::sensor::{Am2301Driver, Bme680Driver, SensorDriver};
use growbox_core::reading::SampleOutcome;

/// Family code prefix of DS18B20 devices on the 1-Wire bus.
pub const DS18B20_PREFIX: &str = "28-";

/// Attribute exposed by `w1-therm` with the temperature in milli-degrees.
pub const DS18B20_TEMPERATURE_ATTR: &str = "temperature";

#[derive(Debug, Clone, PartialEq)]
pub enum SensorStatus {
    Ok {
        temperature_celsius: f32,
        humidity_percent: Option<f32>,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorCheck {
    pub sensor: String,
    pub status: SensorStatus,
}

impl SensorCheck {
    fn failed(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sensor: sensor.into(),
            status: SensorStatus::Failed(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, SensorStatus::Ok { .. })
    }

    /// Log the result at info (ok) or error (failed) level.
    pub fn log(&self) {
        match &self.status {
            SensorStatus::Ok {
                temperature_celsius,
                humidity_percent: Some(humidity),
            } => tracing::info!(
                sensor = %self.sensor,
                "[OK] {} - Temp: {temperature_celsius:.1}°C, Humidity: {humidity:.1}%",
                self.sensor,
            ),
            SensorStatus::Ok {
                temperature_celsius,
                humidity_percent: None,
            } => tracing::info!(
                sensor = %self.sensor,
                "[OK] {} - Temp: {temperature_celsius:.1}°C",
                self.sensor,
            ),
            SensorStatus::Failed(reason) => tracing::error!(
                sensor = %self.sensor,
                "[FAILED] {}: {reason}",
                self.sensor,
            ),
        }
    }
}

/// Turn one driver sample into a check result.
pub fn probe<D: SensorDriver + ?Sized>(name: &str, driver: &mut D) -> SensorCheck {
    match driver.sample() {
        SampleOutcome::Success(sample) => SensorCheck {
            sensor: name.to_string(),
            status: SensorStatus::Ok {
                temperature_celsius: sample.temperature_celsius,
                humidity_percent: sample.humidity_percent,
            },
        },
        SampleOutcome::NoData => SensorCheck::failed(name, "sensor is not responding"),
        SampleOutcome::Failure(reason) => SensorCheck::failed(name, reason),
    }
}

/// Open the BME680 and take one sample.
///
/// Only temperature is reported; humidity is dropped to keep the summary
/// line short.
pub fn check_bme680(config: &Bme680Config) -> SensorCheck {
    match Bme680Driver::open(config) {
        Ok(mut driver) => {
            let mut check = probe("BME680", &mut driver);
            if let SensorStatus::Ok {
                humidity_percent, ..
            } = &mut check.status
            {
                *humidity_percent = None;
            }
            check
        }
        Err(e) => SensorCheck::failed("BME680", e.to_string()),
    }
}

/// Bind to the AM2301 IIO device and take one sample.
pub fn check_am2301(config: &Am2301Config) -> SensorCheck {
    match Am2301Driver::open(config) {
        Ok(mut driver) => probe("AM2301", &mut driver),
        Err(e) => SensorCheck::failed("AM2301", e.to_string()),
    }
}

/// Read every DS18B20 found under the 1-Wire devices directory.
///
/// Returns a single failed check if the directory cannot be listed or
/// holds no DS18B20 devices.
pub fn check_ds18b20(devices_dir: &Path) -> Vec<SensorCheck> {
    let entries = match fs::read_dir(devices_dir) {
        Ok(entries) => entries,
        Err(e) => {
            return vec![SensorCheck::failed(
                "DS18B20",
                format!("{}: {e}", devices_dir.display()),
            )]
        }
    };

    let mut devices: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(DS18B20_PREFIX))
        .collect();
    devices.sort();

    if devices.is_empty() {
        return vec![SensorCheck::failed("DS18B20", "no DS18B20 sensors found")];
    }

    devices
        .into_iter()
        .map(|device| {
            let name = format!("DS18B20 ({device})");
            let attr = devices_dir.join(&device).join(DS18B20_TEMPERATURE_ATTR);
            if !attr.is_file() {
                return SensorCheck::failed(name, "temperature attribute missing, sensor defective");
            }
            match read_milli(&attr) {
                Ok(temperature_celsius) => SensorCheck {
                    sensor: name,
                    status: SensorStatus::Ok {
                        temperature_celsius,
                        humidity_percent: None,
                    },
                },
                Err(e) => SensorCheck::failed(name, e),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use growbox_core::reading::RawSample;
    use tempfile::tempdir;

    use super::*;

    struct OneShot(SampleOutcome);

    impl SensorDriver for OneShot {
        fn model(&self) -> &'static str {
            "one-shot"
        }

        fn sample(&mut self) -> SampleOutcome {
            self.0.clone()
        }
    }

    #[test]
    fn probe_maps_outcomes() {
        let mut ok = OneShot(SampleOutcome::Success(RawSample {
            temperature_celsius: 22.5,
            humidity_percent: Some(48.0),
            ..Default::default()
        }));
        assert_eq!(
            probe("AM2301", &mut ok).status,
            SensorStatus::Ok {
                temperature_celsius: 22.5,
                humidity_percent: Some(48.0),
            }
        );

        let mut silent = OneShot(SampleOutcome::NoData);
        assert!(!probe("BME680", &mut silent).is_ok());

        let mut broken = OneShot(SampleOutcome::Failure("checksum mismatch".into()));
        assert_eq!(
            probe("AM2301", &mut broken).status,
            SensorStatus::Failed("checksum mismatch".into())
        );
    }

    #[test]
    fn ds18b20_devices_are_read() {
        let dir = tempdir().unwrap();
        for (device, milli) in [("28-000005e2fdc3", "21437\n"), ("28-0000075a1b2c", "-2500\n")] {
            fs::create_dir(dir.path().join(device)).unwrap();
            fs::write(dir.path().join(device).join("temperature"), milli).unwrap();
        }
        // Bus master and non-DS18B20 devices are ignored.
        fs::create_dir(dir.path().join("w1_bus_master1")).unwrap();
        fs::create_dir(dir.path().join("10-000802bf6c3a")).unwrap();

        let checks = check_ds18b20(dir.path());

        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].sensor, "DS18B20 (28-000005e2fdc3)");
        assert_eq!(
            checks[0].status,
            SensorStatus::Ok {
                temperature_celsius: 21.437,
                humidity_percent: None,
            }
        );
        assert_eq!(
            checks[1].status,
            SensorStatus::Ok {
                temperature_celsius: -2.5,
                humidity_percent: None,
            }
        );
    }

    #[test]
    fn ds18b20_without_temperature_is_defective() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("28-00000abcdef0")).unwrap();

        let checks = check_ds18b20(dir.path());
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].is_ok());
    }

    #[test]
    fn ds18b20_none_found() {
        let dir = tempdir().unwrap();
        let checks = check_ds18b20(dir.path());
        assert_eq!(
            checks,
            vec![SensorCheck::failed("DS18B20", "no DS18B20 sensors found")]
        );
    }

    #[test]
    fn ds18b20_missing_bus_directory() {
        let dir = tempdir().unwrap();
        let checks = check_ds18b20(&dir.path().join("w1"));
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].is_ok());
    }

    #[test]
    fn am2301_missing_device_fails_check() {
        let dir = tempdir().unwrap();
        let check = check_am2301(&Am2301Config {
            iio_device: dir.path().join("iio:device0"),
        });
        assert_eq!(check.sensor, "AM2301");
        assert!(!check.is_ok());
    }
}
