//! AM2301 (DHT22-compatible) humidity/temperature sensor.
//!
//! Read through the Linux `dht11` IIO driver
//! (`dtoverlay=dht11,gpiopin=4`), which handles the single-wire timing
//! and exposes the last measurement as milli-unit sysfs attributes. The
//! kernel reports checksum and timeout failures as I/O errors on read.

use std::fs;
use std::path::{Path, PathBuf};

use growbox_core::reading::{RawSample, SampleOutcome};

use crate::config::Am2301Config;
use crate::error::AgentError;
use crate::sensor::SensorDriver;

const MODEL: &str = "am2301";

/// Temperature channel, milli-degrees Celsius.
pub const TEMPERATURE_ATTR: &str = "in_temp_input";

/// Relative humidity channel, milli-percent.
pub const HUMIDITY_ATTR: &str = "in_humidityrelative_input";

pub struct Am2301Driver {
    device_dir: PathBuf,
}

impl Am2301Driver {
    /// Bind to the IIO device directory.
    ///
    /// Fails if the directory does not expose the temperature channel,
    /// which means the overlay is not loaded or the path is wrong.
    pub fn open(config: &Am2301Config) -> Result<Self, AgentError> {
        let device_dir = config.iio_device.clone();
        let channel = device_dir.join(TEMPERATURE_ATTR);

        if !channel.is_file() {
            return Err(AgentError::SensorUnavailable {
                model: MODEL,
                address: device_dir.display().to_string(),
                reason: format!("{TEMPERATURE_ATTR} not present (is the dht11 overlay loaded?)"),
            });
        }

        tracing::info!(device = %device_dir.display(), "AM2301 IIO device found");
        Ok(Self { device_dir })
    }

    fn read_channel(&self, attr: &str) -> Result<f32, String> {
        read_milli(&self.device_dir.join(attr))
    }
}

impl SensorDriver for Am2301Driver {
    fn model(&self) -> &'static str {
        MODEL
    }

    fn sample(&mut self) -> SampleOutcome {
        let temperature = match self.read_channel(TEMPERATURE_ATTR) {
            Ok(v) => v,
            Err(e) => return SampleOutcome::Failure(e),
        };
        let humidity = match self.read_channel(HUMIDITY_ATTR) {
            Ok(v) => v,
            Err(e) => return SampleOutcome::Failure(e),
        };

        SampleOutcome::Success(RawSample {
            temperature_celsius: temperature,
            humidity_percent: Some(humidity),
            ..Default::default()
        })
    }
}

/// Read a sysfs attribute holding an integer in milli-units.
pub fn read_milli(path: &Path) -> Result<f32, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    parse_milli(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

/// Parse a milli-unit integer such as `"23400\n"` into `23.4`.
pub fn parse_milli(raw: &str) -> Result<f32, String> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map(|milli| milli as f32 / 1000.0)
        .map_err(|e| format!("invalid value '{trimmed}': {e}"))
}
