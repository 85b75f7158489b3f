//! BME680 gas/temperature/humidity/pressure sensor over Linux I2C.
//!
//! The device is configured once at open time (oversampling, IIR filter,
//! gas heater profile 0) and then triggered in forced mode for each
//! sample.

use std::time::Duration;

use ::bme680::{
    Bme680, FieldData, FieldDataCondition, I2CAddress, IIRFilterSize, OversamplingSetting,
    PowerMode, SettingsBuilder,
};
use growbox_core::reading::{RawSample, SampleOutcome};
use linux_embedded_hal::{Delay, I2cdev};

use crate::config::Bme680Config;
use crate::error::AgentError;
use crate::sensor::SensorDriver;

const MODEL: &str = "bme680";

/// Gas heater target temperature in degrees Celsius.
pub const HEATER_TARGET_CELSIUS: u16 = 320;

/// How long the gas heater is held at target before measuring.
pub const HEATER_DURATION: Duration = Duration::from_millis(150);

/// Ambient temperature assumed when computing the heater resistance.
const AMBIENT_CELSIUS: i8 = 25;

pub struct Bme680Driver {
    device: Bme680<I2cdev, Delay>,
    delay: Delay,
    /// Time a forced-mode measurement (TPHG cycle) takes to complete.
    profile_duration: Duration,
}

impl Bme680Driver {
    /// Open the sensor on the configured bus/address and apply settings.
    pub fn open(config: &Bme680Config) -> Result<Self, AgentError> {
        let unavailable = |reason: String| AgentError::SensorUnavailable {
            model: MODEL,
            address: config.location(),
            reason,
        };

        let address = match config.address {
            0x76 => I2CAddress::Primary,
            0x77 => I2CAddress::Secondary,
            other => {
                return Err(unavailable(format!(
                    "0x{other:02x} is not a BME680 address (expected 0x76 or 0x77)"
                )))
            }
        };

        let i2c = I2cdev::new(&config.i2c_bus).map_err(|e| unavailable(e.to_string()))?;
        let mut delay = Delay;
        let mut device =
            Bme680::init(i2c, &mut delay, address).map_err(|e| unavailable(format!("{e:?}")))?;

        let settings = SettingsBuilder::new()
            .with_humidity_oversampling(OversamplingSetting::OS2x)
            .with_pressure_oversampling(OversamplingSetting::OS4x)
            .with_temperature_oversampling(OversamplingSetting::OS8x)
            .with_temperature_filter(IIRFilterSize::Size3)
            .with_gas_measurement(HEATER_DURATION, HEATER_TARGET_CELSIUS, AMBIENT_CELSIUS)
            .with_run_gas(true)
            .build();

        let profile_duration = device
            .get_profile_dur(&settings.0)
            .map_err(|e| unavailable(format!("{e:?}")))?;
        device
            .set_sensor_settings(&mut delay, settings)
            .map_err(|e| unavailable(format!("{e:?}")))?;

        tracing::info!(
            address = %config.location(),
            heater_celsius = HEATER_TARGET_CELSIUS,
            heater_ms = HEATER_DURATION.as_millis() as u64,
            profile_ms = profile_duration.as_millis() as u64,
            "BME680 configured",
        );

        Ok(Self {
            device,
            delay,
            profile_duration,
        })
    }
}

impl SensorDriver for Bme680Driver {
    fn model(&self) -> &'static str {
        MODEL
    }

    fn sample(&mut self) -> SampleOutcome {
        if let Err(e) = self
            .device
            .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
        {
            return SampleOutcome::Failure(format!("failed to trigger measurement: {e:?}"));
        }

        // Blocks the runtime thread for the TPHG cycle; the sink is not
        // polled and cancellation is not observed until it completes.
        std::thread::sleep(self.profile_duration);

        match self.device.get_sensor_data(&mut self.delay) {
            Ok((data, FieldDataCondition::NewData)) => SampleOutcome::Success(to_raw_sample(&data)),
            Ok(_) => SampleOutcome::NoData,
            Err(::bme680::Error::NoNewData) => SampleOutcome::NoData,
            Err(e) => SampleOutcome::Failure(format!("{e:?}")),
        }
    }
}

fn to_raw_sample(data: &FieldData) -> RawSample {
    RawSample {
        temperature_celsius: data.temperature_celsius(),
        humidity_percent: Some(data.humidity_percent()),
        pressure_hpa: Some(data.pressure_hpa()),
        heat_stable: data.heat_stable(),
        gas_resistance_ohms: Some(f64::from(data.gas_resistance_ohm())),
    }
}
