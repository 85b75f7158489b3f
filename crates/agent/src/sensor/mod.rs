//! Sensor drivers.
//!
//! The sampling loop only depends on [`SensorDriver`]; hardware details
//! (I2C register setup, sysfs paths) stay inside each driver. Opening a
//! driver is where "sensor not found" surfaces; after that every
//! problem is reported per sample as [`SampleOutcome::Failure`].

pub mod am2301;
pub mod bme680;

use growbox_core::reading::SampleOutcome;

pub use self::am2301::Am2301Driver;
pub use self::bme680::Bme680Driver;

/// Narrow read contract the sampling loop relies on.
pub trait SensorDriver {
    /// Short model name used in logs, e.g. `"bme680"`.
    fn model(&self) -> &'static str;

    /// Take one measurement.
    fn sample(&mut self) -> SampleOutcome;
}

impl<T: SensorDriver + ?Sized> SensorDriver for Box<T> {
    fn model(&self) -> &'static str {
        (**self).model()
    }

    fn sample(&mut self) -> SampleOutcome {
        (**self).sample()
    }
}
