//! Well-known MQTT topic names and sampling intervals.
//!
//! Each sensor model publishes to exactly one topic under the
//! `growbox/sensors/` namespace so independent agent processes never
//! collide on the broker.

use std::time::Duration;

/// Topic for combined gas/temperature/humidity/pressure readings.
pub const TOPIC_BME680: &str = "growbox/sensors/bme680";

/// Topic for humidity/temperature-only readings.
pub const TOPIC_AM2301: &str = "growbox/sensors/am2301";

/// Default interval between BME680 samples.
pub const BME680_INTERVAL: Duration = Duration::from_secs(5);

/// Default interval between AM2301 samples.
pub const AM2301_INTERVAL: Duration = Duration::from_secs(2);
