//! Sensor reading model.
//!
//! A driver reports a [`RawSample`]; the sampling loop turns it into a
//! [`Reading`] with [`Reading::from_sample`] and serializes it as the
//! published payload. Readings are never retained between ticks.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Driver output
// ---------------------------------------------------------------------------

/// Raw values reported by a sensor driver for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub temperature_celsius: f32,
    pub humidity_percent: Option<f32>,
    pub pressure_hpa: Option<f32>,
    /// Gas heater reached its target temperature for this measurement.
    pub heat_stable: bool,
    /// Only meaningful when `heat_stable` is set.
    pub gas_resistance_ohms: Option<f64>,
}

/// Result of asking a driver for one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Success(RawSample),
    /// The driver has no new measurement ready yet.
    NoData,
    /// The hardware could not be read this time.
    Failure(String),
}

// ---------------------------------------------------------------------------
// Published reading
// ---------------------------------------------------------------------------

/// A single published reading.
///
/// Optional fields are omitted from the payload when absent, never sent
/// as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_resistance: Option<f64>,
}

impl Reading {
    /// Build a reading from raw driver output.
    ///
    /// `gas_resistance` is carried over only when the heater is reported
    /// stable for this sample.
    pub fn from_sample(sample: &RawSample) -> Self {
        let gas_resistance = if sample.heat_stable {
            sample.gas_resistance_ohms
        } else {
            None
        };

        Self {
            temperature: sample.temperature_celsius,
            humidity: sample.humidity_percent,
            pressure: sample.pressure_hpa,
            gas_resistance,
        }
    }

    /// Serialize to the JSON payload published on the broker.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Delivery class
// ---------------------------------------------------------------------------

/// Broker delivery guarantee for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bme_sample(heat_stable: bool) -> RawSample {
        RawSample {
            temperature_celsius: 23.4,
            humidity_percent: Some(55.2),
            pressure_hpa: Some(1013.0),
            heat_stable,
            gas_resistance_ohms: Some(12500.0),
        }
    }

    #[test]
    fn gas_resistance_dropped_when_heater_unstable() {
        let reading = Reading::from_sample(&bme_sample(false));
        assert_eq!(reading.gas_resistance, None);
        assert_eq!(reading.temperature, 23.4);
        assert_eq!(reading.humidity, Some(55.2));
        assert_eq!(reading.pressure, Some(1013.0));
    }

    #[test]
    fn gas_resistance_kept_when_heater_stable() {
        let reading = Reading::from_sample(&bme_sample(true));
        assert_eq!(reading.gas_resistance, Some(12500.0));
    }

    #[test]
    fn stable_heater_without_gas_value_has_no_gas_field() {
        let sample = RawSample {
            gas_resistance_ohms: None,
            ..bme_sample(true)
        };
        assert_eq!(Reading::from_sample(&sample).gas_resistance, None);
    }

    #[test]
    fn payload_omits_absent_fields() {
        let sample = RawSample {
            temperature_celsius: 21.5,
            humidity_percent: Some(40.0),
            ..Default::default()
        };
        let payload = Reading::from_sample(&sample).to_payload().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let obj = parsed.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("temperature"));
        assert!(obj.contains_key("humidity"));
        assert!(!obj.contains_key("pressure"));
        assert!(!obj.contains_key("gas_resistance"));
    }

    #[test]
    fn payload_uses_shortest_float_text() {
        let payload = Reading::from_sample(&bme_sample(true)).to_payload().unwrap();
        assert_eq!(
            payload,
            r#"{"temperature":23.4,"humidity":55.2,"pressure":1013.0,"gas_resistance":12500.0}"#
        );
    }

    #[test]
    fn gas_resistance_above_f32_precision_is_exact() {
        let sample = RawSample {
            gas_resistance_ohms: Some(f64::from(48_123_457u32)),
            ..bme_sample(true)
        };
        let payload = Reading::from_sample(&sample).to_payload().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["gas_resistance"].as_f64(), Some(48_123_457.0));
    }
}
