//! Environment-variable configuration helpers.
//!
//! Binaries call `dotenvy::dotenv()` first and then build their typed
//! config through these helpers. Every helper takes a lookup function
//! rather than reading `std::env` directly so tests can inject values.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Read a variable from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Look up `key`, treating empty or whitespace-only values as unset.
pub fn var<F>(lookup: &F, key: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Look up `key` and fall back to `default` when unset.
pub fn string_or<F>(lookup: &F, key: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    var(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse `key` with [`FromStr`], falling back to `default` when unset.
pub fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a whole-second duration, rejecting zero.
pub fn secs_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: "0".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn flag_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(lookup, key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "expected a boolean".into(),
        }),
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn list_or<F>(lookup: &F, key: &'static str, default: &[&str]) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    match var(lookup, key) {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Parse an I2C address written as hex (`0x76`) or decimal (`118`).
pub fn parse_i2c_address(key: &'static str, raw: &str) -> Result<u8, ConfigError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    match parsed {
        Ok(addr) if addr <= 0x7f => Ok(addr),
        Ok(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "7-bit I2C addresses only go up to 0x7f".into(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_values_count_as_unset() {
        let lookup = lookup_from(&[("MQTT_HOST", "   ")]);
        assert_eq!(string_or(&lookup, "MQTT_HOST", "localhost"), "localhost");
    }

    #[test]
    fn parse_or_reports_key_and_value() {
        let lookup = lookup_from(&[("MQTT_PORT", "eighteen")]);
        let err = parse_or::<_, u16>(&lookup, "MQTT_PORT", 1883).unwrap_err();
        assert_matches!(
            err,
            ConfigError::InvalidValue { key: "MQTT_PORT", ref value, .. } if value == "eighteen"
        );
    }

    #[test]
    fn secs_rejects_zero() {
        let lookup = lookup_from(&[("SAMPLE_INTERVAL_SECS", "0")]);
        assert!(secs_or(&lookup, "SAMPLE_INTERVAL_SECS", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn secs_default_and_override() {
        let empty = lookup_from(&[]);
        assert_eq!(
            secs_or(&empty, "SAMPLE_INTERVAL_SECS", Duration::from_secs(5)).unwrap(),
            Duration::from_secs(5)
        );
        let set = lookup_from(&[("SAMPLE_INTERVAL_SECS", "12")]);
        assert_eq!(
            secs_or(&set, "SAMPLE_INTERVAL_SECS", Duration::from_secs(5)).unwrap(),
            Duration::from_secs(12)
        );
    }

    #[test]
    fn flags() {
        let lookup = lookup_from(&[("A", "Yes"), ("B", "0"), ("C", "maybe")]);
        assert!(flag_or(&lookup, "A", false).unwrap());
        assert!(!flag_or(&lookup, "B", true).unwrap());
        assert!(flag_or(&lookup, "C", true).is_err());
        assert!(flag_or(&lookup, "D", true).unwrap());
    }

    #[test]
    fn lists_split_on_commas() {
        let lookup = lookup_from(&[("MONITOR_SERVICES", "mosquitto, influxdb,,")]);
        assert_eq!(
            list_or(&lookup, "MONITOR_SERVICES", &["x"]),
            vec!["mosquitto".to_string(), "influxdb".to_string()]
        );
        assert_eq!(list_or(&lookup, "OTHER", &["x"]), vec!["x".to_string()]);
    }

    #[test]
    fn i2c_addresses() {
        assert_eq!(parse_i2c_address("K", "0x76").unwrap(), 0x76);
        assert_eq!(parse_i2c_address("K", "0X77").unwrap(), 0x77);
        assert_eq!(parse_i2c_address("K", "118").unwrap(), 0x76);
        assert!(parse_i2c_address("K", "0x80").is_err());
        assert!(parse_i2c_address("K", "0xzz").is_err());
    }
}
