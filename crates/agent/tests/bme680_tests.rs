//! Startup failures of the BME680 driver that need no hardware.

use assert_matches::assert_matches;
use tempfile::tempdir;

use growbox_agent::config::Bme680Config;
use growbox_agent::error::AgentError;
use growbox_agent::sensor::Bme680Driver;

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

/// Addresses other than 0x76/0x77 are rejected before the bus is touched.
#[test]
fn non_bme680_address_is_unavailable() {
    let config = Bme680Config {
        i2c_bus: "/dev/i2c-1".into(),
        address: 0x50,
    };

    let err = match Bme680Driver::open(&config) {
        Ok(_) => panic!("0x50 must not open"),
        Err(e) => e,
    };

    assert_matches!(
        &err,
        AgentError::SensorUnavailable { model: "bme680", address, reason }
            if address == "/dev/i2c-1 @ 0x50" && reason.contains("0x50")
    );
    assert_eq!(err.exit_code(), 1);
}

/// A bus device node that does not exist fails at open.
#[test]
fn missing_i2c_bus_is_unavailable() {
    let dir = tempdir().unwrap();
    let config = Bme680Config {
        i2c_bus: dir.path().join("i2c-9"),
        address: 0x76,
    };

    let err = match Bme680Driver::open(&config) {
        Ok(_) => panic!("missing bus must not open"),
        Err(e) => e,
    };

    assert_matches!(&err, AgentError::SensorUnavailable { model: "bme680", .. });
    assert_eq!(err.exit_code(), 1);
}
