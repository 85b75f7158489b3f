//! `growbox-bme680` -- publishes BME680 readings to MQTT.
//!
//! Samples temperature, humidity, pressure and (once the gas heater is
//! stable) gas resistance every 5 seconds and publishes them, retained,
//! to `growbox/sensors/bme680`.
//!
//! # Environment variables
//!
//! | Variable               | Default       | Description                        |
//! |------------------------|---------------|------------------------------------|
//! | `MQTT_HOST`            | `localhost`   | Broker host                        |
//! | `MQTT_PORT`            | `1883`        | Broker port                        |
//! | `BME680_I2C_BUS`       | `/dev/i2c-1`  | I2C bus device                     |
//! | `BME680_I2C_ADDRESS`   | `0x76`        | Sensor address (`0x76` or `0x77`)  |
//! | `SAMPLE_INTERVAL_SECS` | `5`           | Seconds between samples            |

use std::process::ExitCode;

use growbox_agent::config::Bme680Config;
use growbox_agent::daemon;
use growbox_agent::error::AgentError;
use growbox_agent::sampler::{LoopSummary, PublishTarget};
use growbox_agent::sensor::Bme680Driver;
use growbox_core::config::env_lookup;
use growbox_core::topics::BME680_INTERVAL;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    growbox_core::logging::init("growbox_agent=info,growbox_bme680=info");

    let result = start().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "growbox-bme680 failed to start");
    }
    ExitCode::from(daemon::exit_code(&result))
}

async fn start() -> Result<LoopSummary, AgentError> {
    let config = daemon::load_config("bme680", BME680_INTERVAL)?;
    let sensor = Bme680Config::from_lookup(&env_lookup)?;

    tracing::info!(
        sensor = %sensor.location(),
        broker = %config.broker.endpoint(),
        interval_secs = config.interval.as_secs(),
        "Starting growbox-bme680",
    );

    let driver = Bme680Driver::open(&sensor)?;
    daemon::run(driver, &config, PublishTarget::bme680()).await
}
