//! `growbox-am2301` -- publishes AM2301 humidity/temperature readings.
//!
//! Reads the sensor through the kernel `dht11` IIO driver every 2
//! seconds and publishes to `growbox/sensors/am2301`.
//!
//! # Environment variables
//!
//! | Variable               | Default                              | Description              |
//! |------------------------|--------------------------------------|--------------------------|
//! | `MQTT_HOST`            | `localhost`                          | Broker host              |
//! | `MQTT_PORT`            | `1883`                               | Broker port              |
//! | `AM2301_IIO_DEVICE`    | `/sys/bus/iio/devices/iio:device0`   | IIO device directory     |
//! | `SAMPLE_INTERVAL_SECS` | `2`                                  | Seconds between samples  |

use std::process::ExitCode;

use growbox_agent::config::Am2301Config;
use growbox_agent::daemon;
use growbox_agent::error::AgentError;
use growbox_agent::sampler::{LoopSummary, PublishTarget};
use growbox_agent::sensor::Am2301Driver;
use growbox_core::config::env_lookup;
use growbox_core::topics::AM2301_INTERVAL;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    growbox_core::logging::init("growbox_agent=info,growbox_am2301=info");

    let result = start().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "growbox-am2301 failed to start");
    }
    ExitCode::from(daemon::exit_code(&result))
}

async fn start() -> Result<LoopSummary, AgentError> {
    let config = daemon::load_config("am2301", AM2301_INTERVAL)?;
    let sensor = Am2301Config::from_lookup(&env_lookup);

    tracing::info!(
        device = %sensor.iio_device.display(),
        broker = %config.broker.endpoint(),
        interval_secs = config.interval.as_secs(),
        "Starting growbox-am2301",
    );

    let driver = Am2301Driver::open(&sensor)?;
    daemon::run(driver, &config, PublishTarget::am2301()).await
}
