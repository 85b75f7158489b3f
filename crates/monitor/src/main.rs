//! `growbox-monitor` -- one-shot host health check.
//!
//! Run from cron or a systemd timer. Checks service liveness (restarting
//! inactive units), root filesystem usage, and every attached sensor,
//! then exits.
//!
//! # Environment variables
//!
//! | Variable            | Default                          | Description                         |
//! |---------------------|----------------------------------|-------------------------------------|
//! | `MONITOR_SERVICES`  | grow-box units                   | Comma-separated systemd units       |
//! | `MONITOR_USE_SUDO`  | `true`                           | Restart through `sudo`              |
//! | `MONITOR_DISK_PATH` | `/`                              | Filesystem to check                 |
//! | `W1_DEVICES_DIR`    | `/sys/bus/w1/devices`            | 1-Wire devices for DS18B20 probes   |
//! | `GROWBOX_LOG_FILE`  | --                               | Also append logs to this file       |

use std::process::ExitCode;

use growbox_core::config::env_lookup;
use growbox_monitor::config::MonitorConfig;
use growbox_monitor::disk;
use growbox_monitor::sensors::{self, SensorCheck};
use growbox_monitor::services::{self, Systemctl};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    growbox_core::logging::init("growbox_monitor=info,growbox_agent=info");

    let config = match MonitorConfig::from_lookup(&env_lookup) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid monitor configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("=== Growbox monitor start ===");

    tracing::info!("=== Service check ===");
    let control = Systemctl::new(config.use_sudo);
    let service_reports = services::check_services(&control, &config.services).await;

    tracing::info!("=== Disk check ===");
    let disk_level = match disk::check_disk(&config.disk_path) {
        Ok((_, level)) => Some(level),
        Err(e) => {
            tracing::error!(error = %e, "[FAILED] disk check");
            None
        }
    };

    tracing::info!("=== Sensor check ===");
    let mut sensor_checks: Vec<SensorCheck> = vec![
        sensors::check_bme680(&config.bme680),
        sensors::check_am2301(&config.am2301),
    ];
    sensor_checks.extend(sensors::check_ds18b20(&config.w1_devices_dir));
    for check in &sensor_checks {
        check.log();
    }

    tracing::info!(
        services_healthy = service_reports.iter().filter(|r| r.is_healthy()).count(),
        services_total = service_reports.len(),
        disk = ?disk_level,
        sensors_ok = sensor_checks.iter().filter(|c| c.is_ok()).count(),
        sensors_total = sensor_checks.len(),
        "=== Checks complete ===",
    );

    ExitCode::SUCCESS
}
