//! systemd service liveness checks.
//!
//! Each configured unit is queried with `systemctl is-active`; any unit
//! that is not active is restarted with `systemctl restart` (through
//! `sudo` when configured). Outcomes are logged and returned so the
//! caller can summarise the run.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

/// Timeout for a single `systemctl is-active` query.
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a restart operation.
const DEFAULT_RESTART_TIMEOUT: Duration = Duration::from_secs(60);

/// Allowed unit name characters: alphanumeric, hyphen, underscore, dot,
/// and the `@`/`:` used by template instances. A leading hyphen is
/// rejected so the name cannot be read as a flag.
pub fn is_safe_service_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | ':'))
}

/// Result of a restart attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartResult {
    pub service_name: String,
    pub success: bool,
    pub message: String,
    pub duration_ms: u64,
}

/// Final state of one checked unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Restarted,
    RestartFailed(String),
    /// Name rejected by [`is_safe_service_name`]; never passed to systemctl.
    InvalidName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub service_name: String,
    pub state: ServiceState,
}

impl ServiceReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.state, ServiceState::Active | ServiceState::Restarted)
    }
}

// ---------------------------------------------------------------------------
// Service control
// ---------------------------------------------------------------------------

/// Process-supervisor operations the checker needs.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// `Ok(true)` when the unit is active.
    async fn is_active(&self, service: &str) -> Result<bool, String>;

    async fn restart(&self, service: &str) -> RestartResult;
}

/// [`ServiceControl`] backed by the `systemctl` binary.
#[derive(Debug, Clone)]
pub struct Systemctl {
    use_sudo: bool,
    restart_timeout: Duration,
}

impl Systemctl {
    pub fn new(use_sudo: bool) -> Self {
        Self {
            use_sudo,
            restart_timeout: DEFAULT_RESTART_TIMEOUT,
        }
    }

    fn restart_command(&self, service: &str) -> Command {
        let mut cmd = if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg("systemctl");
            cmd
        } else {
            Command::new("systemctl")
        };
        cmd.args(["restart", service]);
        cmd
    }
}

#[async_trait]
impl ServiceControl for Systemctl {
    async fn is_active(&self, service: &str) -> Result<bool, String> {
        let result = tokio::time::timeout(
            STATUS_TIMEOUT,
            Command::new("systemctl")
                .args(["is-active", service])
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output.status.success()),
            Ok(Err(e)) => Err(format!("Failed to execute systemctl: {e}")),
            Err(_) => Err(format!(
                "systemctl is-active timed out after {}s",
                STATUS_TIMEOUT.as_secs()
            )),
        }
    }

    /// A timeout of 60 seconds is applied; if the restart command does not
    /// complete within that window it is killed and reported as failed.
    async fn restart(&self, service: &str) -> RestartResult {
        let start = Instant::now();

        tracing::info!(service, sudo = self.use_sudo, "Executing service restart");

        let result = tokio::time::timeout(
            self.restart_timeout,
            self.restart_command(service).kill_on_drop(true).output(),
        )
        .await;

        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (success, message) = match result {
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                if output.status.success() {
                    (true, format!("Service '{service}' restarted successfully"))
                } else {
                    (
                        false,
                        format!(
                            "Service '{service}' restart failed (exit {}): {}",
                            output.status.code().unwrap_or(-1),
                            stderr.trim(),
                        ),
                    )
                }
            }
            Ok(Err(e)) => (false, format!("Failed to execute systemctl: {e}")),
            Err(_) => (
                false,
                format!(
                    "Restart of '{service}' timed out after {}s",
                    self.restart_timeout.as_secs(),
                ),
            ),
        };

        RestartResult {
            service_name: service.to_string(),
            success,
            message,
            duration_ms: elapsed_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Check pass
// ---------------------------------------------------------------------------

/// Check every unit in order, restarting the ones that are not active.
pub async fn check_services<C>(control: &C, services: &[String]) -> Vec<ServiceReport>
where
    C: ServiceControl + ?Sized,
{
    let mut reports = Vec::with_capacity(services.len());

    for service in services {
        let state = check_one(control, service).await;
        reports.push(ServiceReport {
            service_name: service.clone(),
            state,
        });
    }

    reports
}

async fn check_one<C>(control: &C, service: &str) -> ServiceState
where
    C: ServiceControl + ?Sized,
{
    if !is_safe_service_name(service) {
        tracing::error!(service, "Refusing to check service with an invalid name");
        return ServiceState::InvalidName;
    }

    match control.is_active(service).await {
        Ok(true) => {
            tracing::info!(service, "[OK] service is active");
            return ServiceState::Active;
        }
        Ok(false) => tracing::error!(service, "[FAILED] service is inactive"),
        Err(e) => tracing::error!(service, error = %e, "[FAILED] service status unknown"),
    }

    let result = control.restart(service).await;
    if result.success {
        tracing::info!(service, elapsed_ms = result.duration_ms, "Restart succeeded");
        ServiceState::Restarted
    } else {
        tracing::error!(
            service,
            elapsed_ms = result.duration_ms,
            message = %result.message,
            "Restart failed",
        );
        ServiceState::RestartFailed(result.message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn safe_service_names() {
        assert!(is_safe_service_name("mosquitto"));
        assert!(is_safe_service_name("growcam.service"));
        assert!(is_safe_service_name("home-assistant@homeassistant"));
        assert!(is_safe_service_name("grafana-server"));
    }

    #[test]
    fn unsafe_service_names() {
        assert!(!is_safe_service_name(""));
        assert!(!is_safe_service_name("foo; rm -rf /"));
        assert!(!is_safe_service_name("$(evil)"));
        assert!(!is_safe_service_name("foo bar"));
        assert!(!is_safe_service_name("--now"));
        assert!(!is_safe_service_name(&"a".repeat(200)));
    }

    /// Reports a fixed set of active units and records restarts.
    struct FakeControl {
        active: Vec<&'static str>,
        failing_restarts: Vec<&'static str>,
        restarted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ServiceControl for FakeControl {
        async fn is_active(&self, service: &str) -> Result<bool, String> {
            Ok(self.active.iter().any(|s| *s == service))
        }

        async fn restart(&self, service: &str) -> RestartResult {
            self.restarted.lock().unwrap().push(service.to_string());
            let success = !self.failing_restarts.iter().any(|s| *s == service);
            RestartResult {
                service_name: service.to_string(),
                success,
                message: if success { "ok".into() } else { "unit not found".into() },
                duration_ms: 1,
            }
        }
    }

    #[tokio::test]
    async fn only_inactive_services_are_restarted() {
        let control = FakeControl {
            active: vec!["mosquitto", "influxdb"],
            failing_restarts: vec!["growcam.service"],
            restarted: Mutex::new(Vec::new()),
        };
        let services: Vec<String> = [
            "mosquitto",
            "grafana-server",
            "influxdb",
            "growcam.service",
            "bad name",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let reports = check_services(&control, &services).await;

        let states: Vec<&ServiceState> = reports.iter().map(|r| &r.state).collect();
        assert_eq!(
            states,
            vec![
                &ServiceState::Active,
                &ServiceState::Restarted,
                &ServiceState::Active,
                &ServiceState::RestartFailed("unit not found".into()),
                &ServiceState::InvalidName,
            ]
        );
        assert_eq!(
            *control.restarted.lock().unwrap(),
            vec!["grafana-server".to_string(), "growcam.service".to_string()]
        );
        assert_eq!(reports.iter().filter(|r| r.is_healthy()).count(), 3);
    }

    #[test]
    fn sudo_prefixes_restart_command() {
        let with_sudo = Systemctl::new(true).restart_command("mosquitto");
        let std_cmd = with_sudo.as_std();
        assert_eq!(std_cmd.get_program(), "sudo");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec!["systemctl", "restart", "mosquitto"]);

        let plain = Systemctl::new(false).restart_command("mosquitto");
        assert_eq!(plain.as_std().get_program(), "systemctl");
    }
}
