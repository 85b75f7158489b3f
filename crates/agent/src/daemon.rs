//! Process-level wiring shared by the agent binaries.
//!
//! Startup order: open the sensor, connect the sink, then hand both to a
//! [`SamplingLoop`] that runs until SIGINT/SIGTERM. Anything that fails
//! before the loop starts is fatal.

use growbox_core::config::env_lookup;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::sampler::{LoopSummary, PublishTarget, SamplingLoop};
use crate::sensor::SensorDriver;
use crate::shutdown;
use crate::sink::MqttSink;

/// Load the agent config for `model` from the process environment.
pub fn load_config(
    model: &str,
    default_interval: std::time::Duration,
) -> Result<AgentConfig, AgentError> {
    Ok(AgentConfig::from_lookup(&env_lookup, model, default_interval)?)
}

/// Connect to the broker and run the sampling loop until interrupted.
pub async fn run<D: SensorDriver>(
    driver: D,
    config: &AgentConfig,
    target: PublishTarget,
) -> Result<LoopSummary, AgentError> {
    let sink = MqttSink::connect(&config.broker).await?;
    let cancel = shutdown::cancel_on_signal();

    let sampler = SamplingLoop::new(driver, sink, target, config.interval);
    Ok(sampler.run(cancel).await)
}

/// Process exit status: 0 after an interrupt-driven shutdown, the error's
/// status otherwise.
pub fn exit_code(result: &Result<LoopSummary, AgentError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}
