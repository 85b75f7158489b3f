//! Publish sinks.
//!
//! A sink is connected before the sampling loop starts (connection
//! failure is fatal) and is exclusively owned by that loop afterwards.

pub mod mqtt;

use std::time::Duration;

use async_trait::async_trait;
use growbox_core::reading::Delivery;

use crate::error::SinkError;

pub use self::mqtt::MqttSink;

/// Message-broker client contract used by the sampling loop.
#[async_trait]
pub trait PublishSink: Send {
    /// Broker address for logs, e.g. `localhost:1883`.
    fn endpoint(&self) -> &str;

    /// Queue a message without waiting for any acknowledgement.
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        delivery: Delivery,
        retain: bool,
    ) -> Result<(), SinkError>;

    /// Wait for `period`, servicing the connection in the meantime.
    async fn idle(&mut self, period: Duration);

    /// Close the connection.
    async fn disconnect(&mut self) -> Result<(), SinkError>;
}
