//! MQTT publish sink built on `rumqttc`.
//!
//! `rumqttc` splits a connection into a request handle ([`AsyncClient`])
//! and an [`EventLoop`] that performs the network I/O. The sampling loop
//! is single-task, so the event loop is only polled while connecting,
//! while idling between ticks, and while disconnecting. Publishes made
//! during a tick are queued and flushed at the start of the next idle.

use std::time::Duration;

use async_trait::async_trait;
use growbox_core::reading::Delivery;
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};

use crate::config::BrokerConfig;
use crate::error::SinkError;
use crate::sink::PublishSink;

/// Capacity of the client -> event loop request channel.
const REQUEST_CAPACITY: usize = 10;

/// Upper bound on waiting for the DISCONNECT packet to be flushed.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MqttSink {
    client: AsyncClient,
    eventloop: EventLoop,
    endpoint: String,
}

impl MqttSink {
    /// Connect and wait for the broker's CONNACK.
    ///
    /// Fails if the broker is unreachable, refuses the connection, or does
    /// not answer within `config.connect_timeout`.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, SinkError> {
        let endpoint = config.endpoint();

        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        tracing::info!(endpoint = %endpoint, client_id = %config.client_id, "Connecting to MQTT broker");

        match tokio::time::timeout(config.connect_timeout, wait_for_connack(&mut eventloop)).await {
            Ok(Ok(())) => {
                tracing::info!(endpoint = %endpoint, "MQTT connected");
                Ok(Self {
                    client,
                    eventloop,
                    endpoint,
                })
            }
            Ok(Err(e)) => Err(SinkError::Connect {
                endpoint,
                reason: e.to_string(),
            }),
            Err(_) => Err(SinkError::Connect {
                reason: format!(
                    "no CONNACK within {}s",
                    config.connect_timeout.as_secs()
                ),
                endpoint,
            }),
        }
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(_)) = eventloop.poll().await? {
            return Ok(());
        }
    }
}

/// Map a delivery class onto the MQTT QoS level.
pub fn qos_for(delivery: Delivery) -> QoS {
    match delivery {
        Delivery::AtMostOnce => QoS::AtMostOnce,
        Delivery::AtLeastOnce => QoS::AtLeastOnce,
        Delivery::ExactlyOnce => QoS::ExactlyOnce,
    }
}

#[async_trait]
impl PublishSink for MqttSink {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        delivery: Delivery,
        retain: bool,
    ) -> Result<(), SinkError> {
        self.client
            .try_publish(topic, qos_for(delivery), retain, payload.as_bytes().to_vec())
            .map_err(|e| SinkError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    async fn idle(&mut self, period: Duration) {
        let deadline = tokio::time::Instant::now() + period;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return,
                event = self.eventloop.poll() => match event {
                    Ok(event) => tracing::trace!(?event, "MQTT event"),
                    Err(e) => {
                        // rumqttc reconnects on the next poll; wait out the
                        // rest of the interval instead of spinning on errors.
                        tracing::warn!(
                            endpoint = %self.endpoint,
                            error = %e,
                            "MQTT connection error, queued messages may be lost",
                        );
                        tokio::time::sleep_until(deadline).await;
                        return;
                    }
                },
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), SinkError> {
        self.client
            .try_disconnect()
            .map_err(|e| SinkError::Disconnect {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let flushed = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
                    Ok(_) => {}
                    Err(e) => return Err(e),
                }
            }
        })
        .await;

        match flushed {
            Ok(Ok(())) => {
                tracing::info!(endpoint = %self.endpoint, "MQTT disconnected");
                Ok(())
            }
            Ok(Err(e)) => Err(SinkError::Disconnect {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(SinkError::Disconnect {
                endpoint: self.endpoint.clone(),
                reason: format!("not flushed within {}s", DISCONNECT_TIMEOUT.as_secs()),
            }),
        }
    }
}
