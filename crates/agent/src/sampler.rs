//! The sensor sampling and publish loop.
//!
//! One [`SamplingLoop`] owns one sensor driver and one sink for its whole
//! life. Each tick samples the driver, publishes the resulting reading,
//! logs it, and then idles for the fixed interval. A tick either does all
//! of that or skips publishing and logging entirely; no failure during a
//! tick ends the loop. Only cancellation does, after which the sink is
//! disconnected exactly once.

use std::time::Duration;

use growbox_core::reading::{Delivery, Reading, SampleOutcome};
use growbox_core::topics::{TOPIC_AM2301, TOPIC_BME680};
use tokio_util::sync::CancellationToken;

use crate::sensor::SensorDriver;
use crate::sink::PublishSink;

// ---------------------------------------------------------------------------
// Publish target
// ---------------------------------------------------------------------------

/// Where and how readings are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub topic: String,
    pub delivery: Delivery,
    pub retain: bool,
}

impl PublishTarget {
    /// Combined-sensor readings: at-most-once, retained so new subscribers
    /// see the latest value immediately.
    pub fn bme680() -> Self {
        Self {
            topic: TOPIC_BME680.to_string(),
            delivery: Delivery::AtMostOnce,
            retain: true,
        }
    }

    /// Humidity/temperature readings: at-most-once, not retained.
    pub fn am2301() -> Self {
        Self {
            topic: TOPIC_AM2301.to_string(),
            delivery: Delivery::AtMostOnce,
            retain: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick results
// ---------------------------------------------------------------------------

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Published(Reading),
    /// Driver had nothing new; nothing was published.
    NoData,
    /// Driver failed; nothing was published.
    SensorFailure(String),
    /// Sink rejected the message. Not retried.
    Dropped(String),
}

/// Tick counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub published: u64,
    pub no_data: u64,
    pub sensor_failures: u64,
    pub dropped: u64,
}

impl LoopSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Published(_) => self.published += 1,
            TickOutcome::NoData => self.no_data += 1,
            TickOutcome::SensorFailure(_) => self.sensor_failures += 1,
            TickOutcome::Dropped(_) => self.dropped += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// SamplingLoop
// ---------------------------------------------------------------------------

pub struct SamplingLoop<D, S> {
    driver: D,
    sink: S,
    target: PublishTarget,
    interval: Duration,
}

impl<D, S> SamplingLoop<D, S>
where
    D: SensorDriver,
    S: PublishSink,
{
    pub fn new(driver: D, sink: S, target: PublishTarget, interval: Duration) -> Self {
        Self {
            driver,
            sink,
            target,
            interval,
        }
    }

    /// Run one sample -> publish -> log cycle.
    pub fn tick(&mut self) -> TickOutcome {
        let sample = match self.driver.sample() {
            SampleOutcome::Success(sample) => sample,
            SampleOutcome::NoData => {
                tracing::debug!(model = self.driver.model(), "No new sensor data");
                return TickOutcome::NoData;
            }
            SampleOutcome::Failure(reason) => {
                tracing::warn!(
                    model = self.driver.model(),
                    error = %reason,
                    "Sensor read failed, skipping tick",
                );
                return TickOutcome::SensorFailure(reason);
            }
        };

        let reading = Reading::from_sample(&sample);
        let payload = match reading.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Reading could not be encoded, skipping tick");
                return TickOutcome::Dropped(e.to_string());
            }
        };

        if let Err(e) = self.sink.publish(
            &self.target.topic,
            &payload,
            self.target.delivery,
            self.target.retain,
        ) {
            tracing::warn!(error = %e, "Publish failed, reading dropped");
            return TickOutcome::Dropped(e.to_string());
        }

        tracing::info!(
            topic = %self.target.topic,
            payload = %payload,
            "Published reading",
        );
        TickOutcome::Published(reading)
    }

    /// Run until `cancel` fires, then disconnect the sink.
    ///
    /// Cancellation is honoured mid-idle. The sink is disconnected exactly
    /// once; a failed disconnect is logged and otherwise ignored.
    pub async fn run(mut self, cancel: CancellationToken) -> LoopSummary {
        let mut summary = LoopSummary::default();

        tracing::info!(
            model = self.driver.model(),
            topic = %self.target.topic,
            endpoint = %self.sink.endpoint(),
            interval_secs = self.interval.as_secs(),
            retain = self.target.retain,
            "Sampling loop started",
        );

        while !cancel.is_cancelled() {
            let outcome = self.tick();
            summary.record(&outcome);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.sink.idle(self.interval) => {}
            }
        }

        if let Err(e) = self.sink.disconnect().await {
            tracing::warn!(error = %e, "Sink disconnect failed");
        }

        tracing::info!(
            ticks = summary.ticks,
            published = summary.published,
            no_data = summary.no_data,
            sensor_failures = summary.sensor_failures,
            dropped = summary.dropped,
            "Exiting sensor loop",
        );

        summary
    }
}
