//! `growbox-agent` library crate.
//!
//! Sensor drivers, the MQTT publish sink and the sampling loop that ties
//! them together. The two binaries (`growbox-bme680`, `growbox-am2301`)
//! are thin wrappers around [`daemon::run`].

pub mod config;
pub mod daemon;
pub mod error;
pub mod sampler;
pub mod sensor;
pub mod shutdown;
pub mod sink;
