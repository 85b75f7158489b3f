//! `growbox-monitor` library crate.
//!
//! One-shot host health checks for the grow box: systemd service
//! liveness (with restart of inactive units), root filesystem usage, and
//! a probe of every attached sensor. The binary entrypoint lives in
//! `main.rs`.

pub mod config;
pub mod disk;
pub mod error;
pub mod sensors;
pub mod services;
