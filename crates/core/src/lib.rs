//! Shared domain types for the growbox sensor agents and host monitor.
//!
//! Everything in this crate is pure (no hardware, no network) so the
//! reading invariants and configuration parsing can be tested in isolation.

pub mod config;
pub mod error;
pub mod logging;
pub mod reading;
pub mod topics;
