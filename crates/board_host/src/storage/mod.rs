//! Persisted-state storage contracts.

pub mod session;
