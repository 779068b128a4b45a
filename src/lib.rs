//! Genetic-algorithm nurse shift scheduler.
//!
//! A run evolves staff × day rosters against hard rules (rest after nights,
//! consecutive days, specialist presence, coverage) and soft rules
//! (preferences, workload and night equity). Runs are tracked as sessions that
//! clients start, poll and collect through [`service::Service`] or the HTTP
//! router in [`api`].

pub mod api;
pub mod bootstrap;
pub mod engine;
pub mod models;
pub mod service;

pub use service::Service;
