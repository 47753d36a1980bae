//! MCC Carpools — driver/rider admission for a neighborhood carpool service.
//!
//! A driver's home address is geocoded, classified into the service-area
//! regions, and stored only if at least one region matches.

pub mod admission;
pub mod config;
pub mod location;
pub mod region;
pub mod server;
pub mod store;
pub mod telemetry;
