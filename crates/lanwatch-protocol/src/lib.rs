//! lanwatch Protocol - HTTP wire types for daemon communication
//!
//! This crate provides the request and response bodies exchanged between
//! the daemon's HTTP API and its clients, plus the route table both sides
//! agree on.

pub mod message;
pub mod routes;
pub mod version;

pub use message::{CreateDeviceRequest, ErrorBody, HealthBody, OkBody};
pub use version::ApiVersion;
