//! lanwatch CLI - client library for the daemon's HTTP API
//!
//! - `client` - `DaemonClient`, one method per API route
//! - `render` - plain-text tables for devices and probe reports
//! - `error` - `ClientError`, carrying the daemon's error message on rejection

pub mod client;
pub mod error;
pub mod render;

pub use client::{DaemonClient, DEFAULT_URL};
pub use error::{ClientError, Result};
