//! lanwatch Core - Shared types for device reachability monitoring
//!
//! This crate provides the domain types shared between
//! the daemon (lanwatchd) and the command-line client (lanwatch).
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod device;
pub mod error;
pub mod report;

// Re-exports for convenience
pub use device::{Device, DeviceId, NewDevice};
pub use error::{DomainError, DomainResult};
pub use report::{ProbeReport, ProbeResult};
