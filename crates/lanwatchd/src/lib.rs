//! lanwatch daemon - device registry, reachability probes and HTTP API
//!
//! This crate provides the core infrastructure for the lanwatch daemon:
//! - `registry` - Device registry actor backed by a JSON file
//! - `probe` - Single-shot reachability checks (`ping` or ICMP socket)
//! - `coordinator` - Bounded-concurrency probe rounds producing sorted reports
//! - `server` - axum HTTP API
//! - `config` - Layered daemon configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     lanwatchd daemon                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │   HttpServer    │────▶│      RegistryActor          │   │
//! │  │     (axum)      │     │   (device state owner)      │   │
//! │  └────────┬────────┘     └──────────────┬──────────────┘   │
//! │           │                             │                   │
//! │           │ snapshot                    │ persist           │
//! │           ▼                             ▼                   │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐   │
//! │  │ProbeCoordinator │     │       devices.json          │   │
//! │  │ (W probe tasks) │     │                             │   │
//! │  └─────────────────┘     └─────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Probe failures become offline results, never errors

pub mod config;
pub mod coordinator;
pub mod probe;
pub mod registry;
pub mod server;
