//! Reachability probing.
//!
//! A [`Prober`] performs one reachability check against one address within a
//! timeout. The result type has no error variant: every failure mode (bad
//! address, no reply, timeout, missing `ping` binary, socket errors) is a
//! [`ProbeOutcome::Unreachable`] carrying the reason for logging.
//!
//! Strategies:
//! - [`CommandProber`]: runs the platform `ping` utility (default)
//! - [`IcmpProber`]: unprivileged datagram ICMP echo socket

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod command;
mod icmp;

pub use command::{CommandProber, PingFlavor};
pub use icmp::IcmpProber;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1200);

// ============================================================================
// Outcome
// ============================================================================

/// Why a probe reported a device offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreachableReason {
    /// The host did not answer.
    NoReply,
    /// No answer within the timeout.
    TimedOut,
    /// The address was empty or could not be used safely.
    InvalidAddress,
    /// The probing tool could not be started.
    ToolUnavailable(String),
    /// Any other I/O or protocol failure.
    Io(String),
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReply => write!(f, "no reply"),
            Self::TimedOut => write!(f, "timed out"),
            Self::InvalidAddress => write!(f, "invalid address"),
            Self::ToolUnavailable(msg) => write!(f, "probe tool unavailable: {msg}"),
            Self::Io(msg) => write!(f, "probe failed: {msg}"),
        }
    }
}

/// Result of a single reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable(UnreachableReason),
}

impl ProbeOutcome {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Reachable)
    }

    pub fn unreachable_reason(&self) -> Option<&UnreachableReason> {
        match self {
            Self::Reachable => None,
            Self::Unreachable(reason) => Some(reason),
        }
    }
}

// ============================================================================
// Prober Trait
// ============================================================================

/// A single-shot reachability check with a bounded latency.
///
/// Implementations must return within roughly `timeout` and must never
/// panic on bad input.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome;
}

/// Rejects addresses that are empty or could be mistaken for options.
pub(crate) fn checked_address(address: &str) -> Result<&str, UnreachableReason> {
    let address = address.trim();
    if address.is_empty()
        || address.starts_with('-')
        || address.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(UnreachableReason::InvalidAddress);
    }
    Ok(address)
}

// ============================================================================
// Strategy Selection
// ============================================================================

/// Which probing strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Run the platform `ping` utility.
    #[default]
    Command,
    /// Send an ICMP echo from an unprivileged datagram socket.
    Icmp,
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" | "ping" => Ok(Self::Command),
            "icmp" => Ok(Self::Icmp),
            other => Err(format!("unknown probe method '{other}' (expected command or icmp)")),
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Icmp => write!(f, "icmp"),
        }
    }
}

/// Builds the prober for the configured method and the current platform.
pub fn build_prober(method: ProbeMethod) -> Arc<dyn Prober> {
    match method {
        ProbeMethod::Command => Arc::new(CommandProber::new()),
        ProbeMethod::Icmp => Arc::new(IcmpProber::new()),
    }
}
