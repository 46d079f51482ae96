//! Prober backed by the platform `ping` utility.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{checked_address, ProbeOutcome, Prober, UnreachableReason};

/// Extra time granted to the child process before it is killed.
const SPAWN_GRACE: Duration = Duration::from_millis(300);

/// Flag dialect of the local `ping` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingFlavor {
    /// `ping -n 1 -w <ms>`
    Windows,
    /// `ping -c 1 -W <secs>` (iputils, busybox)
    Linux,
    /// `ping -c 1 -t <secs>` (macOS, FreeBSD); `-W` is milliseconds there.
    Bsd,
}

impl PingFlavor {
    /// Flavor of the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "dragonfly"
        )) {
            Self::Bsd
        } else {
            Self::Linux
        }
    }

    /// Arguments for a single echo request to `address`.
    pub fn args(self, address: &str, timeout: Duration) -> Vec<String> {
        match self {
            Self::Windows => vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                timeout.as_millis().to_string(),
                address.into(),
            ],
            Self::Linux => vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                whole_seconds(timeout).to_string(),
                address.into(),
            ],
            Self::Bsd => vec![
                "-c".into(),
                "1".into(),
                "-t".into(),
                whole_seconds(timeout).to_string(),
                address.into(),
            ],
        }
    }

    /// Maps the exit status of `ping` to an outcome.
    pub fn interpret(self, status: ExitStatus) -> ProbeOutcome {
        match (self, status.code()) {
            (_, Some(0)) => ProbeOutcome::Reachable,
            (Self::Windows, Some(_)) | (_, Some(1)) => {
                ProbeOutcome::Unreachable(UnreachableReason::NoReply)
            }
            (_, Some(code)) => {
                ProbeOutcome::Unreachable(UnreachableReason::Io(format!("ping exited with {code}")))
            }
            (_, None) => ProbeOutcome::Unreachable(UnreachableReason::Io(
                "ping terminated by signal".to_string(),
            )),
        }
    }
}

/// Rounds to whole seconds, never below one.
fn whole_seconds(timeout: Duration) -> u64 {
    let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    (ms.saturating_add(500) / 1000).max(1)
}

/// Runs one `ping` child per probe.
#[derive(Debug, Clone)]
pub struct CommandProber {
    program: String,
    flavor: PingFlavor,
}

impl CommandProber {
    pub fn new() -> Self {
        Self::with_program("ping", PingFlavor::current())
    }

    /// Uses a specific binary and flag dialect.
    pub fn with_program(program: impl Into<String>, flavor: PingFlavor) -> Self {
        Self {
            program: program.into(),
            flavor,
        }
    }
}

impl Default for CommandProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for CommandProber {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        let address = match checked_address(address) {
            Ok(address) => address,
            Err(reason) => return ProbeOutcome::Unreachable(reason),
        };

        let mut child = match Command::new(&self.program)
            .args(self.flavor.args(address, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return ProbeOutcome::Unreachable(UnreachableReason::ToolUnavailable(format!(
                    "{}: {e}",
                    self.program
                )));
            }
            Err(e) => return ProbeOutcome::Unreachable(UnreachableReason::Io(e.to_string())),
        };

        match tokio::time::timeout(timeout + SPAWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => self.flavor.interpret(status),
            Ok(Err(e)) => ProbeOutcome::Unreachable(UnreachableReason::Io(e.to_string())),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    debug!(address, error = %e, "Failed to kill timed out ping");
                }
                ProbeOutcome::Unreachable(UnreachableReason::TimedOut)
            }
        }
    }
}
