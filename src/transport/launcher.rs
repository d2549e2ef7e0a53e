//! Process hand-off to the transport binary

use super::{Transport, build_args};
use crate::utils::errors::ProxyError;
use crate::utils::prereqs::{CommonPrereqs, PrereqError, Prerequisite};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// How the transport process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl TransportExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code to hand back to our own caller: the transport's code, or
    /// `128 + signal` when it was killed
    pub fn exit_code(&self) -> u8 {
        match (self.code, self.signal) {
            (Some(code), _) => u8::try_from(code & 0xff).unwrap_or(1),
            (None, Some(signal)) => u8::try_from((128 + signal) & 0xff).unwrap_or(1),
            (None, None) => 1,
        }
    }
}

impl From<ExitStatus> for TransportExit {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Spawns an external program attached to the invoking terminal and waits
/// for it.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<TransportExit, ProxyError>;
}

/// [`ProcessLauncher`] that inherits stdin, stdout and stderr.
pub struct SystemLauncher;

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn run(&self, program: &str, args: &[String]) -> Result<TransportExit, ProxyError> {
        CommonPrereqs::openssh(program)
            .check()
            .map_err(|PrereqError::NotFound { name, hint }| ProxyError::ToolNotFound {
                tool: name,
                hint,
            })?;

        // Handles are released when `status` returns, and the child is
        // killed if this future is dropped first.
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ProxyError::Launch {
                program: program.to_string(),
                source,
            })?;

        Ok(status.into())
    }
}

/// Run `command` through the helper pod.
///
/// Only `ssh`, `scp` and `sftp` are accepted; anything else fails before a
/// process is spawned. The transport's exit status is returned as-is, a
/// non-zero code is not an error here.
pub async fn launch(
    launcher: &dyn ProcessLauncher,
    command: &str,
    args: &[String],
    namespace: &str,
    pod: &str,
    echo: bool,
) -> Result<TransportExit, ProxyError> {
    let transport: Transport = command.parse()?;
    let program = transport.program();
    let full_args = build_args(namespace, pod, args);

    if echo {
        let line = std::iter::once(program).chain(full_args.iter().map(String::as_str));
        println!("{}", shell_words::join(line));
    }

    crate::log_debug!("Spawning {} with {} arguments", program, full_args.len());
    let exit = launcher.run(program, &full_args).await?;

    if !exit.success() {
        crate::log_info!("{} exited with {:?}", program, exit);
    }
    Ok(exit)
}
