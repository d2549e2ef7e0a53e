//! Transport launcher: injects the proxy directive and runs the OpenSSH
//! client binary with the terminal attached.

pub mod launcher;

pub use launcher::{ProcessLauncher, SystemLauncher, TransportExit, launch};

use crate::utils::errors::ProxyError;
use std::fmt;
use std::str::FromStr;

/// Network relay executed inside the helper pod. `%h` and `%p` are
/// substituted by the OpenSSH client with the target host and port.
const RELAY: &str = "nc %h %p";

/// The client binaries that understand `-o ProxyCommand=...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Ssh,
    Scp,
    Sftp,
}

impl Transport {
    /// Executable name, identical to the sub-command
    pub fn program(self) -> &'static str {
        match self {
            Transport::Ssh => "ssh",
            Transport::Scp => "scp",
            Transport::Sftp => "sftp",
        }
    }
}

impl FromStr for Transport {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(Transport::Ssh),
            "scp" => Ok(Transport::Scp),
            "sftp" => Ok(Transport::Sftp),
            other => Err(ProxyError::UnsupportedCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// `ProxyCommand` option value routing every connection through `pod`
pub fn proxy_directive(namespace: &str, pod: &str) -> String {
    format!(
        "ProxyCommand=kubectl --namespace {} exec {} -qi -- {}",
        namespace, pod, RELAY
    )
}

/// `-o <directive>` followed by the user's arguments, untouched and in order
pub fn build_args(namespace: &str, pod: &str, user_args: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(user_args.len() + 2);
    args.push("-o".to_string());
    args.push(proxy_directive(namespace, pod));
    args.extend(user_args.iter().cloned());
    args
}
