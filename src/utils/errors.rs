//! Error taxonomy with actionable suggestions

use crate::k8s::client::{K8sError, PodPhase};
use colored::Colorize;
use std::time::Duration;
use thiserror::Error;

/// Process exit code for every failure the tool itself detects
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Every way a single invocation can fail before (or while) handing over
/// to the transport binary. All variants are terminal for the run.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Cluster context, credentials or settings could not be resolved
    #[error("{0}")]
    Config(String),

    /// Arguments rejected before any cluster call
    #[error("{0}")]
    Validation(String),

    #[error("unknown command: {0}")]
    UnsupportedCommand(String),

    /// A list/create/get call against the API server failed
    #[error("failed to {action}: {source}")]
    Lookup {
        action: String,
        #[source]
        source: K8sError,
    },

    #[error("pod {namespace}/{name} reached phase {phase} before it was running")]
    PodFailed {
        namespace: String,
        name: String,
        phase: PodPhase,
    },

    #[error("timed out after {timeout:?} waiting for pod {namespace}/{name} to be running")]
    Timeout {
        namespace: String,
        name: String,
        timeout: Duration,
    },

    #[error("no pods in {namespace} with selector {selector}")]
    NoPods { namespace: String, selector: String },

    #[error("required tool '{tool}' not found")]
    ToolNotFound { tool: String, hint: String },

    #[error("failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProxyError {
    pub fn lookup(action: impl Into<String>, source: K8sError) -> Self {
        ProxyError::Lookup {
            action: action.into(),
            source,
        }
    }

    /// Follow-up steps worth printing under the error message
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ProxyError::Config(_) => vec![
                "Check the current context with: kubectl config current-context".to_string(),
                "Use --kubeconfig or --context to select another cluster".to_string(),
            ],
            ProxyError::Validation(_) | ProxyError::UnsupportedCommand(_) => vec![
                "Usage: kubectl ssh-proxy [flags] ssh|scp|sftp [flags] [arguments]".to_string(),
                "Run with --help for examples".to_string(),
            ],
            ProxyError::Lookup { .. } => vec![
                "Verify the cluster is reachable: kubectl get pods".to_string(),
                "Verify you may list pods and create jobs in the namespace".to_string(),
            ],
            ProxyError::PodFailed { namespace, name, .. } => vec![
                format!("Inspect the pod: kubectl describe pod {} -n {}", name, namespace),
                format!("Remove it so a new one is provisioned: kubectl delete pod {} -n {}", name, namespace),
            ],
            ProxyError::Timeout { namespace, name, .. } => vec![
                format!("Check pod status: kubectl get pod {} -n {}", name, namespace),
                "Increase the wait with --timeout".to_string(),
            ],
            ProxyError::NoPods { namespace, selector } => vec![format!(
                "List pods: kubectl get pods -n {} -l {}",
                namespace, selector
            )],
            ProxyError::ToolNotFound { hint, .. } => vec![
                format!("Install with: {}", hint),
                "Ensure the tool is in your PATH".to_string(),
            ],
            ProxyError::Launch { .. } => vec!["Ensure the tool is executable".to_string()],
        }
    }

    /// Display the error with suggestions on stderr
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self);

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &suggestions {
                eprintln!("  {} {}", "→".blue(), suggestion);
            }
        }
    }
}
