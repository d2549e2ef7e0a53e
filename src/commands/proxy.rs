//! The proxy command: validate, resolve the helper pod, hand over to the
//! transport binary.

use crate::config::cluster::ClusterOptions;
use crate::config::settings::Settings;
use crate::k8s::client::{ClusterApi, KubeCluster};
use crate::k8s::resolver::Resolver;
use crate::transport::{ProcessLauncher, SystemLauncher, Transport, TransportExit, launch};
use crate::utils::errors::ProxyError;
use crate::utils::prereqs::{CommonPrereqs, Prerequisite};

/// Everything one invocation needs
#[derive(Debug, Clone, Default)]
pub struct ProxyOptions {
    pub cluster: ClusterOptions,
    pub settings: Settings,
    /// Sub-command followed by its arguments, exactly as typed
    pub args: Vec<String>,
}

/// Split `args` into the transport and its arguments.
///
/// Needs the sub-command plus at least one argument for it. A leading
/// `-` means an unknown tool flag reached the positional arguments.
pub fn validate(args: &[String]) -> Result<(Transport, &[String]), ProxyError> {
    if let Some(flag) = args.first().filter(|arg| arg.starts_with('-')) {
        return Err(ProxyError::Validation(format!("unknown flag: {}", flag)));
    }

    match args.split_first() {
        Some((command, rest)) if !rest.is_empty() => Ok((command.parse()?, rest)),
        _ => Err(ProxyError::Validation(
            "two or more arguments required".to_string(),
        )),
    }
}

/// Run against the cluster selected by `options.cluster`
pub async fn run(options: &ProxyOptions) -> Result<TransportExit, ProxyError> {
    validate(&options.args)?;

    let context = options.cluster.connect().await?;
    let api = KubeCluster::new(context.client);

    run_with(
        &api,
        &SystemLauncher,
        &context.namespace,
        &options.args,
        &options.settings,
    )
    .await
}

/// Run with explicit collaborators
pub async fn run_with(
    api: &dyn ClusterApi,
    launcher: &dyn ProcessLauncher,
    namespace: &str,
    args: &[String],
    settings: &Settings,
) -> Result<TransportExit, ProxyError> {
    let (transport, transport_args) = validate(args)?;

    let kubectl = CommonPrereqs::kubectl();
    if kubectl.check().is_err() {
        crate::log_warn!(
            "kubectl not found on PATH; {} will fail to reach the proxy pod. {}",
            transport,
            kubectl.install_hint()
        );
    }

    let mut resolver = Resolver::new(api, settings.wait.poll_settings(), settings.pod.clone());
    if !settings.behavior.show_progress {
        resolver = resolver.quiet();
    }
    let pod = resolver.resolve(namespace).await?;

    launch(
        launcher,
        transport.program(),
        transport_args,
        namespace,
        &pod,
        settings.behavior.echo_command,
    )
    .await
}
