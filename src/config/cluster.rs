//! Cluster context resolution: kubeconfig, context, credentials, namespace

use crate::utils::errors::ProxyError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;

/// Namespace used when neither the flag nor the context names one
pub const FALLBACK_NAMESPACE: &str = "default";

/// Cluster selection as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub user: Option<String>,
    pub namespace: Option<String>,
}

/// An explicitly constructed client plus the namespace it operates in
#[derive(Clone)]
pub struct ClusterContext {
    pub client: Client,
    pub namespace: String,
}

fn config_error(what: &str, err: impl std::fmt::Display) -> ProxyError {
    ProxyError::Config(format!("failed to {}: {}", what, err))
}

impl ClusterOptions {
    fn kube_config_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
        }
    }

    fn has_overrides(&self) -> bool {
        self.context.is_some() || self.cluster.is_some() || self.user.is_some()
    }

    /// Resolve the client configuration.
    ///
    /// An explicit kubeconfig path is read as-is. Without one, context
    /// overrides go through the default kubeconfig search; with no
    /// overrides at all the usual inference applies (kubeconfig, then
    /// in-cluster service account).
    pub async fn load_config(&self) -> Result<Config, ProxyError> {
        let options = self.kube_config_options();

        if let Some(path) = &self.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| config_error(&format!("read kubeconfig {}", path.display()), e))?;
            return Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| config_error("load cluster configuration", e));
        }

        if self.has_overrides() {
            return Config::from_kubeconfig(&options)
                .await
                .map_err(|e| config_error("load cluster configuration", e));
        }

        Config::infer()
            .await
            .map_err(|e| config_error("load cluster configuration", e))
    }

    /// Namespace flag, else the context's namespace, else `default`
    pub fn namespace_for(&self, config: &Config) -> String {
        self.namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .or_else(|| Some(config.default_namespace.clone()).filter(|ns| !ns.is_empty()))
            .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
    }

    /// Build the client for this run
    pub async fn connect(&self) -> Result<ClusterContext, ProxyError> {
        let config = self.load_config().await?;
        let namespace = self.namespace_for(&config);
        crate::log_debug!(
            "Using cluster {} in namespace {}",
            config.cluster_url,
            namespace
        );

        let client =
            Client::try_from(config).map_err(|e| config_error("create cluster client", e))?;

        Ok(ClusterContext { client, namespace })
    }
}
