//! Cluster API capability used by the resolver
//!
//! The resolver never talks to `kube` directly. It goes through
//! [`ClusterApi`], which [`KubeCluster`] implements against a real API
//! server and tests implement with in-memory fakes.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, PostParams};
use kube::Client;
use std::fmt;
use thiserror::Error;

/// Errors emitted by the Kubernetes integration.
#[derive(Debug, Error)]
pub enum K8sError {
    /// An error returned by the [`kube`] client when talking to the API
    /// server.
    #[error("{0}")]
    Kube(#[from] kube::Error),

    /// The API server answered, but without a field we rely on.
    #[error("response is missing {0}")]
    MissingField(&'static str),
}

/// A simplified view of a pod phase.
///
/// Mirrors the string phases reported by Kubernetes. Unrecognized or absent
/// values map to [`PodPhase::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Read the phase out of a pod's status
    pub fn of(pod: &Pod) -> Self {
        pod.status
            .as_ref()
            .and_then(|status| status.phase.as_deref())
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Unknown)
    }

    /// Succeeded and Failed pods never become Running again
    pub fn is_terminal(self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }
}

impl From<&str> for PodPhase {
    fn from(value: &str) -> Self {
        match value {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// The three cluster operations this tool consumes.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Lists pods in `namespace` matching a label selector, in the order the
    /// API server returns them.
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, K8sError>;

    /// Submits a job and returns the object as stored by the API server.
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, K8sError>;

    /// Fetches a single pod by name.
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, K8sError>;
}

/// [`ClusterApi`] backed by a live `kube` client.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, K8sError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods.list(&ListParams::default().labels(selector)).await?;
        Ok(list.items)
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, K8sError> {
        let jobs: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        Ok(jobs.create(&PostParams::default(), job).await?)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, K8sError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(pods.get(name).await?)
    }
}

/// Name of a listed pod, failing on objects the server returned without one
pub fn pod_name(pod: &Pod) -> Result<&str, K8sError> {
    pod.metadata
        .name
        .as_deref()
        .ok_or(K8sError::MissingField("metadata.name"))
}
