//! Kubernetes operations

pub mod client;
pub mod job;
pub mod resolver;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClusterApi, K8sError, KubeCluster, PodPhase};
pub use resolver::Resolver;
pub use wait::{PollSettings, wait_all_running, wait_for_pod_running};
