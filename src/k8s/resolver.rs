//! Proxy endpoint resolution: find the helper pod, provision it when
//! missing, and wait until it is Running.

use crate::config::settings::PodSettings;
use crate::k8s::client::{ClusterApi, K8sError, pod_name};
use crate::k8s::job::{SELECTOR, helper_job, template_pod_name};
use crate::k8s::wait::{PollSettings, wait_for_pod_running};
use crate::utils::errors::ProxyError;
use crate::utils::progress::WaitProgress;

/// Resolves the helper pod for one invocation
pub struct Resolver<'a> {
    api: &'a dyn ClusterApi,
    poll: PollSettings,
    pod: PodSettings,
    show_progress: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn ClusterApi, poll: PollSettings, pod: PodSettings) -> Self {
        Self {
            api,
            poll,
            pod,
            show_progress: true,
        }
    }

    /// Suppress the spinner while waiting
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Name of a Running helper pod in `namespace`.
    ///
    /// The first listed pod wins. With none listed, exactly one job is
    /// created and its pod-template name is trusted as the pod to wait for.
    pub async fn resolve(&self, namespace: &str) -> Result<String, ProxyError> {
        let name = self.find_or_provision(namespace).await?;

        let progress = if self.show_progress {
            WaitProgress::new(&format!("Connecting via pod/{}", name))
        } else {
            WaitProgress::hidden()
        };

        match wait_for_pod_running(self.api, namespace, &name, &self.poll, &progress).await {
            Ok(()) => {
                progress.finish_success(&format!("Connecting via pod/{}", name));
                Ok(name)
            }
            Err(e) => {
                progress.finish_error(&format!("pod/{}", name));
                Err(e)
            }
        }
    }

    async fn find_or_provision(&self, namespace: &str) -> Result<String, ProxyError> {
        let list_action = || format!("list pods in namespace {}", namespace);

        let pods = self
            .api
            .list_pods(namespace, SELECTOR)
            .await
            .map_err(|e| ProxyError::lookup(list_action(), e))?;

        if let Some(pod) = pods.first() {
            let name = pod_name(pod).map_err(|e| ProxyError::lookup(list_action(), e))?;
            crate::log_info!("Found proxy pod {}/{}", namespace, name);
            return Ok(name.to_string());
        }

        println!("No proxy pod found in {} namespace", namespace);

        let job = helper_job(&self.pod);
        let create_action = || format!("create proxy job in namespace {}", namespace);
        let created = self
            .api
            .create_job(namespace, &job)
            .await
            .map_err(|e| ProxyError::lookup(create_action(), e))?;

        let name = template_pod_name(&created)
            .ok_or_else(|| {
                ProxyError::lookup(
                    create_action(),
                    K8sError::MissingField("spec.template.metadata.name"),
                )
            })?
            .to_string();

        println!("pod/{} created", name);
        Ok(name)
    }
}
