//! Bounded polling for pod readiness

use crate::k8s::client::{ClusterApi, PodPhase, pod_name};
use crate::utils::errors::ProxyError;
use crate::utils::progress::WaitProgress;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default poll interval between readiness checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default readiness deadline for interactive use
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Floor for the poll interval so a misconfiguration cannot turn the wait
/// into back-to-back API calls
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval and deadline of a readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PollSettings {
    /// `interval` is raised to [`MIN_POLL_INTERVAL`] when shorter
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }

    /// Upper bound on polls: `timeout / interval`, and at least one
    pub fn max_polls(&self) -> u64 {
        let interval = self.interval.max(MIN_POLL_INTERVAL).as_millis();
        let polls = self.timeout.as_millis() / interval;
        u64::try_from(polls).unwrap_or(u64::MAX).max(1)
    }
}

/// Poll `name` until it is Running.
///
/// Polls immediately, then once per interval. Succeeded or Failed ends the
/// wait at once with [`ProxyError::PodFailed`]; a Get failure aborts with
/// [`ProxyError::Lookup`]. Pending and Unknown keep polling until either
/// `max_polls` is spent or the deadline passes.
pub async fn wait_for_pod_running(
    api: &dyn ClusterApi,
    namespace: &str,
    name: &str,
    settings: &PollSettings,
    progress: &WaitProgress,
) -> Result<(), ProxyError> {
    let deadline = Instant::now() + settings.timeout;

    for _ in 0..settings.max_polls() {
        progress.tick();

        let pod = api
            .get_pod(namespace, name)
            .await
            .map_err(|e| ProxyError::lookup(format!("get pod {}/{}", namespace, name), e))?;

        match PodPhase::of(&pod) {
            PodPhase::Running => {
                crate::log_debug!("pod/{} is running", name);
                return Ok(());
            }
            phase if phase.is_terminal() => {
                return Err(ProxyError::PodFailed {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    phase,
                });
            }
            phase => crate::log_debug!("pod/{} is {}", name, phase),
        }

        if Instant::now() >= deadline {
            break;
        }
        sleep(settings.interval).await;
    }

    Err(ProxyError::Timeout {
        namespace: namespace.to_string(),
        name: name.to_string(),
        timeout: settings.timeout,
    })
}

/// Wait for every pod matched by `selector` to be Running.
///
/// Pods are awaited one after another, each with the full `settings`
/// timeout; the first failure is returned. A selector that matches nothing
/// fails with [`ProxyError::NoPods`] without polling.
pub async fn wait_all_running(
    api: &dyn ClusterApi,
    namespace: &str,
    selector: &str,
    settings: &PollSettings,
    progress: &WaitProgress,
) -> Result<(), ProxyError> {
    let pods = api
        .list_pods(namespace, selector)
        .await
        .map_err(|e| ProxyError::lookup(format!("list pods in {}", namespace), e))?;

    if pods.is_empty() {
        return Err(ProxyError::NoPods {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
        });
    }

    for pod in &pods {
        let name = pod_name(pod)
            .map_err(|e| ProxyError::lookup(format!("list pods in {}", namespace), e))?;
        wait_for_pod_running(api, namespace, name, settings, progress).await?;
    }

    Ok(())
}
