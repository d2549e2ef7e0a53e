//! In-memory [`ClusterApi`] for unit tests

use crate::k8s::client::{ClusterApi, K8sError};
use crate::k8s::job::template_pod_name;
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    listed: Vec<String>,
    phases: HashMap<String, VecDeque<String>>,
    get_log: Vec<String>,
    list_calls: usize,
    created: Vec<Job>,
    fail_list: bool,
    fail_create: bool,
}

/// Pods are listed by name; each pod answers Get with the next phase of
/// its script, repeating the last one once the script runs out. A created
/// job registers its template pod so later listings see it.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listed(self, names: &[&str]) -> Self {
        self.lock().listed = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_phases(self, name: &str, phases: &[&str]) -> Self {
        self.lock().phases.insert(
            name.to_string(),
            phases.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn failing_list(self) -> Self {
        self.lock().fail_list = true;
        self
    }

    pub fn failing_create(self) -> Self {
        self.lock().fail_create = true;
        self
    }

    pub fn get_calls(&self) -> usize {
        self.lock().get_log.len()
    }

    pub fn get_log(&self) -> Vec<String> {
        self.lock().get_log.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn created_jobs(&self) -> Vec<Job> {
        self.lock().created.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn named_pod(name: &str, phase: Option<String>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        status: Some(PodStatus {
            phase,
            ..PodStatus::default()
        }),
        ..Pod::default()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_pods(&self, _namespace: &str, _selector: &str) -> Result<Vec<Pod>, K8sError> {
        let mut state = self.lock();
        state.list_calls += 1;
        if state.fail_list {
            return Err(K8sError::MissingField("items"));
        }
        Ok(state.listed.iter().map(|n| named_pod(n, None)).collect())
    }

    async fn create_job(&self, _namespace: &str, job: &Job) -> Result<Job, K8sError> {
        let mut state = self.lock();
        if state.fail_create {
            return Err(K8sError::MissingField("metadata"));
        }
        if let Some(name) = template_pod_name(job) {
            state.listed.push(name.to_string());
        }
        state.created.push(job.clone());
        Ok(job.clone())
    }

    async fn get_pod(&self, _namespace: &str, name: &str) -> Result<Pod, K8sError> {
        let mut state = self.lock();
        state.get_log.push(name.to_string());
        let script = state
            .phases
            .get_mut(name)
            .ok_or(K8sError::MissingField("pod"))?;
        let phase = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        Ok(named_pod(name, phase))
    }
}
