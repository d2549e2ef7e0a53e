use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kubectl_ssh_proxy::k8s::{ClusterApi, K8sError};
use kubectl_ssh_proxy::transport::{ProcessLauncher, TransportExit};
use kubectl_ssh_proxy::utils::ProxyError;
use std::sync::Mutex;

/// Cluster whose listing is fixed up front and whose pods all report the
/// same phase. Creating a job makes its template pod show up in listings.
pub struct MockCluster {
    pub listed: Mutex<Vec<String>>,
    pub phase: String,
    pub creates: Mutex<usize>,
    pub gets: Mutex<usize>,
}

impl MockCluster {
    pub fn new(listed: &[&str], phase: &str) -> Self {
        Self {
            listed: Mutex::new(listed.iter().map(|s| s.to_string()).collect()),
            phase: phase.to_string(),
            creates: Mutex::new(0),
            gets: Mutex::new(0),
        }
    }

    pub fn creates(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    pub fn gets(&self) -> usize {
        *self.gets.lock().unwrap()
    }
}

fn pod(name: &str, phase: Option<&str>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        status: Some(PodStatus {
            phase: phase.map(str::to_string),
            ..PodStatus::default()
        }),
        ..Pod::default()
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn list_pods(&self, _namespace: &str, _selector: &str) -> Result<Vec<Pod>, K8sError> {
        Ok(self
            .listed
            .lock()
            .unwrap()
            .iter()
            .map(|name| pod(name, None))
            .collect())
    }

    async fn create_job(&self, _namespace: &str, job: &Job) -> Result<Job, K8sError> {
        *self.creates.lock().unwrap() += 1;
        let name = job
            .spec
            .as_ref()
            .and_then(|spec| spec.template.metadata.as_ref())
            .and_then(|meta| meta.name.clone())
            .ok_or(K8sError::MissingField("spec.template.metadata.name"))?;
        self.listed.lock().unwrap().push(name);
        Ok(job.clone())
    }

    async fn get_pod(&self, _namespace: &str, name: &str) -> Result<Pod, K8sError> {
        *self.gets.lock().unwrap() += 1;
        Ok(pod(name, Some(&self.phase)))
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn run(&self, program: &str, args: &[String]) -> Result<TransportExit, ProxyError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        Ok(TransportExit::from_code(0))
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
