//! Provisioning job manifest for the helper pod

use crate::config::settings::PodSettings;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Label key identifying helper pods
pub const SELECTOR_KEY: &str = "app";

/// Label value identifying helper pods
pub const SELECTOR_VALUE: &str = "kubectl-ssh-proxy";

/// Label selector used to discover helper pods
pub const SELECTOR: &str = "app=kubectl-ssh-proxy";

/// Name of the provisioning job and of its pod template
pub const PROXY_NAME: &str = "ssh-proxy";

/// Clean up the job and its pod immediately after completion
pub const JOB_TTL_SECONDS: i32 = 0;

const CONTAINER_NAME: &str = "busybox";

/// Build the one-shot job whose pod sleeps long enough to serve as a relay
pub fn helper_job(pod: &PodSettings) -> Job {
    let labels = BTreeMap::from([(SELECTOR_KEY.to_string(), SELECTOR_VALUE.to_string())]);

    Job {
        metadata: ObjectMeta {
            name: Some(PROXY_NAME.to_string()),
            ..ObjectMeta::default()
        },
        spec: Some(JobSpec {
            ttl_seconds_after_finished: Some(JOB_TTL_SECONDS),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    name: Some(PROXY_NAME.to_string()),
                    labels: Some(labels),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    restart_policy: Some("Never".to_string()),
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(pod.image.clone()),
                        image_pull_policy: Some("IfNotPresent".to_string()),
                        command: Some(vec!["sleep".to_string(), pod.sleep.clone()]),
                        ..Container::default()
                    }],
                    ..PodSpec::default()
                }),
            },
            ..JobSpec::default()
        }),
        ..Job::default()
    }
}

/// Pod-template name of a job, as the resolver's target after provisioning
pub fn template_pod_name(job: &Job) -> Option<&str> {
    job.spec
        .as_ref()?
        .template
        .metadata
        .as_ref()?
        .name
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matches_label() {
        assert_eq!(SELECTOR, format!("{}={}", SELECTOR_KEY, SELECTOR_VALUE));
    }

    #[test]
    fn test_helper_job_manifest() {
        let job = helper_job(&PodSettings::default());
        assert_eq!(job.metadata.name.as_deref(), Some("ssh-proxy"));
        assert_eq!(template_pod_name(&job), Some("ssh-proxy"));

        let spec = job.spec.as_ref().unwrap();
        assert_eq!(spec.ttl_seconds_after_finished, Some(0));

        let template_meta = spec.template.metadata.as_ref().unwrap();
        let labels = template_meta.labels.as_ref().unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some("kubectl-ssh-proxy"));

        let pod_spec = spec.template.spec.as_ref().unwrap();
        assert_eq!(pod_spec.restart_policy.as_deref(), Some("Never"));
        assert_eq!(pod_spec.containers.len(), 1);

        let container = &pod_spec.containers[0];
        assert_eq!(container.name, "busybox");
        assert_eq!(
            container.image.as_deref(),
            Some("public.ecr.aws/docker/library/busybox:glibc")
        );
        assert_eq!(container.image_pull_policy.as_deref(), Some("IfNotPresent"));
        assert_eq!(
            container.command,
            Some(vec!["sleep".to_string(), "12h".to_string()])
        );
    }

    #[test]
    fn test_helper_job_uses_pod_settings() {
        let settings = PodSettings {
            image: "registry.local/busybox:1.36".to_string(),
            sleep: "2h".to_string(),
        };
        let job = helper_job(&settings);
        let pod_spec = job.spec.unwrap().template.spec.unwrap();
        let container = &pod_spec.containers[0];
        assert_eq!(container.image.as_deref(), Some("registry.local/busybox:1.36"));
        assert_eq!(container.command.as_ref().unwrap()[1], "2h");
    }

    #[test]
    fn test_manifest_serializes_ttl() {
        let json = serde_json::to_value(helper_job(&PodSettings::default())).unwrap();
        assert_eq!(json["spec"]["ttlSecondsAfterFinished"], 0);
        assert_eq!(json["spec"]["template"]["metadata"]["labels"]["app"], "kubectl-ssh-proxy");
    }

    #[test]
    fn test_template_pod_name_missing() {
        assert_eq!(template_pod_name(&Job::default()), None);
    }
}
