//! PodSpec extraction utilities.

use crate::context::K8sObject;
use crate::context::object::{PodSpec, PodTemplateSpec};
use std::collections::BTreeMap;

/// Extract the pod template of a workload, if it has one.
///
/// Bare Pods have no template; use [`extract_pod_spec`] for those.
pub fn extract_pod_template(obj: &K8sObject) -> Option<&PodTemplateSpec> {
    match obj {
        K8sObject::Deployment(d) => d.template.as_ref(),
        K8sObject::StatefulSet(d) => d.template.as_ref(),
        K8sObject::DaemonSet(d) => d.template.as_ref(),
        K8sObject::ReplicaSet(d) => d.template.as_ref(),
        K8sObject::Job(d) => d.template.as_ref(),
        K8sObject::CronJob(d) => d.job_template.as_ref().and_then(|j| j.template.as_ref()),
        _ => None,
    }
}

/// Extract the PodSpec from a Kubernetes object, if it has one.
pub fn extract_pod_spec(obj: &K8sObject) -> Option<&PodSpec> {
    match obj {
        K8sObject::Pod(p) => p.spec.as_ref(),
        other => extract_pod_template(other).map(|t| &t.spec),
    }
}

/// Labels the pods created by this object will carry.
pub fn extract_pod_labels(obj: &K8sObject) -> Option<&BTreeMap<String, String>> {
    match obj {
        K8sObject::Pod(p) => p.meta.labels.as_ref(),
        other => extract_pod_template(other).and_then(|t| t.labels.as_ref()),
    }
}
