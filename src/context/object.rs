//! Kubernetes object wrappers for linting.

use crate::types::{ObjectKind, ObjectRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata about where a parsed object came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// The file path where this object was defined.
    pub file_path: PathBuf,
    /// Line number of the object's document in the source file (1-indexed).
    pub line_number: Option<u32>,
}

impl ObjectMetadata {
    /// Create new metadata for an object from a file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
            line_number: None,
        }
    }

    /// Set the line number.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }
}

/// A parsed Kubernetes object ready for linting.
#[derive(Debug, Clone)]
pub struct Object {
    /// Metadata about where this object came from.
    pub metadata: ObjectMetadata,
    /// The Kubernetes object data.
    pub k8s_object: K8sObject,
}

impl Object {
    /// Create a new object.
    pub fn new(metadata: ObjectMetadata, k8s_object: K8sObject) -> Self {
        Self {
            metadata,
            k8s_object,
        }
    }

    /// Get the object's kind tag.
    pub fn kind(&self) -> ObjectKind {
        self.k8s_object.kind()
    }

    /// Get the object's name.
    pub fn name(&self) -> &str {
        &self.k8s_object.meta().name
    }

    /// Get the object's namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.k8s_object.meta().namespace.as_deref()
    }

    /// Get labels from the object.
    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.k8s_object.meta().labels.as_ref()
    }

    /// Get annotations from the object.
    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.k8s_object.meta().annotations.as_ref()
    }

    /// Identity of the object: kind as written in the manifest plus namespace/name.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            kind: self.k8s_object.kind_name().to_string(),
            namespace: self.namespace().map(str::to_string),
            name: self.name().to_string(),
        }
    }
}

/// An object that failed to parse.
#[derive(Debug, Clone)]
pub struct InvalidObject {
    /// Metadata about where this object came from.
    pub metadata: ObjectMetadata,
    /// The error that occurred during parsing.
    pub load_err: String,
}

impl InvalidObject {
    /// Create a new invalid object record.
    pub fn new(metadata: ObjectMetadata, error: impl Into<String>) -> Self {
        Self {
            metadata,
            load_err: error.into(),
        }
    }
}

/// Tagged union over the object kinds the engine types.
///
/// Kinds without a dedicated variant are kept as `Unknown` so that
/// templates declaring `Any` still see them.
#[derive(Debug, Clone)]
pub enum K8sObject {
    // Workloads
    Deployment(Box<DeploymentData>),
    StatefulSet(Box<StatefulSetData>),
    DaemonSet(Box<DaemonSetData>),
    ReplicaSet(Box<ReplicaSetData>),
    Pod(Box<PodData>),
    Job(Box<JobData>),
    CronJob(Box<CronJobData>),

    // Networking
    Service(Box<ServiceData>),

    // Unknown/CRD
    Unknown(Box<UnknownObject>),
}

impl K8sObject {
    /// Get the object kind.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Deployment(_) => ObjectKind::Deployment,
            Self::StatefulSet(_) => ObjectKind::StatefulSet,
            Self::DaemonSet(_) => ObjectKind::DaemonSet,
            Self::ReplicaSet(_) => ObjectKind::ReplicaSet,
            Self::Pod(_) => ObjectKind::Pod,
            Self::Job(_) => ObjectKind::Job,
            Self::CronJob(_) => ObjectKind::CronJob,
            Self::Service(_) => ObjectKind::Service,
            Self::Unknown(_) => ObjectKind::Any,
        }
    }

    /// The kind name as it appeared in the manifest.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Unknown(u) => &u.kind,
            other => other.kind().as_str(),
        }
    }

    /// Get the common metadata block.
    pub fn meta(&self) -> &CommonMeta {
        match self {
            Self::Deployment(d) => &d.meta,
            Self::StatefulSet(d) => &d.meta,
            Self::DaemonSet(d) => &d.meta,
            Self::ReplicaSet(d) => &d.meta,
            Self::Pod(d) => &d.meta,
            Self::Job(d) => &d.meta,
            Self::CronJob(d) => &d.meta,
            Self::Service(d) => &d.meta,
            Self::Unknown(d) => &d.meta,
        }
    }
}

// ============================================================================
// Shared structures
// ============================================================================

/// Common metadata fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonMeta {
    pub name: String,
    pub namespace: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Simplified container spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: Option<String>,
}

/// Pod spec (only the fields templates read).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSpec {
    pub containers: Vec<ContainerSpec>,
    pub init_containers: Vec<ContainerSpec>,
}

/// A pod template: the labels pods will carry plus their spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodTemplateSpec {
    pub labels: Option<BTreeMap<String, String>>,
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    pub match_labels: Option<BTreeMap<String, String>>,
}

// ============================================================================
// Object data types
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DeploymentData {
    pub meta: CommonMeta,
    pub replicas: Option<i32>,
    pub selector: Option<LabelSelector>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct StatefulSetData {
    pub meta: CommonMeta,
    pub replicas: Option<i32>,
    pub selector: Option<LabelSelector>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct DaemonSetData {
    pub meta: CommonMeta,
    pub selector: Option<LabelSelector>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplicaSetData {
    pub meta: CommonMeta,
    pub replicas: Option<i32>,
    pub selector: Option<LabelSelector>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct PodData {
    pub meta: CommonMeta,
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct JobData {
    pub meta: CommonMeta,
    pub template: Option<PodTemplateSpec>,
    pub ttl_seconds_after_finished: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct CronJobData {
    pub meta: CommonMeta,
    /// The `spec.jobTemplate` block; its `meta` holds the template's metadata.
    pub job_template: Option<JobData>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceData {
    pub meta: CommonMeta,
    pub selector: Option<BTreeMap<String, String>>,
    pub type_: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UnknownObject {
    pub api_version: String,
    pub kind: String,
    pub meta: CommonMeta,
}
