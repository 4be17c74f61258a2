//! Core types for the check-template engine.
//!
//! - `Diagnostic` - raw output of a check function
//! - `Finding` - a diagnostic attributed to a template and an object
//! - `ObjectRef` - identity of a Kubernetes object
//! - `ObjectKind` / `ObjectKindsDesc` - kind tags and kind matching

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A diagnostic message produced by a check function.
///
/// This is the raw output from a check before the driver attributes it
/// to a template and an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The diagnostic message describing the issue.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for Diagnostic {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Diagnostic {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Identity of an object under analysis: kind plus namespace/name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// The Kubernetes kind as written in the manifest (e.g. "Job").
    pub kind: String,
    /// The namespace, if the object declares one.
    pub namespace: Option<String>,
    /// The object name.
    pub name: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// A finding reported for one (template, object) pair.
///
/// Findings carry no remediation; they only describe what was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Key of the template that produced the finding.
    pub template: String,
    /// The object the finding is about.
    pub object: ObjectRef,
    /// The diagnostic message.
    pub message: String,
    /// The file the object was loaded from.
    pub file_path: PathBuf,
    /// Line of the object's document in the file (1-indexed).
    pub line: Option<u32>,
}

impl Finding {
    /// Create a new finding.
    pub fn new(
        template: impl Into<String>,
        object: ObjectRef,
        message: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template: template.into(),
            object,
            message: message.into(),
            file_path: file_path.into(),
            line: None,
        }
    }

    /// Set the line number.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}) {}", self.object, self.template, self.message)
    }
}

/// Object kinds the engine knows how to type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    // Core workloads
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Pod,
    Job,
    CronJob,

    // Networking
    Service,

    // Any other kind (CRDs, ConfigMaps, ...)
    Any,
}

impl ObjectKind {
    /// Get the string representation matching Kubernetes kind names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::ReplicaSet => "ReplicaSet",
            Self::Pod => "Pod",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
            Self::Service => "Service",
            Self::Any => "Any",
        }
    }

    /// Parse from a Kubernetes kind string.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Deployment" => Some(Self::Deployment),
            "StatefulSet" => Some(Self::StatefulSet),
            "DaemonSet" => Some(Self::DaemonSet),
            "ReplicaSet" => Some(Self::ReplicaSet),
            "Pod" => Some(Self::Pod),
            "Job" => Some(Self::Job),
            "CronJob" => Some(Self::CronJob),
            "Service" => Some(Self::Service),
            _ => None,
        }
    }

    /// Check if this kind is "DeploymentLike" (has a PodSpec).
    pub fn is_deployment_like(&self) -> bool {
        matches!(
            self,
            Self::Deployment
                | Self::StatefulSet
                | Self::DaemonSet
                | Self::ReplicaSet
                | Self::Pod
                | Self::Job
                | Self::CronJob
        )
    }

    /// Check if this kind is "JobLike".
    pub fn is_job_like(&self) -> bool {
        matches!(self, Self::Job | Self::CronJob)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes which object kinds a template applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectKindsDesc {
    /// Specific kinds or group names like "DeploymentLike".
    pub object_kinds: Vec<String>,
}

impl ObjectKindsDesc {
    /// Create a new object kinds description.
    pub fn new(kinds: &[&str]) -> Self {
        Self {
            object_kinds: kinds.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Whether the description names no kinds at all.
    pub fn is_empty(&self) -> bool {
        self.object_kinds.is_empty()
    }

    /// Check if the given kind matches this description.
    pub fn matches(&self, kind: &ObjectKind) -> bool {
        self.object_kinds
            .iter()
            .any(|specifier| crate::objectkinds::matches_kind(specifier, kind))
    }

    /// Check if an object matches this description.
    ///
    /// Untyped objects are matched by the kind name from their manifest.
    pub fn matches_object(&self, object: &crate::context::Object) -> bool {
        self.object_kinds
            .iter()
            .any(|specifier| crate::objectkinds::matches_object(specifier, object))
    }
}

impl fmt::Display for ObjectKindsDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object_kinds.join(", "))
    }
}
