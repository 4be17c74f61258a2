//! YAML parsing for Kubernetes manifests.

use crate::config::LintConfig;
use crate::context::object::*;
use crate::context::{LintContextImpl, Object};
use log::{debug, warn};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// YAML parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YamlParseError {
    /// I/O error reading a file or directory.
    #[error("I/O error: {0}")]
    Io(String),

    /// A document is not valid YAML or not a Kubernetes object.
    #[error("invalid document at line {line}: {message}")]
    InvalidDocument { line: u32, message: String },
}

/// Parse a YAML string containing one or more Kubernetes objects.
pub fn parse_yaml(content: &str) -> Result<Vec<Object>, YamlParseError> {
    parse_yaml_with_path(content, Path::new("<stdin>"))
}

/// Parse YAML content with a source file path.
///
/// Fails on the first document that cannot be turned into an object.
pub fn parse_yaml_with_path(content: &str, path: &Path) -> Result<Vec<Object>, YamlParseError> {
    parse_documents(content, path)
        .into_iter()
        .map(|doc| {
            doc.map_err(|invalid| YamlParseError::InvalidDocument {
                line: invalid.metadata.line_number.unwrap_or(1),
                message: invalid.load_err,
            })
        })
        .collect()
}

/// Parse a YAML file.
pub fn parse_yaml_file(path: &Path) -> Result<Vec<Object>, YamlParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| YamlParseError::Io(format!("{}: {}", path.display(), e)))?;

    parse_yaml_with_path(&content, path)
}

/// Parse all YAML files in a directory (recursively, in path order).
///
/// Files that fail to parse are skipped with a warning.
pub fn parse_yaml_dir(path: &Path) -> Result<Vec<Object>, YamlParseError> {
    let mut objects = Vec::new();

    for entry_path in yaml_files(path)? {
        match parse_yaml_file(&entry_path) {
            Ok(mut objs) => objects.append(&mut objs),
            Err(e) => warn!("Skipping {}: {}", entry_path.display(), e),
        }
    }

    Ok(objects)
}

/// Load a lint context from a file or directory.
///
/// Paths matching the configuration's ignore patterns are skipped.
/// Documents that cannot be parsed are kept as invalid objects instead of
/// failing the whole load.
pub fn load_context(path: &Path, config: &LintConfig) -> Result<LintContextImpl, YamlParseError> {
    let mut ctx = LintContextImpl::new();

    let files = if path.is_dir() {
        yaml_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    for file in files {
        if config.should_ignore_path(&file) {
            debug!("Ignoring {}", file.display());
            continue;
        }
        let content = std::fs::read_to_string(&file)
            .map_err(|e| YamlParseError::Io(format!("{}: {}", file.display(), e)))?;
        for doc in parse_documents(&content, &file) {
            match doc {
                Ok(obj) => ctx.add_object(obj),
                Err(invalid) => ctx.add_invalid_object(invalid),
            }
        }
    }

    Ok(ctx)
}

fn yaml_files(path: &Path) -> Result<Vec<std::path::PathBuf>, YamlParseError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| YamlParseError::Io(e.to_string()))?;
        let entry_path = entry.path();
        let ext = entry_path.extension().and_then(|e| e.to_str());
        if entry_path.is_file() && matches!(ext, Some("yaml") | Some("yml")) {
            files.push(entry_path.to_path_buf());
        }
    }
    Ok(files)
}

/// Split content into documents and parse each one.
///
/// Empty and comment-only documents are dropped.
fn parse_documents(content: &str, path: &Path) -> Vec<Result<Object, InvalidObject>> {
    split_documents(content)
        .into_iter()
        .filter_map(|(line, doc)| {
            let metadata = ObjectMetadata::from_file(path).with_line(line);
            let value = match serde_yaml::from_str::<Value>(&doc) {
                Ok(Value::Null) => return None,
                Ok(value) => value,
                Err(e) => return Some(Err(InvalidObject::new(metadata, e.to_string()))),
            };
            Some(
                parse_k8s_object(&value)
                    .map(|obj| Object::new(metadata.clone(), obj))
                    .map_err(|e| InvalidObject::new(metadata, e)),
            )
        })
        .collect()
}

/// Split on `---` separator lines, returning each document with the line
/// of its first non-blank, non-comment line.
fn split_documents(content: &str) -> Vec<(u32, String)> {
    let mut docs = Vec::new();
    let mut current = String::new();
    let mut start: Option<u32> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx as u32 + 1;
        if line.starts_with("---") {
            if let Some(start) = start.take() {
                docs.push((start, std::mem::take(&mut current)));
            }
            current.clear();
            continue;
        }
        let trimmed = line.trim();
        if start.is_none() && !trimmed.is_empty() && !trimmed.starts_with('#') {
            start = Some(line_number);
        }
        current.push_str(line);
        current.push('\n');
    }
    if let Some(start) = start {
        docs.push((start, current));
    }

    docs
}

/// Parse a single K8s object from a YAML value.
fn parse_k8s_object(value: &Value) -> Result<K8sObject, String> {
    if !value.is_mapping() {
        return Err("document is not a mapping".to_string());
    }
    let api_version = get_string(value, "apiVersion").ok_or("object has no apiVersion")?;
    let kind = get_string(value, "kind").ok_or("object has no kind")?;

    let meta = parse_metadata(value.get("metadata"));
    let spec = value.get("spec");

    Ok(match kind.as_str() {
        "Deployment" => K8sObject::Deployment(Box::new(DeploymentData {
            meta,
            replicas: spec.and_then(|s| get_i32(s, "replicas")),
            selector: spec.and_then(parse_label_selector),
            template: spec.and_then(parse_pod_template),
        })),
        "StatefulSet" => K8sObject::StatefulSet(Box::new(StatefulSetData {
            meta,
            replicas: spec.and_then(|s| get_i32(s, "replicas")),
            selector: spec.and_then(parse_label_selector),
            template: spec.and_then(parse_pod_template),
        })),
        "DaemonSet" => K8sObject::DaemonSet(Box::new(DaemonSetData {
            meta,
            selector: spec.and_then(parse_label_selector),
            template: spec.and_then(parse_pod_template),
        })),
        "ReplicaSet" => K8sObject::ReplicaSet(Box::new(ReplicaSetData {
            meta,
            replicas: spec.and_then(|s| get_i32(s, "replicas")),
            selector: spec.and_then(parse_label_selector),
            template: spec.and_then(parse_pod_template),
        })),
        "Pod" => K8sObject::Pod(Box::new(PodData {
            meta,
            spec: spec.map(parse_pod_spec),
        })),
        "Job" => K8sObject::Job(Box::new(parse_job(meta, spec))),
        "CronJob" => {
            // CronJob has jobTemplate.spec.template.spec
            let job_template = spec.and_then(|s| s.get("jobTemplate")).map(|jt| {
                parse_job(parse_metadata(jt.get("metadata")), jt.get("spec"))
            });
            K8sObject::CronJob(Box::new(CronJobData { meta, job_template }))
        }
        "Service" => K8sObject::Service(Box::new(ServiceData {
            meta,
            selector: spec.and_then(|s| get_string_map(s, "selector")),
            type_: spec.and_then(|s| get_string(s, "type")),
        })),
        _ => K8sObject::Unknown(Box::new(UnknownObject {
            api_version,
            kind,
            meta,
        })),
    })
}

// ============================================================================
// Parse helper functions
// ============================================================================

fn get_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(|s| s.to_string())
}

fn get_i32(value: &Value, key: &str) -> Option<i32> {
    value.get(key)?.as_i64().and_then(|n| i32::try_from(n).ok())
}

fn get_string_map(value: &Value, key: &str) -> Option<BTreeMap<String, String>> {
    let mapping = value.get(key)?.as_mapping()?;
    let map: BTreeMap<String, String> = mapping
        .iter()
        .filter_map(|(k, v)| Some((k.as_str()?.to_string(), scalar_to_string(v)?)))
        .collect();
    if map.is_empty() { None } else { Some(map) }
}

/// Label and annotation values are strings, but unquoted YAML turns
/// `version: 2` or `enabled: true` into other scalars.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_metadata(metadata: Option<&Value>) -> CommonMeta {
    let Some(metadata) = metadata else {
        return CommonMeta::default();
    };
    CommonMeta {
        name: get_string(metadata, "name").unwrap_or_default(),
        namespace: get_string(metadata, "namespace"),
        labels: get_string_map(metadata, "labels"),
        annotations: get_string_map(metadata, "annotations"),
    }
}

fn parse_label_selector(spec: &Value) -> Option<LabelSelector> {
    let selector = spec.get("selector")?;
    Some(LabelSelector {
        match_labels: get_string_map(selector, "matchLabels"),
    })
}

fn parse_pod_template(spec: &Value) -> Option<PodTemplateSpec> {
    let template = spec.get("template")?;
    Some(PodTemplateSpec {
        labels: template
            .get("metadata")
            .and_then(|m| get_string_map(m, "labels")),
        spec: template.get("spec").map(parse_pod_spec).unwrap_or_default(),
    })
}

fn parse_pod_spec(spec: &Value) -> PodSpec {
    PodSpec {
        containers: parse_containers(spec.get("containers")),
        init_containers: parse_containers(spec.get("initContainers")),
    }
}

fn parse_containers(containers: Option<&Value>) -> Vec<ContainerSpec> {
    let Some(arr) = containers.and_then(Value::as_sequence) else {
        return Vec::new();
    };

    arr.iter()
        .map(|c| ContainerSpec {
            name: get_string(c, "name").unwrap_or_default(),
            image: get_string(c, "image"),
        })
        .collect()
}

fn parse_job(meta: CommonMeta, spec: Option<&Value>) -> JobData {
    JobData {
        meta,
        template: spec.and_then(parse_pod_template),
        ttl_seconds_after_finished: spec.and_then(|s| get_i32(s, "ttlSecondsAfterFinished")),
    }
}
