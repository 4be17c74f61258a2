//! Object kind groups and matching.
//!
//! Templates declare the kinds they run against either by name
//! (e.g. "Job") or by group ("DeploymentLike", "JobLike", "Any").

use crate::context::Object;
use crate::types::ObjectKind;

/// Kinds that carry a pod template.
pub const DEPLOYMENT_LIKE: &str = "DeploymentLike";
/// Job and CronJob.
pub const JOB_LIKE: &str = "JobLike";
/// Every object, including kinds the engine does not type.
pub const ANY: &str = "Any";

/// Check if an object kind matches a kind specifier.
pub fn matches_kind(specifier: &str, kind: &ObjectKind) -> bool {
    match specifier {
        DEPLOYMENT_LIKE => kind.is_deployment_like(),
        JOB_LIKE => kind.is_job_like(),
        ANY => true,
        _ => specifier == kind.as_str(),
    }
}

/// Get all typed object kinds that match a specifier.
///
/// `Any` expands to every typed kind; an unrecognised name expands to nothing.
pub fn expand_kind_specifier(specifier: &str) -> Vec<ObjectKind> {
    const TYPED: &[ObjectKind] = &[
        ObjectKind::Deployment,
        ObjectKind::StatefulSet,
        ObjectKind::DaemonSet,
        ObjectKind::ReplicaSet,
        ObjectKind::Pod,
        ObjectKind::Job,
        ObjectKind::CronJob,
        ObjectKind::Service,
    ];

    match specifier {
        ANY => TYPED.to_vec(),
        _ => TYPED
            .iter()
            .copied()
            .filter(|kind| matches_kind(specifier, kind))
            .collect(),
    }
}

/// Check if an object matches a kind specifier.
///
/// Typed objects match by their kind tag. Untyped objects match `Any` or
/// the exact kind name from their manifest (e.g. "ConfigMap").
pub fn matches_object(specifier: &str, object: &Object) -> bool {
    match object.kind() {
        ObjectKind::Any => specifier == ANY || specifier == object.k8s_object.kind_name(),
        kind => matches_kind(specifier, &kind),
    }
}

/// Whether a specifier can be used in a template's supported kinds.
///
/// Group names and typed kinds must be spelled exactly; any other name is
/// accepted as an untyped kind if it looks like a Kubernetes kind.
pub fn is_known_specifier(specifier: &str) -> bool {
    const GROUPS: &[&str] = &[DEPLOYMENT_LIKE, JOB_LIKE, ANY];

    if GROUPS.contains(&specifier) || ObjectKind::from_kind(specifier).is_some() {
        return true;
    }
    let near_miss = GROUPS
        .iter()
        .copied()
        .chain(expand_kind_specifier(ANY).iter().map(ObjectKind::as_str))
        .any(|known| known.eq_ignore_ascii_case(specifier));

    !near_miss
        && specifier.starts_with(|c: char| c.is_ascii_uppercase())
        && specifier.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_expansion() {
        assert_eq!(
            expand_kind_specifier(JOB_LIKE),
            vec![ObjectKind::Job, ObjectKind::CronJob]
        );
        assert_eq!(expand_kind_specifier(DEPLOYMENT_LIKE).len(), 7);
        assert_eq!(expand_kind_specifier("Service"), vec![ObjectKind::Service]);
        assert!(expand_kind_specifier("Gateway").is_empty());
    }

    #[test]
    fn test_any_matches_untyped_objects() {
        assert!(matches_kind(ANY, &ObjectKind::Any));
        assert!(!matches_kind(DEPLOYMENT_LIKE, &ObjectKind::Any));
    }

    #[test]
    fn test_untyped_objects_match_by_name() {
        use crate::context::object::{K8sObject, ObjectMetadata, UnknownObject};

        let config_map = Object::new(
            ObjectMetadata::from_file("cm.yaml"),
            K8sObject::Unknown(Box::new(UnknownObject {
                api_version: "v1".to_string(),
                kind: "ConfigMap".to_string(),
                ..Default::default()
            })),
        );
        assert!(matches_object("ConfigMap", &config_map));
        assert!(matches_object(ANY, &config_map));
        assert!(!matches_object("Secret", &config_map));
        assert!(!matches_object(DEPLOYMENT_LIKE, &config_map));
    }

    #[test]
    fn test_known_specifiers() {
        assert!(is_known_specifier("DeploymentLike"));
        assert!(is_known_specifier("CronJob"));
        assert!(!is_known_specifier("Deploymentlike"));
        assert!(!is_known_specifier("SERVICE"));
        assert!(is_known_specifier("ConfigMap"));
        assert!(!is_known_specifier("configMap"));
        assert!(!is_known_specifier("Config Map"));
        assert!(!is_known_specifier(""));
    }
}
