//! Dangling service template.
//!
//! A cross-object check: a Service's selector is matched against the pod
//! labels of every workload in the same namespace of the lint context.

use crate::context::{LintContext, Object};
use crate::context::object::K8sObject;
use crate::extract;
use crate::params::{ParameterDesc, ParameterType, Params};
use crate::registry::{Registry, RegistryError};
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::{Diagnostic, ObjectKindsDesc};
use std::collections::{BTreeMap, BTreeSet};

const IGNORED_LABELS_PARAM: &str = "ignoredLabels";

/// Register this template.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(DanglingServiceTemplate)
}

/// Template for services whose selector matches no pods.
pub struct DanglingServiceTemplate;

impl Template for DanglingServiceTemplate {
    fn key(&self) -> &str {
        "dangling-service"
    }

    fn human_name(&self) -> &str {
        "Dangling Services"
    }

    fn description(&self) -> &str {
        "Flag services which do not match any application"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&["Service"])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        vec![ParameterDesc::new(
            IGNORED_LABELS_PARAM,
            ParameterType::StringList,
            "Selector keys that are dropped before looking for matching pods",
        )]
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        let ignored_labels = params
            .string_list(IGNORED_LABELS_PARAM)
            .unwrap_or_default()
            .iter()
            .cloned()
            .collect();
        Ok(Box::new(DanglingServiceCheck { ignored_labels }))
    }
}

struct DanglingServiceCheck {
    ignored_labels: BTreeSet<String>,
}

impl CheckFunc for DanglingServiceCheck {
    fn check(&self, ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        let K8sObject::Service(service) = &object.k8s_object else {
            return Vec::new();
        };

        let selector: BTreeMap<&str, &str> = service
            .selector
            .iter()
            .flatten()
            .filter(|(k, _)| !self.ignored_labels.contains(*k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        // Services without a selector are managed by hand (Endpoints/EndpointSlices)
        if selector.is_empty() {
            return Vec::new();
        }

        let matched = ctx
            .objects()
            .iter()
            .filter(|other| other.namespace() == object.namespace())
            .filter_map(|other| extract::extract_pod_labels(&other.k8s_object))
            .any(|labels| {
                selector
                    .iter()
                    .all(|(k, v)| labels.get(*k).is_some_and(|actual| actual == v))
            });

        if matched {
            return Vec::new();
        }

        let rendered = selector
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        vec![Diagnostic::new(format!(
            "no pods found matching service labels ({rendered})"
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LintContextImpl;
    use crate::parser::yaml::parse_yaml;

    const MANIFESTS: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
        tier: frontend
    spec:
      containers:
      - name: web
        image: nginx:1.25
---
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  selector:
    app: web
---
apiVersion: v1
kind: Service
metadata:
  name: api
spec:
  selector:
    app: api
    release: stable
---
apiVersion: v1
kind: Service
metadata:
  name: external
spec:
  type: ExternalName
"#;

    fn run(raw: &str) -> Vec<(String, Vec<Diagnostic>)> {
        let ctx: LintContextImpl = parse_yaml(MANIFESTS).unwrap().into_iter().collect();
        let params = DanglingServiceTemplate
            .parse_and_validate(&serde_yaml::from_str(raw).unwrap())
            .unwrap();
        let check = DanglingServiceTemplate.instantiate(&params).unwrap();
        ctx.objects()
            .iter()
            .map(|obj| (obj.name().to_string(), check.check(&ctx, obj)))
            .collect()
    }

    #[test]
    fn test_matching_service_ok() {
        let results = run("~");
        assert!(results[1].1.is_empty(), "web service matches the deployment");
        assert!(results[3].1.is_empty(), "services without selectors are skipped");
        assert!(results[0].1.is_empty(), "deployments are not services");
    }

    #[test]
    fn test_dangling_service_flagged() {
        let results = run("~");
        assert_eq!(results[2].0, "api");
        assert_eq!(results[2].1.len(), 1);
        assert_eq!(
            results[2].1[0].message,
            "no pods found matching service labels (app=api,release=stable)"
        );
    }

    #[test]
    fn test_ignored_labels() {
        let results = run("ignoredLabels: [app, release]");
        assert!(results[2].1.is_empty());
    }

    #[test]
    fn test_namespace_must_match() {
        let yaml = MANIFESTS.replacen(
            "  name: web\nspec:\n  selector:\n    app: web",
            "  name: web\n  namespace: other\nspec:\n  selector:\n    app: web",
            1,
        );
        let ctx: LintContextImpl = parse_yaml(&yaml).unwrap().into_iter().collect();
        let check = DanglingServiceTemplate.instantiate(&Params::new()).unwrap();
        let service = &ctx.objects()[1];
        assert_eq!(service.namespace(), Some("other"));
        assert_eq!(check.check(&ctx, service).len(), 1);
    }
}
