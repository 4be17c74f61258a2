//! Replica count check template.

use crate::context::{K8sObject, LintContext, Object};
use crate::params::{Constraint, ParamValue, ParameterDesc, ParameterType, Params};
use crate::registry::{Registry, RegistryError};
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::{Diagnostic, ObjectKindsDesc};

const MIN_REPLICAS_PARAM: &str = "minReplicas";
const DEFAULT_MIN_REPLICAS: i64 = 2;

/// Register this template.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(ReplicasTemplate)
}

/// Template for checking minimum replica count.
pub struct ReplicasTemplate;

impl Template for ReplicasTemplate {
    fn key(&self) -> &str {
        "minimum-replicas"
    }

    fn human_name(&self) -> &str {
        "Minimum Replicas"
    }

    fn description(&self) -> &str {
        "Flag applications running fewer than the specified number of replicas"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&["Deployment", "StatefulSet", "ReplicaSet"])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        vec![
            ParameterDesc::new(
                MIN_REPLICAS_PARAM,
                ParameterType::Integer,
                "The minimum number of replicas a deployment should have",
            )
            .with_default(ParamValue::Integer(DEFAULT_MIN_REPLICAS))
            .with_constraint(Constraint::at_least(1)),
        ]
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        let min_replicas = params
            .integer(MIN_REPLICAS_PARAM)
            .unwrap_or(DEFAULT_MIN_REPLICAS);
        Ok(Box::new(ReplicasCheck { min_replicas }))
    }
}

struct ReplicasCheck {
    min_replicas: i64,
}

impl CheckFunc for ReplicasCheck {
    fn check(&self, _ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        let replicas = match &object.k8s_object {
            K8sObject::Deployment(d) => d.replicas,
            K8sObject::StatefulSet(s) => s.replicas,
            K8sObject::ReplicaSet(r) => r.replicas,
            _ => return Vec::new(),
        };

        match replicas {
            Some(count) if i64::from(count) < self.min_replicas => vec![Diagnostic::new(format!(
                "object has {} replicas but minimum required replicas is {}",
                count, self.min_replicas
            ))],
            // Unset replicas default to 1 in Kubernetes
            None if self.min_replicas > 1 => vec![Diagnostic::new(format!(
                "object has no replica count set (defaults to 1) but minimum required replicas is {}",
                self.min_replicas
            ))],
            _ => Vec::new(),
        }
    }
}
