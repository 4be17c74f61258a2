//! Job TTL template.
//!
//! Flags Jobs that never get garbage collected after finishing, or that
//! linger longer than the configured maximum.

use crate::context::{K8sObject, LintContext, Object};
use crate::objectkinds::DEPLOYMENT_LIKE;
use crate::params::{Constraint, ParamValue, ParameterDesc, ParameterType, Params};
use crate::registry::{Registry, RegistryError};
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::{Diagnostic, ObjectKindsDesc};

const TEMPLATE_KEY: &str = "no-job-ttl-seconds";
const MAX_TTL_PARAM: &str = "maxTtlSeconds";
const DEFAULT_MAX_TTL: i64 = 100;

/// Register this template.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(JobTtlSecondsTemplate)
}

/// Template for checking `spec.ttlSecondsAfterFinished` on Jobs.
pub struct JobTtlSecondsTemplate;

impl Template for JobTtlSecondsTemplate {
    fn key(&self) -> &str {
        TEMPLATE_KEY
    }

    fn human_name(&self) -> &str {
        "No Job TTL Service"
    }

    fn description(&self) -> &str {
        "Flag jobs that do not set spec.ttlSecondsAfterFinished"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&[DEPLOYMENT_LIKE])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        vec![
            ParameterDesc::new(
                MAX_TTL_PARAM,
                ParameterType::Integer,
                "Largest accepted value of ttlSecondsAfterFinished",
            )
            .with_default(ParamValue::Integer(DEFAULT_MAX_TTL))
            .with_constraint(Constraint::at_least(0)),
        ]
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        let max_ttl = params.integer(MAX_TTL_PARAM).unwrap_or(DEFAULT_MAX_TTL);
        Ok(Box::new(JobTtlSecondsCheck { max_ttl }))
    }
}

struct JobTtlSecondsCheck {
    max_ttl: i64,
}

impl CheckFunc for JobTtlSecondsCheck {
    fn check(&self, _ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        let K8sObject::Job(job) = &object.k8s_object else {
            return Vec::new();
        };

        match job.ttl_seconds_after_finished {
            None => vec![Diagnostic::new("Job not specifying ttlSecondsAfterFinished")],
            Some(ttl) if i64::from(ttl) > self.max_ttl => {
                vec![Diagnostic::new("Job specifying too large ttlSecondsAfterFinished")]
            }
            Some(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LintContextImpl;
    use crate::parser::yaml::parse_yaml;

    fn job(ttl: Option<i32>) -> String {
        let ttl_line = ttl
            .map(|t| format!("  ttlSecondsAfterFinished: {t}\n"))
            .unwrap_or_default();
        format!(
            r#"
apiVersion: batch/v1
kind: Job
metadata:
  name: pi
spec:
{ttl_line}  template:
    spec:
      restartPolicy: Never
      containers:
      - name: pi
        image: perl:5.34.0
"#
        )
    }

    fn run(yaml: &str, raw: &str) -> Vec<Diagnostic> {
        let objects = parse_yaml(yaml).unwrap();
        let template = JobTtlSecondsTemplate;
        let params = template
            .parse_and_validate(&serde_yaml::from_str(raw).unwrap())
            .unwrap();
        let check = template.instantiate(&params).unwrap();
        let ctx = LintContextImpl::new();
        check.check(&ctx, &objects[0])
    }

    #[test]
    fn test_display_metadata() {
        let template = JobTtlSecondsTemplate;
        assert_eq!(template.key(), "no-job-ttl-seconds");
        assert_eq!(template.human_name(), "No Job TTL Service");
    }

    #[test]
    fn test_job_without_ttl() {
        let diagnostics = run(&job(None), "~");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("not specifying"));
    }

    #[test]
    fn test_job_ttl_at_limit() {
        assert!(run(&job(Some(100)), "~").is_empty());
        assert!(run(&job(Some(0)), "~").is_empty());
    }

    #[test]
    fn test_job_ttl_above_limit() {
        let diagnostics = run(&job(Some(101)), "~");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("too large"));
    }

    #[test]
    fn test_custom_limit() {
        assert!(run(&job(Some(3600)), "maxTtlSeconds: 3600").is_empty());
        assert_eq!(run(&job(Some(3601)), "maxTtlSeconds: 3600").len(), 1);
    }

    #[test]
    fn test_negative_limit_rejected() {
        let err = JobTtlSecondsTemplate
            .parse_and_validate(&serde_yaml::from_str("maxTtlSeconds: -1").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("maxTtlSeconds"));
    }

    #[test]
    fn test_non_job_ignored() {
        let yaml = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
      - name: web
        image: nginx:1.25
"#;
        assert!(run(yaml, "~").is_empty());
    }
}
