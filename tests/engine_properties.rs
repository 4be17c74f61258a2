use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kubelint_engine::context::object::{
    CommonMeta, ContainerSpec, DeploymentData, JobData, PodSpec, PodTemplateSpec, ServiceData,
    UnknownObject,
};
use kubelint_engine::parser::parse_yaml;
use kubelint_engine::{
    CheckFunc, Diagnostic, EngineError, Evaluator, K8sObject, LintConfig, LintContext,
    LintContextImpl, Object, ObjectKindsDesc, ObjectMetadata, ParameterDesc, Params, Registry,
    RegistryError, Template, TemplateError, builtin_registry,
};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_yaml::Value;

fn meta(name: &str) -> CommonMeta {
    CommonMeta {
        name: name.to_string(),
        ..Default::default()
    }
}

fn job(name: &str, ttl: Option<i32>) -> Object {
    Object::new(
        ObjectMetadata::from_file("jobs.yaml"),
        K8sObject::Job(Box::new(JobData {
            meta: meta(name),
            template: None,
            ttl_seconds_after_finished: ttl,
        })),
    )
}

fn deployment(name: &str, image: &str) -> Object {
    Object::new(
        ObjectMetadata::from_file("apps.yaml"),
        K8sObject::Deployment(Box::new(DeploymentData {
            meta: meta(name),
            template: Some(PodTemplateSpec {
                labels: Some(BTreeMap::from([("app".to_string(), name.to_string())])),
                spec: PodSpec {
                    containers: vec![ContainerSpec {
                        name: "main".to_string(),
                        image: Some(image.to_string()),
                    }],
                    ..Default::default()
                },
            }),
            ..Default::default()
        })),
    )
}

fn service(name: &str, app: &str) -> Object {
    Object::new(
        ObjectMetadata::from_file("svc.yaml"),
        K8sObject::Service(Box::new(ServiceData {
            meta: meta(name),
            selector: Some(BTreeMap::from([("app".to_string(), app.to_string())])),
            type_: None,
        })),
    )
}

fn untyped(kind: &str, name: &str) -> Object {
    Object::new(
        ObjectMetadata::from_file("misc.yaml"),
        K8sObject::Unknown(Box::new(UnknownObject {
            api_version: "v1".to_string(),
            kind: kind.to_string(),
            meta: meta(name),
        })),
    )
}

/// Shared call counters for [`CountingTemplate`].
#[derive(Clone, Default)]
struct Counters {
    instantiated: Arc<AtomicUsize>,
    checked: Arc<AtomicUsize>,
}

impl Counters {
    fn instantiated(&self) -> usize {
        self.instantiated.load(Ordering::SeqCst)
    }

    fn checked(&self) -> usize {
        self.checked.load(Ordering::SeqCst)
    }
}

/// Reports every object that reaches its check function.
struct CountingTemplate {
    kinds: &'static [&'static str],
    counters: Counters,
}

struct CountingCheck {
    checked: Arc<AtomicUsize>,
}

impl Template for CountingTemplate {
    fn key(&self) -> &str {
        "counting"
    }

    fn human_name(&self) -> &str {
        "Counting"
    }

    fn description(&self) -> &str {
        "Reports every object it is given"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(self.kinds)
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        Vec::new()
    }

    fn instantiate(&self, _params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        self.counters.instantiated.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingCheck {
            checked: Arc::clone(&self.counters.checked),
        }))
    }
}

impl CheckFunc for CountingCheck {
    fn check(&self, _ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        self.checked.fetch_add(1, Ordering::SeqCst);
        vec![Diagnostic::new(format!("saw {}", object.object_ref().kind))]
    }
}

fn counting_registry(kinds: &'static [&'static str]) -> (Registry, Counters) {
    let counters = Counters::default();
    let mut registry = Registry::new();
    registry
        .register(CountingTemplate {
            kinds,
            counters: counters.clone(),
        })
        .unwrap();
    (registry, counters)
}

#[test]
fn kind_filter_only_passes_supported_objects() {
    let (registry, counters) = counting_registry(&["Job"]);

    let ctx: LintContextImpl = vec![
        job("a", None),
        deployment("web", "nginx:1.25"),
        job("b", Some(10)),
        service("web", "web"),
    ]
    .into_iter()
    .collect();

    let findings = Evaluator::new(&registry)
        .evaluate("counting", &Value::Null, &ctx)
        .unwrap();

    assert_eq!(counters.checked(), 2);
    let names: Vec<&str> = findings.iter().map(|f| f.object.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(findings.iter().all(|f| f.message == "saw Job"));
}

#[test]
fn kind_filter_selects_untyped_kinds_by_name() {
    let (registry, counters) = counting_registry(&["ConfigMap"]);

    let ctx: LintContextImpl = vec![
        untyped("ConfigMap", "settings"),
        untyped("Secret", "credentials"),
        job("a", None),
        untyped("ConfigMap", "features"),
    ]
    .into_iter()
    .collect();

    let findings = Evaluator::new(&registry)
        .evaluate("counting", &Value::Null, &ctx)
        .unwrap();

    assert_eq!(counters.checked(), 2);
    let objects: Vec<String> = findings.iter().map(|f| f.object.to_string()).collect();
    assert_eq!(objects, vec!["ConfigMap settings", "ConfigMap features"]);
}

#[test]
fn instantiate_runs_once_per_evaluation() {
    let (registry, counters) = counting_registry(&["Any"]);
    let ctx: LintContextImpl = (0..500)
        .map(|i| untyped("ConfigMap", &format!("cm-{i}")))
        .collect();

    let findings = Evaluator::new(&registry)
        .evaluate("counting", &Value::Null, &ctx)
        .unwrap();

    assert_eq!(counters.instantiated(), 1);
    assert_eq!(counters.checked(), 500);
    let names: Vec<String> = findings.into_iter().map(|f| f.object.name).collect();
    let expected: Vec<String> = (0..500).map(|i| format!("cm-{i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn instantiate_runs_once_per_batch_run() {
    let (registry, counters) = counting_registry(&["Any"]);
    let ctx: LintContextImpl = (0..50).map(|i| job(&format!("job-{i}"), None)).collect();
    let config = LintConfig::new().without_defaults().include("counting");

    let report = Evaluator::new(&registry).run(&config, &ctx);

    assert_eq!(counters.instantiated(), 1);
    assert_eq!(report.findings.len(), 50);
    assert_eq!(report.summary.templates_run, 1);
}

#[test]
fn unsupported_kinds_yield_no_findings() {
    let registry = builtin_registry().unwrap();
    let ctx: LintContextImpl = vec![service("orphan", "missing")].into_iter().collect();

    let findings = Evaluator::new(&registry)
        .evaluate("no-job-ttl-seconds", &Value::Null, &ctx)
        .unwrap();
    assert!(findings.is_empty());
}

#[test]
fn check_functions_ignore_unsupported_kinds() {
    let registry = builtin_registry().unwrap();
    let ctx: LintContextImpl = vec![
        job("batch", None),
        deployment("web", "nginx:latest"),
        service("orphan", "missing"),
        untyped("ConfigMap", "settings"),
    ]
    .into_iter()
    .collect();

    let mut exercised = Vec::new();
    for template in registry.all() {
        let raw = if template.key().starts_with("required-") {
            serde_yaml::from_str("key: owner").unwrap()
        } else {
            Value::Null
        };
        let params = template.parse_and_validate(&raw).unwrap();
        let check = template.instantiate(&params).unwrap();
        let kinds = template.supported_object_kinds();

        for obj in ctx.objects().iter().filter(|obj| !kinds.matches_object(obj)) {
            assert!(
                check.check(&ctx, obj).is_empty(),
                "{} reported on unsupported {}",
                template.key(),
                obj.object_ref()
            );
            exercised.push(template.key().to_string());
        }
    }

    for key in ["dangling-service", "latest-tag", "minimum-replicas", "no-job-ttl-seconds"] {
        assert!(exercised.iter().any(|k| k == key), "{key} was never called");
    }
}

#[test]
fn job_ttl_threshold_boundary() {
    let registry = builtin_registry().unwrap();
    let evaluator = Evaluator::new(&registry);

    let run = |ttl: Option<i32>| {
        let ctx: LintContextImpl = vec![job("batch", ttl)].into_iter().collect();
        evaluator
            .evaluate("no-job-ttl-seconds", &Value::Null, &ctx)
            .unwrap()
            .into_iter()
            .map(|f| f.message)
            .collect::<Vec<_>>()
    };

    assert_eq!(run(None), vec!["Job not specifying ttlSecondsAfterFinished"]);
    assert!(run(Some(100)).is_empty());
    assert_eq!(run(Some(101)), vec!["Job specifying too large ttlSecondsAfterFinished"]);
}

#[test]
fn duplicate_registration_keeps_first() {
    let (mut registry, first) = counting_registry(&["Job"]);
    let second = Counters::default();

    let err = registry
        .register(CountingTemplate {
            kinds: &["Any"],
            counters: second.clone(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateTemplateKey {
            key: "counting".to_string()
        }
    );
    assert_eq!(registry.len(), 1);

    let ctx: LintContextImpl = vec![job("a", None), service("s", "x")].into_iter().collect();
    Evaluator::new(&registry)
        .evaluate("counting", &Value::Null, &ctx)
        .unwrap();
    assert_eq!(first.checked(), 1);
    assert_eq!(second.instantiated(), 0);
    assert_eq!(second.checked(), 0);
}

#[test]
fn unknown_template_is_an_error() {
    let registry = builtin_registry().unwrap();
    let err = Evaluator::new(&registry)
        .evaluate("does-not-exist", &Value::Null, &LintContextImpl::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownTemplate { ref key } if key == "does-not-exist"));
}

#[test]
fn findings_carry_source_lines() {
    let registry = builtin_registry().unwrap();
    let yaml = "\
apiVersion: v1
kind: Service
metadata:
  name: api
  namespace: prod
spec:
  selector:
    app: api
";
    let ctx: LintContextImpl = parse_yaml(yaml).unwrap().into_iter().collect();
    let findings = Evaluator::new(&registry)
        .evaluate("dangling-service", &Value::Null, &ctx)
        .unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, Some(1));
    assert_eq!(
        findings[0].to_string(),
        "Service prod/api: (dangling-service) no pods found matching service labels (app=api)"
    );
}

#[derive(Debug, Clone)]
enum Generated {
    Job(Option<i32>),
    Deployment(usize),
    Service(usize),
}

const IMAGES: &[&str] = &["nginx", "nginx:latest", "nginx:1.25", "ghcr.io/acme/api"];
const APPS: &[&str] = &["web", "api", "worker"];

fn generated_object() -> impl Strategy<Value = Generated> {
    prop_oneof![
        proptest::option::of(0_i32..300).prop_map(Generated::Job),
        (0..IMAGES.len()).prop_map(Generated::Deployment),
        (0..APPS.len()).prop_map(Generated::Service),
    ]
}

fn build_context(generated: &[Generated]) -> LintContextImpl {
    generated
        .iter()
        .enumerate()
        .map(|(i, g)| match g {
            Generated::Job(ttl) => job(&format!("job-{i}"), *ttl),
            Generated::Deployment(image) => deployment(APPS[i % APPS.len()], IMAGES[*image]),
            Generated::Service(app) => service(&format!("svc-{i}"), APPS[*app]),
        })
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn parse_and_validate_is_idempotent(
        max_ttl in -10_i64..1_000,
        extra in proptest::option::of("[a-z]{1,8}"),
    ) {
        let registry = builtin_registry().unwrap();
        let template = registry.lookup("no-job-ttl-seconds").unwrap();

        let mut raw = format!("maxTtlSeconds: {max_ttl}\n");
        if let Some(extra) = &extra {
            raw.push_str(&format!("{extra}x: 1\n"));
        }
        let raw: Value = serde_yaml::from_str(&raw).unwrap();

        prop_assert_eq!(template.parse_and_validate(&raw), template.parse_and_validate(&raw));
    }

    #[test]
    fn evaluate_is_deterministic(
        generated in proptest::collection::vec(generated_object(), 0..24),
    ) {
        let registry = builtin_registry().unwrap();
        let evaluator = Evaluator::new(&registry);
        let ctx = build_context(&generated);

        for key in registry.keys() {
            let raw = if key.starts_with("required-") {
                serde_yaml::from_str("key: app").unwrap()
            } else {
                Value::Null
            };
            let first = evaluator.evaluate(key, &raw, &ctx).unwrap();
            let second = evaluator.evaluate(key, &raw, &ctx).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
