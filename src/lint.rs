//! Evaluation driver.
//!
//! Looks a template up, validates its raw parameters, instantiates the check
//! function once, and applies it to every object of a supported kind. The
//! resulting findings follow the context's object order.

use crate::config::LintConfig;
use crate::context::{LintContext, Object};
use crate::params::ParamError;
use crate::pragma::should_ignore_check;
use crate::registry::Registry;
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::Finding;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Errors from evaluating one template.
///
/// Parameter and instantiation errors keep the inner error's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No template is registered under the key.
    #[error("unknown template \"{key}\"")]
    UnknownTemplate { key: String },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// A template that could not be run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    /// Template key as configured.
    pub key: String,
    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub error: EngineError,
}

fn serialize_display<S: serde::Serializer>(
    error: &EngineError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    /// Findings grouped by template key, then object order.
    pub findings: Vec<Finding>,
    /// Templates skipped because of configuration errors.
    pub config_errors: Vec<ConfigIssue>,
    /// Summary of the run.
    pub summary: LintSummary,
}

impl LintReport {
    /// Whether any finding was reported.
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Whether any enabled template failed to configure.
    pub fn has_config_errors(&self) -> bool {
        !self.config_errors.is_empty()
    }
}

/// Counts for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintSummary {
    /// Number of valid objects in the context.
    pub objects_analyzed: usize,
    /// Number of documents that failed to load.
    pub invalid_objects: usize,
    /// Number of templates that ran.
    pub templates_run: usize,
    /// Number of findings.
    pub findings: usize,
}

/// Runs templates from a registry against a lint context.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a Registry,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a fully assembled registry.
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Evaluate one template with raw parameters against every object.
    ///
    /// Objects whose kind the template does not support are never passed to
    /// the check function. An empty result means no violations.
    pub fn evaluate(
        &self,
        key: &str,
        raw: &serde_yaml::Value,
        ctx: &dyn LintContext,
    ) -> Result<Vec<Finding>, EngineError> {
        let (template, check) = self.prepare(key, raw)?;
        Ok(apply(template, check.as_ref(), ctx, |_| true))
    }

    /// Run every template the configuration enables.
    ///
    /// A template that fails lookup, validation or instantiation is recorded
    /// in `config_errors` and the others still run. Objects annotated with
    /// `ignore-check.kube-linter.io/<key>` are skipped for that template.
    pub fn run(&self, config: &LintConfig, ctx: &dyn LintContext) -> LintReport {
        let keys = config.resolve_templates(self.registry);

        let results: Vec<(&String, Result<Vec<Finding>, EngineError>)> = keys
            .par_iter()
            .map(|key| {
                let result = self.prepare(key, config.params_for(key)).map(|(template, check)| {
                    apply(template, check.as_ref(), ctx, |obj| {
                        !should_ignore_check(obj, key)
                    })
                });
                (key, result)
            })
            .collect();

        let mut report = LintReport::default();
        for (key, result) in results {
            match result {
                Ok(mut findings) => {
                    report.summary.templates_run += 1;
                    report.findings.append(&mut findings);
                }
                Err(error) => {
                    warn!("Skipping template '{}': {}", key, error);
                    report.config_errors.push(ConfigIssue {
                        key: key.clone(),
                        error,
                    });
                }
            }
        }

        report.summary.objects_analyzed = ctx.objects().len();
        report.summary.invalid_objects = ctx.invalid_objects().len();
        report.summary.findings = report.findings.len();

        info!(
            "Linted {} objects with {} templates: {} findings, {} configuration errors",
            report.summary.objects_analyzed,
            report.summary.templates_run,
            report.summary.findings,
            report.config_errors.len()
        );

        report
    }

    fn prepare(
        &self,
        key: &str,
        raw: &serde_yaml::Value,
    ) -> Result<(&'a dyn Template, Box<dyn CheckFunc>), EngineError> {
        let template = self
            .registry
            .lookup(key)
            .ok_or_else(|| EngineError::UnknownTemplate {
                key: key.to_string(),
            })?;

        let params = template.parse_and_validate(raw)?;
        let check = template.instantiate(&params)?;
        debug!("Instantiated template '{}'", key);

        Ok((template, check))
    }
}

/// Apply a check function to every supported object, in context order.
///
/// One entry per object; unsupported or excluded objects map to an empty `Vec`.
fn apply<F>(
    template: &dyn Template,
    check: &dyn CheckFunc,
    ctx: &dyn LintContext,
    include: F,
) -> Vec<Finding>
where
    F: Fn(&Object) -> bool + Sync,
{
    let kinds = template.supported_object_kinds();
    let key = template.key();

    let per_object: Vec<Vec<Finding>> = ctx
        .objects()
        .par_iter()
        .map(|obj| {
            if !kinds.matches_object(obj) || !include(obj) {
                return Vec::new();
            }
            check
                .check(ctx, obj)
                .into_iter()
                .map(|diag| {
                    let finding = Finding::new(
                        key,
                        obj.object_ref(),
                        diag.message,
                        &obj.metadata.file_path,
                    );
                    match obj.metadata.line_number {
                        Some(line) => finding.with_line(line),
                        None => finding,
                    }
                })
                .collect()
        })
        .collect();

    per_object.into_iter().flatten().collect()
}
