//! # kubelint-engine
//!
//! A check-template engine for statically linting Kubernetes manifests.
//!
//! Templates are registered in a [`Registry`], configured with raw YAML
//! parameters that are validated against each template's schema, and
//! instantiated into check functions. The [`Evaluator`] runs those check
//! functions over a [`LintContext`] and returns [`Finding`]s in a stable
//! order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kubelint_engine::{Evaluator, LintConfig, builtin_registry, parser};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = builtin_registry()?;
//! let config = LintConfig::load_from_file(Path::new(".kube-linter.yaml"))?;
//! let ctx = parser::load_context(Path::new("deploy/"), &config)?;
//!
//! let report = Evaluator::new(&registry).run(&config, &ctx);
//! for finding in &report.findings {
//!     println!("{finding}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod extract;
pub mod lint;
pub mod objectkinds;
pub mod params;
pub mod parser;
pub mod pragma;
pub mod registry;
pub mod templates;
pub mod types;

pub use config::{ConfigError, DEFAULT_TEMPLATES, LintConfig};
pub use context::{InvalidObject, K8sObject, LintContext, LintContextImpl, Object, ObjectMetadata};
pub use lint::{ConfigIssue, EngineError, Evaluator, LintReport, LintSummary};
pub use params::{
    Constraint, ParamError, ParamValue, ParameterDesc, ParameterType, Params, parse_and_validate,
};
pub use registry::{Registry, RegistryError};
pub use templates::{CheckFunc, Template, TemplateError, builtin_registry, register_builtin};
pub use types::{Diagnostic, Finding, ObjectKind, ObjectKindsDesc, ObjectRef};
