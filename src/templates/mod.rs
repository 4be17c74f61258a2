//! Check templates.
//!
//! Templates are reusable check implementations that are configured with
//! parameters and instantiated into check functions. Each template module
//! exposes a `register` function; [`builtin_registry`] calls all of them.

pub mod dangling;
pub mod jobttlseconds;
pub mod latesttag;
pub mod replicas;
pub mod required;

use crate::context::{LintContext, Object};
use crate::params::{self, ParamError, ParameterDesc, Params};
use crate::registry::{Registry, RegistryError};
use crate::types::{Diagnostic, ObjectKindsDesc};
use thiserror::Error;

/// A check function that analyzes a Kubernetes object.
///
/// Check functions hold only the configuration they were instantiated
/// with. They never fail: when a check cannot decide, it reports nothing.
pub trait CheckFunc: Send + Sync {
    /// Run the check on an object and return any diagnostics.
    fn check(&self, ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic>;
}

/// A template for creating checks.
pub trait Template: Send + Sync {
    /// Get the template key (unique identifier).
    fn key(&self) -> &str;

    /// Get the human-readable name.
    fn human_name(&self) -> &str;

    /// Get the template description.
    fn description(&self) -> &str;

    /// Get the supported object kinds.
    fn supported_object_kinds(&self) -> ObjectKindsDesc;

    /// Get parameter descriptions.
    fn parameters(&self) -> Vec<ParameterDesc>;

    /// Validate raw configuration against this template's parameters.
    fn parse_and_validate(&self, raw: &serde_yaml::Value) -> Result<Params, ParamError> {
        params::parse_and_validate(&self.parameters(), raw)
    }

    /// Instantiate a check function with validated parameters.
    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError>;
}

/// Template instantiation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The parameters are well-formed but cannot be honoured by this template.
    #[error("unsatisfiable configuration: {reason}")]
    UnsatisfiableConfiguration { reason: String },
}

impl TemplateError {
    pub(crate) fn unsatisfiable(reason: impl Into<String>) -> Self {
        Self::UnsatisfiableConfiguration {
            reason: reason.into(),
        }
    }
}

/// Build the registry holding every built-in template.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

/// Register every built-in template into an existing registry.
pub fn register_builtin(registry: &mut Registry) -> Result<(), RegistryError> {
    dangling::register(registry)?;
    jobttlseconds::register(registry)?;
    latesttag::register(registry)?;
    replicas::register(registry)?;
    required::register(registry)?;
    Ok(())
}
