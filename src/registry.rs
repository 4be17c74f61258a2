//! Template registry.
//!
//! The registry is assembled once at start-up (see
//! [`crate::templates::builtin_registry`]) and then shared by reference.
//! Registration needs `&mut Registry`, lookups only `&Registry`, so no
//! lookup can race a registration.

use crate::objectkinds;
use crate::templates::Template;
use log::debug;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Errors raised while registering templates.
///
/// These are programming errors in template definitions; a registry that
/// failed to assemble must not be used for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another template already uses this key.
    #[error("duplicate template key \"{key}\"")]
    DuplicateTemplateKey { key: String },

    /// The template definition is incomplete or inconsistent.
    #[error("invalid template \"{key}\": {reason}")]
    InvalidTemplate { key: String, reason: String },
}

/// Catalog of templates keyed by template key.
#[derive(Default)]
pub struct Registry {
    templates: BTreeMap<String, Box<dyn Template>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    ///
    /// Fails without modifying the registry if the key is already taken or
    /// the template definition is invalid.
    pub fn register<T: Template + 'static>(&mut self, template: T) -> Result<(), RegistryError> {
        self.register_boxed(Box::new(template))
    }

    /// Register an already boxed template.
    pub fn register_boxed(&mut self, template: Box<dyn Template>) -> Result<(), RegistryError> {
        validate_template(template.as_ref())?;

        let key = template.key().to_string();
        if self.templates.contains_key(&key) {
            return Err(RegistryError::DuplicateTemplateKey { key });
        }

        debug!(
            "Registered template '{}' for kinds [{}]",
            key,
            template.supported_object_kinds()
        );
        self.templates.insert(key, template);
        Ok(())
    }

    /// Look up a template by key.
    pub fn lookup(&self, key: &str) -> Option<&dyn Template> {
        self.templates.get(key).map(|t| t.as_ref())
    }

    /// Whether a template with this key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// All templates, ordered by key.
    pub fn all(&self) -> impl Iterator<Item = &dyn Template> {
        self.templates.values().map(|t| t.as_ref())
    }

    /// All template keys, ordered.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn validate_template(template: &dyn Template) -> Result<(), RegistryError> {
    let key = template.key();
    let invalid = |reason: String| RegistryError::InvalidTemplate {
        key: key.to_string(),
        reason,
    };

    if key.trim().is_empty() {
        return Err(invalid("template key is empty".to_string()));
    }

    let kinds = template.supported_object_kinds();
    if kinds.is_empty() {
        return Err(invalid("no supported object kinds".to_string()));
    }
    if let Some(unknown) = kinds
        .object_kinds
        .iter()
        .find(|k| !objectkinds::is_known_specifier(k))
    {
        return Err(invalid(format!("unknown object kind \"{unknown}\"")));
    }

    let mut seen = HashSet::new();
    for desc in template.parameters() {
        if !seen.insert(desc.name.clone()) {
            return Err(invalid(format!("parameter \"{}\" declared twice", desc.name)));
        }
        desc.check_consistency().map_err(invalid)?;
    }

    Ok(())
}
