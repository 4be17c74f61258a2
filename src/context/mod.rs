//! Lint context for Kubernetes objects.
//!
//! The lint context holds all parsed Kubernetes objects for one run and
//! provides read-only access to them during check execution.

pub mod object;

pub use object::{InvalidObject, K8sObject, Object, ObjectMetadata};

/// A lint context provides access to all parsed Kubernetes objects.
///
/// Object order is the order the loader produced them in; the engine
/// reports findings in that order.
pub trait LintContext: Send + Sync {
    /// Get all valid parsed objects.
    fn objects(&self) -> &[Object];

    /// Get all objects that failed to parse.
    fn invalid_objects(&self) -> &[InvalidObject];
}

/// Default in-memory implementation of LintContext.
#[derive(Debug, Default)]
pub struct LintContextImpl {
    objects: Vec<Object>,
    invalid_objects: Vec<InvalidObject>,
}

impl LintContextImpl {
    /// Create a new empty lint context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a valid object to the context.
    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Add an invalid object to the context.
    pub fn add_invalid_object(&mut self, invalid: InvalidObject) {
        self.invalid_objects.push(invalid);
    }
}

impl FromIterator<Object> for LintContextImpl {
    fn from_iter<I: IntoIterator<Item = Object>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
            invalid_objects: Vec::new(),
        }
    }
}

impl Extend<Object> for LintContextImpl {
    fn extend<I: IntoIterator<Item = Object>>(&mut self, iter: I) {
        self.objects.extend(iter);
    }
}

impl LintContext for LintContextImpl {
    fn objects(&self) -> &[Object] {
        &self.objects
    }

    fn invalid_objects(&self) -> &[InvalidObject] {
        &self.invalid_objects
    }
}
