//! Annotation-based check ignoring.
//!
//! An object carrying an `ignore-check.kube-linter.io/<template-key>`
//! annotation is skipped by that template during a batch run.

use crate::context::Object;
use std::collections::BTreeSet;

/// Prefix for ignore annotations.
pub const IGNORE_ANNOTATION_PREFIX: &str = "ignore-check.kube-linter.io/";

/// Template keys an object opts out of, in key order.
pub fn get_ignored_checks(obj: &Object) -> BTreeSet<String> {
    obj.annotations()
        .into_iter()
        .flat_map(|annotations| annotations.keys())
        .filter_map(|key| key.strip_prefix(IGNORE_ANNOTATION_PREFIX))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `template_key` should be skipped for this object.
pub fn should_ignore_check(obj: &Object, template_key: &str) -> bool {
    obj.annotations().is_some_and(|annotations| {
        annotations.contains_key(&format!("{IGNORE_ANNOTATION_PREFIX}{template_key}"))
    })
}
