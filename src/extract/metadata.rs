//! Metadata extraction utilities.

use crate::context::K8sObject;

/// Get a label value from an object.
pub fn get_label<'a>(obj: &'a K8sObject, key: &str) -> Option<&'a str> {
    obj.meta()
        .labels
        .as_ref()
        .and_then(|l| l.get(key))
        .map(String::as_str)
}

/// Get an annotation value from an object.
pub fn get_annotation<'a>(obj: &'a K8sObject, key: &str) -> Option<&'a str> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(String::as_str)
}
