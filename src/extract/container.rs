//! Container extraction utilities.

use crate::context::object::{ContainerSpec, PodSpec};

/// Extract all containers from a PodSpec (containers + init containers).
pub fn all_containers(pod_spec: &PodSpec) -> impl Iterator<Item = &ContainerSpec> {
    pod_spec
        .containers
        .iter()
        .chain(pod_spec.init_containers.iter())
}
