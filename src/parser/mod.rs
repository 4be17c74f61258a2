//! Manifest loading.
//!
//! Builds lint contexts from Kubernetes YAML manifests.

pub mod yaml;

pub use yaml::{
    YamlParseError, load_context, parse_yaml, parse_yaml_dir, parse_yaml_file, parse_yaml_with_path,
};
