//! Image tag policy template.
//!
//! Images are matched against either a block list or an allow list of
//! regular expressions. With neither configured, the block list defaults
//! to images tagged `latest` or carrying no tag.

use crate::context::{LintContext, Object};
use crate::extract;
use crate::objectkinds::DEPLOYMENT_LIKE;
use crate::params::{ParameterDesc, ParameterType, Params};
use crate::registry::{Registry, RegistryError};
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::{Diagnostic, ObjectKindsDesc};
use regex::Regex;

const BLOCK_LIST_PARAM: &str = "blockList";
const ALLOW_LIST_PARAM: &str = "allowList";

/// Block list used when neither list is configured.
pub const DEFAULT_BLOCK_LIST: &[&str] = &[r".*:(latest)$", r"^[^:]*$", r"(.*/[^:]+)$"];

/// Register this template.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(LatestTagTemplate)
}

/// Template for enforcing image tag policies.
pub struct LatestTagTemplate;

impl Template for LatestTagTemplate {
    fn key(&self) -> &str {
        "latest-tag"
    }

    fn human_name(&self) -> &str {
        "Latest Tag"
    }

    fn description(&self) -> &str {
        "Flag applications running container images that do not satisfy the allowList or blockList criteria"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&[DEPLOYMENT_LIKE])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        vec![
            ParameterDesc::new(
                BLOCK_LIST_PARAM,
                ParameterType::StringList,
                "List of regular expressions specifying pattern(s) for container images that will be blocked",
            ),
            ParameterDesc::new(
                ALLOW_LIST_PARAM,
                ParameterType::StringList,
                "List of regular expressions specifying pattern(s) for container images that will be allowed",
            ),
        ]
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        let block_list = params.string_list(BLOCK_LIST_PARAM).unwrap_or_default();
        let allow_list = params.string_list(ALLOW_LIST_PARAM).unwrap_or_default();

        let policy = match (block_list.is_empty(), allow_list.is_empty()) {
            (false, false) => {
                return Err(TemplateError::unsatisfiable(format!(
                    "\"{ALLOW_LIST_PARAM}\" and \"{BLOCK_LIST_PARAM}\" cannot both be set"
                )));
            }
            (false, true) => ImagePolicy::Block(compile(BLOCK_LIST_PARAM, block_list)?),
            (true, false) => ImagePolicy::Allow(compile(ALLOW_LIST_PARAM, allow_list)?),
            (true, true) => {
                let defaults: Vec<String> =
                    DEFAULT_BLOCK_LIST.iter().map(|s| (*s).to_string()).collect();
                ImagePolicy::Block(compile(BLOCK_LIST_PARAM, &defaults)?)
            }
        };

        Ok(Box::new(LatestTagCheck { policy }))
    }
}

fn compile(param: &str, patterns: &[String]) -> Result<Vec<Regex>, TemplateError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                TemplateError::unsatisfiable(format!(
                    "{param} entry \"{pattern}\" is not a valid regular expression: {e}"
                ))
            })
        })
        .collect()
}

enum ImagePolicy {
    Block(Vec<Regex>),
    Allow(Vec<Regex>),
}

impl ImagePolicy {
    fn violation(&self, container: &str, image: &str) -> Option<String> {
        match self {
            Self::Block(patterns) => patterns.iter().find(|re| re.is_match(image)).map(|re| {
                format!(
                    "The container \"{container}\" is using an invalid container image, \"{image}\". \
                     Please use images that are not blocked by the `BlockList` criteria : \"{}\"",
                    re.as_str()
                )
            }),
            Self::Allow(patterns) if !patterns.iter().any(|re| re.is_match(image)) => {
                let joined = patterns
                    .iter()
                    .map(Regex::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "The container \"{container}\" is using an invalid container image, \"{image}\". \
                     Please use images that satisfy the `AllowList` criteria : [{joined}]"
                ))
            }
            Self::Allow(_) => None,
        }
    }
}

struct LatestTagCheck {
    policy: ImagePolicy,
}

impl CheckFunc for LatestTagCheck {
    fn check(&self, _ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        let Some(pod_spec) = extract::extract_pod_spec(&object.k8s_object) else {
            return Vec::new();
        };

        extract::all_containers(pod_spec)
            .filter_map(|container| {
                let image = container.image.as_deref()?;
                self.policy.violation(&container.name, image)
            })
            .map(Diagnostic::new)
            .collect()
    }
}
