//! Required label and annotation templates.
//!
//! Both share one check: the object must carry the configured metadata key,
//! and when a value pattern is configured the value must match it fully.

use crate::context::{LintContext, Object};
use crate::extract;
use crate::objectkinds::ANY;
use crate::params::{Constraint, ParameterDesc, ParameterType, Params};
use crate::registry::{Registry, RegistryError};
use crate::templates::{CheckFunc, Template, TemplateError};
use crate::types::{Diagnostic, ObjectKindsDesc};
use regex::Regex;

const KEY_PARAM: &str = "key";
const VALUE_PARAM: &str = "value";

/// Register both templates.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(RequiredLabelTemplate)?;
    registry.register(RequiredAnnotationTemplate)
}

/// Which metadata map a check reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataField {
    Label,
    Annotation,
}

impl MetadataField {
    fn noun(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Annotation => "annotation",
        }
    }

    fn parameters(self) -> Vec<ParameterDesc> {
        vec![
            ParameterDesc::new(
                KEY_PARAM,
                ParameterType::String,
                format!("Key of the required {}", self.noun()),
            )
            .required()
            .with_constraint(Constraint::NonEmpty),
            ParameterDesc::new(
                VALUE_PARAM,
                ParameterType::String,
                format!(
                    "Regular expression the {} value must fully match",
                    self.noun()
                ),
            ),
        ]
    }

    fn instantiate(self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        let key = params.string(KEY_PARAM).unwrap_or_default().to_string();
        let value = params
            .string(VALUE_PARAM)
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$"))
                    .map(|re| ValuePattern {
                        source: pattern.to_string(),
                        re,
                    })
                    .map_err(|e| {
                        TemplateError::unsatisfiable(format!(
                            "{VALUE_PARAM} \"{pattern}\" is not a valid regular expression: {e}"
                        ))
                    })
            })
            .transpose()?;

        Ok(Box::new(RequiredMetadataCheck {
            field: self,
            key,
            value,
        }))
    }
}

/// Template requiring a label on every object.
pub struct RequiredLabelTemplate;

impl Template for RequiredLabelTemplate {
    fn key(&self) -> &str {
        "required-label"
    }

    fn human_name(&self) -> &str {
        "Required Label"
    }

    fn description(&self) -> &str {
        "Flag objects not carrying at least one label matching the provided patterns"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&[ANY])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        MetadataField::Label.parameters()
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        MetadataField::Label.instantiate(params)
    }
}

/// Template requiring an annotation on every object.
pub struct RequiredAnnotationTemplate;

impl Template for RequiredAnnotationTemplate {
    fn key(&self) -> &str {
        "required-annotation"
    }

    fn human_name(&self) -> &str {
        "Required Annotation"
    }

    fn description(&self) -> &str {
        "Flag objects not carrying at least one annotation matching the provided patterns"
    }

    fn supported_object_kinds(&self) -> ObjectKindsDesc {
        ObjectKindsDesc::new(&[ANY])
    }

    fn parameters(&self) -> Vec<ParameterDesc> {
        MetadataField::Annotation.parameters()
    }

    fn instantiate(&self, params: &Params) -> Result<Box<dyn CheckFunc>, TemplateError> {
        MetadataField::Annotation.instantiate(params)
    }
}

struct ValuePattern {
    source: String,
    re: Regex,
}

struct RequiredMetadataCheck {
    field: MetadataField,
    key: String,
    value: Option<ValuePattern>,
}

impl CheckFunc for RequiredMetadataCheck {
    fn check(&self, _ctx: &dyn LintContext, object: &Object) -> Vec<Diagnostic> {
        let actual = match self.field {
            MetadataField::Label => extract::get_label(&object.k8s_object, &self.key),
            MetadataField::Annotation => extract::get_annotation(&object.k8s_object, &self.key),
        };

        let satisfied = match (actual, &self.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(pattern)) => pattern.re.is_match(actual),
        };
        if satisfied {
            return Vec::new();
        }

        let expected = self
            .value
            .as_ref()
            .map_or("<any>", |pattern| pattern.source.as_str());
        vec![Diagnostic::new(format!(
            "no {} matching \"{}={}\" found",
            self.field.noun(),
            self.key,
            expected
        ))]
    }
}
