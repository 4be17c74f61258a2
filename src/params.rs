//! Parameter schemas and validation.
//!
//! Every template declares an ordered list of [`ParameterDesc`]s. Raw
//! configuration (untyped YAML) is checked against that schema once, at the
//! boundary, and turned into an immutable [`Params`] value. Nothing past the
//! boundary looks at raw YAML again.

use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Name used in errors about the parameter block as a whole.
const ROOT: &str = "<root>";

/// Errors produced while validating raw parameters against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The configuration names a parameter the template does not declare.
    #[error("unknown parameter \"{name}\"")]
    UnknownParameter { name: String },

    /// A required parameter without a default was not supplied.
    #[error("missing required parameter \"{name}\"")]
    MissingParameter { name: String },

    /// A value has the wrong type or violates a constraint.
    #[error("invalid value for parameter \"{name}\": {constraint}")]
    InvalidValue { name: String, constraint: String },
}

impl ParamError {
    fn invalid(name: &str, constraint: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            constraint: constraint.into(),
        }
    }
}

/// The type of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterType {
    String,
    Integer,
    Boolean,
    StringList,
}

impl ParameterType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringList => "list of strings",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A constraint on a parameter value beyond its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    /// Inclusive integer bounds.
    Range { min: Option<i64>, max: Option<i64> },
    /// Strings and lists must not be empty.
    NonEmpty,
}

impl Constraint {
    /// Shorthand for a lower bound only.
    pub fn at_least(min: i64) -> Self {
        Self::Range {
            min: Some(min),
            max: None,
        }
    }

    /// Check a typed value against this constraint.
    ///
    /// Returns the violated condition, phrased for an error message.
    fn check(&self, value: &ParamValue) -> Result<(), String> {
        match (self, value) {
            (Self::Range { min, max }, ParamValue::Integer(n)) => {
                if let Some(min) = min
                    && n < min
                {
                    return Err(format!("must be >= {min}, got {n}"));
                }
                if let Some(max) = max
                    && n > max
                {
                    return Err(format!("must be <= {max}, got {n}"));
                }
                Ok(())
            }
            (Self::NonEmpty, ParamValue::String(s)) if s.is_empty() => {
                Err("must not be empty".to_string())
            }
            (Self::NonEmpty, ParamValue::StringList(l)) if l.is_empty() => {
                Err("must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// A validated, typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    StringList(Vec<String>),
}

impl ParamValue {
    /// The schema type this value belongs to.
    pub fn param_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::String,
            Self::Integer(_) => ParameterType::Integer,
            Self::Boolean(_) => ParameterType::Boolean,
            Self::StringList(_) => ParameterType::StringList,
        }
    }
}

/// Describes one parameter a template accepts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDesc {
    /// Parameter name as written in configuration (camelCase).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Expected type.
    pub param_type: ParameterType,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Value substituted when an optional parameter is absent.
    pub default: Option<ParamValue>,
    /// Constraints checked after the type.
    pub constraints: Vec<Constraint>,
}

impl ParameterDesc {
    /// Create an optional parameter with no default and no constraints.
    pub fn new(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type,
            required: false,
            default: None,
            constraints: Vec::new(),
        }
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: ParamValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Check that the descriptor is internally consistent.
    ///
    /// Used by the registry when a template is registered.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("parameter name is empty".to_string());
        }
        let Some(default) = &self.default else {
            return Ok(());
        };
        if self.required {
            return Err(format!(
                "parameter \"{}\" is required but declares a default",
                self.name
            ));
        }
        if default.param_type() != self.param_type {
            return Err(format!(
                "default for parameter \"{}\" is a {}, expected {}",
                self.name,
                default.param_type(),
                self.param_type
            ));
        }
        for constraint in &self.constraints {
            constraint.check(default).map_err(|violation| {
                format!("default for parameter \"{}\" {}", self.name, violation)
            })?;
        }
        Ok(())
    }

    /// Convert one raw value into a typed value and check constraints.
    fn convert(&self, raw: &Value) -> Result<ParamValue, ParamError> {
        let value = match self.param_type {
            ParameterType::String => raw
                .as_str()
                .map(|s| ParamValue::String(s.to_string()))
                .ok_or_else(|| ParamError::invalid(&self.name, "must be a string"))?,
            ParameterType::Integer => raw
                .as_i64()
                .map(ParamValue::Integer)
                .ok_or_else(|| ParamError::invalid(&self.name, "must be an integer"))?,
            ParameterType::Boolean => raw
                .as_bool()
                .map(ParamValue::Boolean)
                .ok_or_else(|| ParamError::invalid(&self.name, "must be a boolean"))?,
            ParameterType::StringList => {
                let items = raw
                    .as_sequence()
                    .ok_or_else(|| ParamError::invalid(&self.name, "must be a list of strings"))?;
                let strings = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| ParamError::invalid(&self.name, "must be a list of strings"))?;
                ParamValue::StringList(strings)
            }
        };

        for constraint in &self.constraints {
            constraint
                .check(&value)
                .map_err(|violation| ParamError::invalid(&self.name, violation))?;
        }
        Ok(value)
    }
}

/// Validated parameters for one template.
///
/// Holds exactly the parameters that were supplied or defaulted. Equal raw
/// input always produces equal `Params`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a raw typed value.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Get a string parameter.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get an integer parameter.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get a boolean parameter.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ParamValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a list parameter.
    pub fn string_list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(ParamValue::StringList(l)) => Some(l),
            _ => None,
        }
    }

    /// Number of parameters present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validate raw parameters against a schema.
///
/// `raw` must be `null` (nothing configured) or a mapping. A key mapped to
/// `null` counts as absent. Supplied keys are checked in sorted order, then
/// the schema in declaration order; the first violation is returned.
pub fn parse_and_validate(schema: &[ParameterDesc], raw: &Value) -> Result<Params, ParamError> {
    let mut supplied: BTreeMap<&str, &Value> = BTreeMap::new();
    match raw {
        Value::Null => {}
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let name = key
                    .as_str()
                    .ok_or_else(|| ParamError::invalid(ROOT, "parameter names must be strings"))?;
                if !value.is_null() {
                    supplied.insert(name, value);
                }
            }
        }
        _ => return Err(ParamError::invalid(ROOT, "parameters must be a mapping")),
    }

    if let Some(unknown) = supplied
        .keys()
        .find(|name| !schema.iter().any(|desc| desc.name == **name))
    {
        return Err(ParamError::UnknownParameter {
            name: (*unknown).to_string(),
        });
    }

    let mut values = BTreeMap::new();
    for desc in schema {
        let value = match (supplied.get(desc.name.as_str()), &desc.default) {
            (Some(raw), _) => desc.convert(raw)?,
            (None, Some(default)) => default.clone(),
            (None, None) if desc.required => {
                return Err(ParamError::MissingParameter {
                    name: desc.name.clone(),
                });
            }
            (None, None) => continue,
        };
        values.insert(desc.name.clone(), value);
    }

    Ok(Params { values })
}
