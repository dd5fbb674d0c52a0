//! Schema value types for handler introspection.
//!
//! Every handler exposes a [`HandlerSchema`] describing its method table;
//! the dispatcher and completion engine consume these schemas verbatim, and
//! the validating bound call coerces raw CLI tokens against them. There is
//! no runtime reflection anywhere: schemas are explicit values built by the
//! handler (usually through the `handler_methods!` macro).

use crate::core::{DockError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared type of a method parameter. Raw CLI tokens are coerced to this
/// type before the handler is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    Json,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }

    /// Coerce a raw token into a typed JSON value.
    pub fn coerce(&self, raw: &str) -> Result<Value> {
        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Integer => raw.parse::<i64>().map(Value::from).map_err(|_| {
                DockError::InvalidArgument(format!("expected integer, got '{raw}'"))
            }),
            Self::Float => raw.parse::<f64>().map(Value::from).map_err(|_| {
                DockError::InvalidArgument(format!("expected float, got '{raw}'"))
            }),
            Self::Boolean => match raw {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(DockError::InvalidArgument(format!(
                    "expected boolean, got '{raw}'"
                ))),
            },
            Self::Json => serde_json::from_str(raw).map_err(|e| {
                DockError::InvalidArgument(format!("expected JSON, got '{raw}': {e}"))
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamSchema {
    pub fn required(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// One method of a handler's table. Parameters keep declaration order so
/// positional binding and usage hints stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSchema {
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParamSchema>,
}

impl MethodSchema {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSchema) -> Self {
        self.parameters.push(param);
        self
    }

    /// Inline usage hint: required parameters as `<name>`, optional as
    /// `[name]`, in declaration order.
    pub fn inline_hint(&self) -> String {
        self.parameters
            .iter()
            .map(|p| {
                if p.required {
                    format!("<{}>", p.name)
                } else {
                    format!("[{}]", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerSchema {
    pub name: String,
    pub description: String,
    pub methods: BTreeMap<String, MethodSchema>,
}

impl HandlerSchema {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            methods: BTreeMap::new(),
        }
    }

    pub fn with_method(mut self, name: &str, method: MethodSchema) -> Self {
        self.methods.insert(name.to_string(), method);
        self
    }
}

/// Typed arguments after validation, keyed by parameter name.
pub type ArgMap = BTreeMap<String, Value>;

/// Bind raw CLI tokens against a method schema.
///
/// Tokens of the form `name=value` where `name` is a declared parameter are
/// named arguments; everything else is positional and fills the remaining
/// parameters in declaration order. Defaults are applied for absent optional
/// parameters, then every value is coerced to its declared type.
pub fn bind_arguments(schema: &MethodSchema, raw: &[String]) -> Result<ArgMap> {
    let mut named: BTreeMap<&str, &str> = BTreeMap::new();
    let mut positional: Vec<&str> = Vec::new();

    for token in raw {
        match token.split_once('=') {
            Some((key, value)) if schema.parameters.iter().any(|p| p.name == key) => {
                if named.insert(key, value).is_some() {
                    return Err(DockError::InvalidArgument(format!(
                        "parameter '{key}' given more than once"
                    )));
                }
            }
            _ => positional.push(token),
        }
    }

    let mut bound = ArgMap::new();
    let mut positional_iter = positional.into_iter();

    for param in &schema.parameters {
        let raw_value = match named.remove(param.name.as_str()) {
            Some(value) => Some(value),
            None => positional_iter.next(),
        };

        match raw_value {
            Some(value) => {
                bound.insert(param.name.clone(), param.param_type.coerce(value)?);
            }
            None if param.required => {
                return Err(DockError::InvalidArgument(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            None => {
                if let Some(default) = &param.default {
                    bound.insert(param.name.clone(), default.clone());
                }
            }
        }
    }

    let excess: Vec<&str> = positional_iter.collect();
    if !excess.is_empty() {
        return Err(DockError::InvalidArgument(format!(
            "unexpected extra arguments: {}",
            excess.join(" ")
        )));
    }

    Ok(bound)
}
