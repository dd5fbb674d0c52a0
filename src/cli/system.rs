//! The reserved `_system` handler: registry management and introspection
//! exposed through the same method-table shape as business handlers, so
//! the dispatcher and completion engine treat it uniformly.

use crate::core::{DockError, Result};
use crate::registry::AppRegistry;
use crate::routing::{
    HandlerSchema, MethodSchema, ParamSchema, ParamType, Value, bind_arguments,
};
use crate::state::StateManager;
use serde_json::{Map, json};

pub const SYSTEM_HANDLER: &str = "_system";

pub struct SystemCommands;

impl SystemCommands {
    pub fn schema() -> HandlerSchema {
        HandlerSchema::new(SYSTEM_HANDLER, "registry management and introspection")
            .with_method("list_handlers", MethodSchema::new("list registered handler names"))
            .with_method(
                "get_handler_info",
                MethodSchema::new("show one handler's method table")
                    .with_param(ParamSchema::required("name", ParamType::String)),
            )
            .with_method("describe", MethodSchema::new("dump the full routing tree schema"))
            .with_method(
                "add",
                MethodSchema::new("register an application from a unit spec")
                    .with_param(ParamSchema::required("name", ParamType::String))
                    .with_param(ParamSchema::required("spec", ParamType::String)),
            )
            .with_method(
                "remove",
                MethodSchema::new("remove a registered application")
                    .with_param(ParamSchema::required("name", ParamType::String)),
            )
            .with_method("apps", MethodSchema::new("list registered applications"))
            .with_method("save", MethodSchema::new("write the registry snapshot"))
            .with_method(
                "restore",
                MethodSchema::new("restore the registry from a snapshot")
                    .with_param(ParamSchema::optional("path", ParamType::String))
                    .with_param(
                        ParamSchema::optional("skip_missing", ParamType::Boolean)
                            .with_default(json!(true)),
                    ),
            )
            .with_method(
                "autosave",
                MethodSchema::new("query or set the autosave flag")
                    .with_param(ParamSchema::optional("enable", ParamType::Boolean)),
            )
    }

    pub fn execute(registry: &mut AppRegistry, method: &str, raw: &[String]) -> Result<Value> {
        let schema = Self::schema();
        let method_schema = schema
            .methods
            .get(method)
            .ok_or_else(|| DockError::MethodNotFound {
                handler: SYSTEM_HANDLER.to_string(),
                method: method.to_string(),
            })?;

        // `add` takes free-form constructor arguments beyond its declared
        // parameters, so it parses its tokens itself.
        if method == "add" {
            return Self::add(registry, raw);
        }

        let args = bind_arguments(method_schema, raw)?;
        match method {
            "list_handlers" => Ok(json!({ "handlers": registry.router().names() })),
            "get_handler_info" => {
                let name = args["name"].as_str().unwrap_or_default();
                let handler = registry.get(name)?;
                Ok(serde_json::to_value(handler.describe())?)
            }
            "describe" => Ok(serde_json::to_value(registry.router().describe())?),
            "remove" => {
                let name = args["name"].as_str().unwrap_or_default();
                Ok(serde_json::to_value(registry.remove(name))?)
            }
            "apps" => Ok(json!({ "apps": registry.list() })),
            "save" => {
                registry.save()?;
                let path = registry
                    .state()
                    .map(|s| s.path().display().to_string())
                    .unwrap_or_default();
                Ok(json!({ "saved": true, "path": path }))
            }
            "restore" => {
                let skip_missing = args
                    .get("skip_missing")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                let snapshot = match args.get("path").and_then(Value::as_str) {
                    Some(path) => StateManager::new(path).load()?,
                    None => registry
                        .state()
                        .ok_or(DockError::StateNotConfigured)?
                        .load()?,
                };
                let report = registry.restore(&snapshot, skip_missing)?;
                Ok(serde_json::to_value(report)?)
            }
            "autosave" => {
                let enable = args.get("enable").and_then(Value::as_bool);
                Ok(json!({ "autosave": registry.autosave(enable) }))
            }
            _ => Err(DockError::MethodNotFound {
                handler: SYSTEM_HANDLER.to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// `add <name> <spec> [args...] [key=value...]`
    ///
    /// The first two bare tokens are the registry name and unit spec;
    /// remaining `key=value` tokens become constructor kwargs (values
    /// JSON-parsed when possible, kept as strings otherwise) and bare
    /// tokens become positional constructor arguments.
    fn add(registry: &mut AppRegistry, raw: &[String]) -> Result<Value> {
        let mut name: Option<String> = None;
        let mut spec: Option<String> = None;
        let mut args: Vec<Value> = Vec::new();
        let mut kwargs: Map<String, Value> = Map::new();

        for token in raw {
            match token.split_once('=') {
                Some(("name", value)) if name.is_none() => name = Some(value.to_string()),
                Some(("spec", value)) if spec.is_none() => spec = Some(value.to_string()),
                Some((key, value)) => {
                    kwargs.insert(key.to_string(), parse_token(value));
                }
                None if name.is_none() => name = Some(token.clone()),
                None if spec.is_none() => spec = Some(token.clone()),
                None => args.push(parse_token(token)),
            }
        }

        let name = name.ok_or_else(|| {
            DockError::InvalidArgument("missing required parameter 'name'".to_string())
        })?;
        let spec = spec.ok_or_else(|| {
            DockError::InvalidArgument("missing required parameter 'spec'".to_string())
        })?;

        let summary = registry.add(&name, &spec, args, kwargs)?;
        Ok(serde_json::to_value(summary)?)
    }
}

/// JSON if it parses, plain string otherwise.
fn parse_token(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
