//! Routing tree and handler contract.
//!
//! The registry mounts handler instances here; the dispatcher and
//! completion engine resolve names against the tree and never mutate it.

pub mod macros;
pub mod schema;

pub use schema::{
    ArgMap, HandlerSchema, MethodSchema, ParamSchema, ParamType, bind_arguments,
};
pub use serde_json::Value;

use crate::core::{DockError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A mounted application handler.
///
/// `describe` returns the explicit method-table schema; `call` executes one
/// method with already-validated, type-coerced arguments. Implementations
/// normally come from the [`handler_methods!`](crate::handler_methods) macro.
pub trait Handler: Send + Sync {
    fn describe(&self) -> HandlerSchema;
    fn call(&self, method: &str, args: &ArgMap) -> Result<Value>;
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Schema of the whole routing tree, one entry per mounted handler.
#[derive(Debug, Clone, Serialize)]
pub struct RouterSchema {
    pub handlers: BTreeMap<String, HandlerSchema>,
}

/// A resolved `(handler, method)` pair ready to invoke.
///
/// Raw CLI tokens are validated and coerced against the method schema
/// before the handler sees them; the dispatcher never parses arguments
/// itself.
pub struct BoundMethod {
    handler: Arc<dyn Handler>,
    handler_name: String,
    method: String,
    schema: MethodSchema,
}

impl BoundMethod {
    pub fn method_schema(&self) -> &MethodSchema {
        &self.schema
    }

    pub fn invoke(&self, raw_args: &[String]) -> Result<Value> {
        let args = bind_arguments(&self.schema, raw_args)?;
        tracing::debug!(
            handler = %self.handler_name,
            method = %self.method,
            "invoking bound method"
        );
        self.handler.call(&self.method, &args)
    }
}

/// Name -> handler routing tree.
#[derive(Default)]
pub struct Router {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, name: &str, instance: Arc<dyn Handler>) {
        tracing::debug!(name, "handler attached");
        self.handlers.insert(name.to_string(), instance);
    }

    pub fn detach(&mut self, name: &str) -> bool {
        let removed = self.handlers.remove(name).is_some();
        if removed {
            tracing::debug!(name, "handler detached");
        }
        removed
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Mounted handler names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn describe(&self) -> RouterSchema {
        RouterSchema {
            handlers: self
                .handlers
                .iter()
                .map(|(name, handler)| (name.clone(), handler.describe()))
                .collect(),
        }
    }

    /// Resolve a `(handler, method)` pair into a validating callable.
    pub fn bind(&self, handler_name: &str, method: &str) -> Result<BoundMethod> {
        let handler = self
            .handler(handler_name)
            .ok_or_else(|| DockError::HandlerNotFound(handler_name.to_string()))?;
        let schema = handler.describe();
        let method_schema =
            schema
                .methods
                .get(method)
                .cloned()
                .ok_or_else(|| DockError::MethodNotFound {
                    handler: handler_name.to_string(),
                    method: method.to_string(),
                })?;

        Ok(BoundMethod {
            handler,
            handler_name: handler_name.to_string(),
            method: method.to_string(),
            schema: method_schema,
        })
    }
}

/// Fetch a string argument filled in by the binder. Declared-string
/// parameters are guaranteed present and typed after binding, so absence
/// only happens for optional parameters without defaults.
pub fn str_arg<'a>(args: &'a ArgMap, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or_default()
}

pub fn int_arg(args: &ArgMap, name: &str, fallback: i64) -> i64 {
    args.get(name).and_then(Value::as_i64).unwrap_or(fallback)
}

pub fn bool_arg(args: &ArgMap, name: &str, fallback: bool) -> bool {
    args.get(name).and_then(Value::as_bool).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Probe;

    crate::handler_methods! {
        Probe {
            name: "probe",
            description: "test probe handler",
            methods: {
                ping("answer with pong") {}
                echo("repeat the text") {
                    required text: String,
                    optional repeat: Integer = json!(1),
                }
            }
        }
    }

    impl Probe {
        fn ping(&self, _args: &ArgMap) -> Result<Value> {
            Ok(json!({"pong": true}))
        }

        fn echo(&self, args: &ArgMap) -> Result<Value> {
            let text = str_arg(args, "text");
            let repeat = int_arg(args, "repeat", 1);
            let echoed: Vec<&str> = (0..repeat).map(|_| text).collect();
            Ok(json!({"echo": echoed}))
        }
    }

    #[test]
    fn attach_detach_and_names() {
        let mut router = Router::new();
        router.attach("probe", Arc::new(Probe));
        assert!(router.contains("probe"));
        assert_eq!(router.names(), vec!["probe"]);

        assert!(router.detach("probe"));
        assert!(!router.detach("probe"));
        assert!(router.is_empty());
    }

    #[test]
    fn bind_and_invoke_validates_arguments() {
        let mut router = Router::new();
        router.attach("probe", Arc::new(Probe));

        let bound = router.bind("probe", "echo").unwrap();
        let result = bound.invoke(&["hi".into(), "repeat=2".into()]).unwrap();
        assert_eq!(result, json!({"echo": ["hi", "hi"]}));

        let err = bound.invoke(&[]).unwrap_err();
        assert!(matches!(err, DockError::InvalidArgument(_)));
    }

    #[test]
    fn bind_unknown_targets_fail() {
        let mut router = Router::new();
        router.attach("probe", Arc::new(Probe));

        assert!(matches!(
            router.bind("ghost", "ping"),
            Err(DockError::HandlerNotFound(_))
        ));
        assert!(matches!(
            router.bind("probe", "ghost"),
            Err(DockError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn macro_generated_schema_matches_declaration() {
        let schema = Probe.describe();
        assert_eq!(schema.name, "probe");
        assert_eq!(schema.methods.len(), 2);

        let echo = &schema.methods["echo"];
        assert_eq!(echo.inline_hint(), "<text> [repeat]");
        assert_eq!(echo.parameters[1].default, Some(json!(1)));

        let err = Probe.call("missing", &ArgMap::new()).unwrap_err();
        assert!(matches!(err, DockError::MethodNotFound { .. }));
    }
}
