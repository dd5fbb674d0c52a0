//! Shell completion engine.
//!
//! Emits one JSON payload per request; suggestion selection depends only
//! on how many tokens are already fully typed. Internal failures are
//! captured into the payload's `error` field so the invoking shell never
//! sees a crash.

use crate::core::Result;
use crate::registry::AppRegistry;
use crate::routing::{HandlerSchema, MethodSchema};
use serde::Serialize;

use super::system::{SYSTEM_HANDLER, SystemCommands};

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub display: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub shell: String,
    pub cursor: usize,
    pub current_fragment: String,
    pub completed_tokens: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompletionPayload {
    /// The single line written to the shell.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub struct CompletionEngine;

impl CompletionEngine {
    pub fn complete(
        registry: &AppRegistry,
        shell: &str,
        cursor: usize,
        tokens: &[String],
    ) -> CompletionPayload {
        let (completed, fragment) = split_tokens(tokens);
        let mut payload = CompletionPayload {
            shell: shell.to_string(),
            cursor,
            current_fragment: fragment.clone(),
            completed_tokens: completed.clone(),
            suggestions: Vec::new(),
            error: None,
        };

        match Self::suggest(registry, &completed, &fragment) {
            Ok(suggestions) => payload.suggestions = suggestions,
            Err(err) => payload.error = Some(err.to_string()),
        }
        payload
    }

    fn suggest(
        registry: &AppRegistry,
        completed: &[String],
        fragment: &str,
    ) -> Result<Vec<Suggestion>> {
        let suggestions = match completed {
            [] => Self::handler_suggestions(registry, fragment),
            [handler] => Self::method_suggestions(registry, handler, fragment),
            [handler, method, ..] => {
                Self::parameter_suggestions(registry, handler, method, fragment)
            }
        };
        Ok(suggestions)
    }

    fn handler_suggestions(registry: &AppRegistry, fragment: &str) -> Vec<Suggestion> {
        // Suggest the registered names, not the handlers' own schema
        // names; the two differ when a unit is mounted under an alias.
        let mut suggestions: Vec<Suggestion> = registry
            .router()
            .describe()
            .handlers
            .iter()
            .filter(|(name, _)| matches(name, fragment))
            .map(|(name, schema)| Suggestion {
                kind: "handler",
                value: name.clone(),
                display: name.clone(),
                description: schema.description.clone(),
            })
            .collect();

        let system = SystemCommands::schema();
        if matches(SYSTEM_HANDLER, fragment) {
            suggestions.push(Suggestion {
                kind: "handler",
                value: SYSTEM_HANDLER.to_string(),
                display: SYSTEM_HANDLER.to_string(),
                description: system.description,
            });
        }
        suggestions
    }

    fn method_suggestions(
        registry: &AppRegistry,
        handler: &str,
        fragment: &str,
    ) -> Vec<Suggestion> {
        let Some(schema) = Self::handler_schema(registry, handler) else {
            return Vec::new();
        };
        schema
            .methods
            .iter()
            .filter(|(name, _)| matches(name, fragment))
            .map(|(name, method)| Suggestion {
                kind: "method",
                value: name.clone(),
                display: display_with_hint(name, method),
                description: method.description.clone(),
            })
            .collect()
    }

    fn parameter_suggestions(
        registry: &AppRegistry,
        handler: &str,
        method: &str,
        fragment: &str,
    ) -> Vec<Suggestion> {
        let Some(schema) = Self::handler_schema(registry, handler) else {
            return Vec::new();
        };
        let Some(method) = schema.methods.get(method) else {
            return Vec::new();
        };
        method
            .parameters
            .iter()
            .filter(|param| matches(&param.name, fragment))
            .map(|param| Suggestion {
                kind: "parameter",
                value: param.name.clone(),
                display: param.name.clone(),
                description: format!(
                    "{}, {}",
                    param.param_type.name(),
                    if param.required { "required" } else { "optional" }
                ),
            })
            .collect()
    }

    fn handler_schema(registry: &AppRegistry, handler: &str) -> Option<HandlerSchema> {
        if handler == SYSTEM_HANDLER {
            return Some(SystemCommands::schema());
        }
        registry
            .router()
            .handler(handler)
            .map(|instance| instance.describe())
    }
}

/// All fully-typed tokens plus the fragment being typed. A trailing empty
/// token means the cursor sits after a separator, so the fragment is empty.
fn split_tokens(tokens: &[String]) -> (Vec<String>, String) {
    match tokens.split_last() {
        Some((last, rest)) => (rest.to_vec(), last.clone()),
        None => (Vec::new(), String::new()),
    }
}

/// Case-insensitive prefix match; an empty fragment matches everything.
fn matches(candidate: &str, fragment: &str) -> bool {
    candidate
        .to_lowercase()
        .starts_with(&fragment.to_lowercase())
}

fn display_with_hint(name: &str, method: &MethodSchema) -> String {
    let hint = method.inline_hint();
    if hint.is_empty() {
        name.to_string()
    } else {
        format!("{name} {hint}")
    }
}
