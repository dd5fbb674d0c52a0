//! Console rendering of schemas and invocation results.

use crate::routing::{HandlerSchema, RouterSchema, Value};

pub struct OutputFormatter;

impl OutputFormatter {
    /// Pretty-printed JSON for invocation results.
    pub fn format_json(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    /// One handler's method table with usage hints.
    pub fn format_handler(schema: &HandlerSchema) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} - {}\n", schema.name, schema.description));
        if schema.methods.is_empty() {
            out.push_str("  (no methods)\n");
            return out;
        }
        out.push_str("\nMethods:\n");
        for (name, method) in &schema.methods {
            let hint = method.inline_hint();
            if hint.is_empty() {
                out.push_str(&format!("  {:<18} {}\n", name, method.description));
            } else {
                out.push_str(&format!(
                    "  {:<18} {}\n                     usage: {} {}\n",
                    name, method.description, name, hint
                ));
            }
        }
        out
    }

    /// Top-level schema dump: usage lines plus every mounted handler.
    pub fn format_overview(system: &HandlerSchema, tree: &RouterSchema) -> String {
        let mut out = String::new();
        out.push_str("Usage:\n");
        out.push_str("  appdock <handler> <method> [args...]\n");
        out.push_str("  appdock _system <method> [args...]\n");
        out.push_str("  appdock --complete <shell> [cursor] [tokens...]\n\n");

        out.push_str("System methods:\n");
        for (name, method) in &system.methods {
            out.push_str(&format!("  _system {:<16} {}\n", name, method.description));
        }

        if tree.handlers.is_empty() {
            out.push_str("\nNo applications registered. Try: appdock _system add <name> <spec>\n");
        } else {
            out.push_str("\nRegistered applications:\n");
            for (name, handler) in &tree.handlers {
                out.push_str(&format!("  {:<18} {}\n", name, handler.description));
            }
        }
        out
    }

    pub fn format_unknown_handler(name: &str, available: &[String]) -> String {
        if available.is_empty() {
            format!("Handler '{name}' not found. No applications are registered.")
        } else {
            format!(
                "Handler '{name}' not found. Available: {}",
                available.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{MethodSchema, ParamSchema, ParamType};
    use serde_json::json;

    #[test]
    fn handler_rendering_includes_usage_hints() {
        let schema = HandlerSchema::new("shop", "a shop").with_method(
            "add",
            MethodSchema::new("add an item")
                .with_param(ParamSchema::required("name", ParamType::String))
                .with_param(ParamSchema::optional("price", ParamType::Float)),
        );

        let text = OutputFormatter::format_handler(&schema);
        assert!(text.contains("shop - a shop"));
        assert!(text.contains("add <name> [price]"));
    }

    #[test]
    fn json_rendering_is_pretty() {
        let text = OutputFormatter::format_json(&json!({"a": 1}));
        assert!(text.contains("\"a\": 1"));
    }

    #[test]
    fn unknown_handler_lists_available() {
        let text =
            OutputFormatter::format_unknown_handler("ghost", &["shop".to_string()]);
        assert!(text.contains("ghost"));
        assert!(text.contains("shop"));
    }
}
