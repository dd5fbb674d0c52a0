//! Token state machine mapping CLI arguments onto handler invocations.

use crate::core::Result;
use crate::registry::AppRegistry;
use crate::routing::Value;

use super::format::OutputFormatter;
use super::system::{SYSTEM_HANDLER, SystemCommands};

pub struct Dispatcher;

impl Dispatcher {
    /// Resolve a token sequence and run it to a printable payload.
    ///
    /// Unknown handlers and empty method tables produce a printed report,
    /// not an error; binding and invocation failures propagate to the
    /// caller's single error boundary.
    pub fn dispatch(registry: &mut AppRegistry, tokens: &[String]) -> Result<String> {
        match tokens {
            [] => Ok(Self::overview(registry)),
            [flag] if flag == "--help" || flag == "-h" => Ok(Self::overview(registry)),
            [name] if name == SYSTEM_HANDLER => {
                Ok(OutputFormatter::format_handler(&SystemCommands::schema()))
            }
            [name] => match registry.router().handler(name) {
                Some(handler) => Ok(OutputFormatter::format_handler(&handler.describe())),
                None => Ok(OutputFormatter::format_unknown_handler(
                    name,
                    &registry.router().names(),
                )),
            },
            [name, method, args @ ..] if name == SYSTEM_HANDLER => {
                let result = SystemCommands::execute(registry, method, args)?;
                Ok(Self::render(&result))
            }
            [name, method, args @ ..] => {
                let Some(handler) = registry.router().handler(name) else {
                    return Ok(OutputFormatter::format_unknown_handler(
                        name,
                        &registry.router().names(),
                    ));
                };
                if handler.describe().methods.is_empty() {
                    return Ok(format!("Handler '{name}' exposes no callable methods."));
                }
                let bound = registry.router().bind(name, method)?;
                let result = bound.invoke(args)?;
                Ok(Self::render(&result))
            }
        }
    }

    fn overview(registry: &AppRegistry) -> String {
        OutputFormatter::format_overview(&SystemCommands::schema(), &registry.router().describe())
    }

    fn render(result: &Value) -> String {
        OutputFormatter::format_json(result)
    }
}
