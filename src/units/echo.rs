//! Text echo unit, also the default class for bare unit specs.

use crate::core::Result;
use crate::loader::ConstructRequest;
use crate::routing::{ArgMap, Handler, Value, int_arg, str_arg};
use serde_json::json;

pub struct EchoUnit {
    greeting: String,
}

impl EchoUnit {
    pub fn new(greeting: &str) -> Self {
        Self {
            greeting: greeting.to_string(),
        }
    }

    fn say(&self, args: &ArgMap) -> Result<Value> {
        let text = str_arg(args, "text");
        let repeat = int_arg(args, "repeat", 1).max(0) as usize;
        let line = format!("{} {}", self.greeting, text);
        let lines: Vec<&str> = (0..repeat).map(|_| line.as_str()).collect();
        Ok(json!({ "lines": lines }))
    }

    fn shout(&self, args: &ArgMap) -> Result<Value> {
        let text = str_arg(args, "text");
        Ok(json!({
            "line": format!("{} {}!", self.greeting, text).to_uppercase()
        }))
    }
}

crate::handler_methods! {
    EchoUnit {
        name: "echo",
        description: "echoes text back with a configurable greeting",
        methods: {
            say("echo text, optionally repeated") {
                required text: String,
                optional repeat: Integer = json!(1),
            }
            shout("echo text uppercased") {
                required text: String,
            }
        }
    }
}

pub fn construct(request: &ConstructRequest) -> Result<Box<dyn Handler>> {
    let greeting = request
        .kwargs
        .get("greeting")
        .and_then(Value::as_str)
        .or_else(|| request.args.first().and_then(Value::as_str))
        .unwrap_or("hello");
    Ok(Box::new(EchoUnit::new(greeting)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::path::PathBuf;

    fn request(args: Vec<Value>, kwargs: Map<String, Value>) -> ConstructRequest {
        ConstructRequest {
            unit_path: PathBuf::from("/tmp/echo.unit"),
            class_name: "Echo".to_string(),
            args,
            kwargs,
        }
    }

    #[test]
    fn greeting_comes_from_kwargs_then_args_then_default() {
        let mut kwargs = Map::new();
        kwargs.insert("greeting".to_string(), json!("hi"));
        let unit = construct(&request(vec![json!("yo")], kwargs)).unwrap();
        let mut args = ArgMap::new();
        args.insert("text".to_string(), json!("there"));
        args.insert("repeat".to_string(), json!(1));
        assert_eq!(unit.call("say", &args).unwrap(), json!({"lines": ["hi there"]}));

        let unit = construct(&request(vec![json!("yo")], Map::new())).unwrap();
        assert_eq!(unit.call("say", &args).unwrap(), json!({"lines": ["yo there"]}));

        let unit = construct(&request(vec![], Map::new())).unwrap();
        assert_eq!(
            unit.call("say", &args).unwrap(),
            json!({"lines": ["hello there"]})
        );
    }

    #[test]
    fn shout_uppercases() {
        let unit = EchoUnit::new("hey");
        let mut args = ArgMap::new();
        args.insert("text".to_string(), json!("world"));
        assert_eq!(unit.call("shout", &args).unwrap(), json!({"line": "HEY WORLD!"}));
    }
}
