//! Declarative method-table definition for handlers.

/// Implement [`Handler`](crate::routing::Handler) for a type from a
/// declarative method table.
///
/// Each listed method must exist on the type with the signature
/// `fn name(&self, args: &ArgMap) -> Result<Value>`; the macro generates
/// `describe()` from the declaration and `call()` as a match over the
/// method names. Parameter types name [`ParamType`](crate::routing::ParamType)
/// variants; `optional` parameters may carry a `= default` JSON expression.
///
/// ```
/// use appdock::routing::{ArgMap, str_arg};
/// use appdock::{Result, routing::Value};
/// use serde_json::json;
///
/// struct Greeter;
///
/// appdock::handler_methods! {
///     Greeter {
///         name: "greeter",
///         description: "says hello",
///         methods: {
///             hello("greet someone") {
///                 required name: String,
///             }
///         }
///     }
/// }
///
/// impl Greeter {
///     fn hello(&self, args: &ArgMap) -> Result<Value> {
///         Ok(json!({ "hello": str_arg(args, "name") }))
///     }
/// }
/// ```
#[macro_export]
macro_rules! handler_methods {
    (@param required $pname:ident $ptype:ident) => {
        $crate::routing::ParamSchema::required(
            stringify!($pname),
            $crate::routing::ParamType::$ptype,
        )
    };
    (@param optional $pname:ident $ptype:ident) => {
        $crate::routing::ParamSchema::optional(
            stringify!($pname),
            $crate::routing::ParamType::$ptype,
        )
    };
    (@param optional $pname:ident $ptype:ident $default:expr) => {
        $crate::routing::ParamSchema::optional(
            stringify!($pname),
            $crate::routing::ParamType::$ptype,
        )
        .with_default($default)
    };

    (
        $handler:ty {
            name: $hname:expr,
            description: $hdesc:expr,
            methods: {
                $(
                    $method:ident ( $mdesc:expr ) {
                        $( $kind:ident $pname:ident : $ptype:ident $( = $default:expr )? ),* $(,)?
                    }
                )*
            }
        }
    ) => {
        impl $crate::routing::Handler for $handler {
            fn describe(&self) -> $crate::routing::HandlerSchema {
                #[allow(unused_mut)]
                let mut schema = $crate::routing::HandlerSchema::new($hname, $hdesc);
                $(
                    #[allow(unused_mut)]
                    let mut method = $crate::routing::MethodSchema::new($mdesc);
                    $(
                        method = method.with_param(
                            $crate::handler_methods!(@param $kind $pname $ptype $( $default )?)
                        );
                    )*
                    schema = schema.with_method(stringify!($method), method);
                )*
                schema
            }

            fn call(
                &self,
                method: &str,
                args: &$crate::routing::ArgMap,
            ) -> $crate::core::Result<$crate::routing::Value> {
                match method {
                    $( stringify!($method) => self.$method(args), )*
                    _ => Err($crate::core::DockError::MethodNotFound {
                        handler: $hname.to_string(),
                        method: method.to_string(),
                    }),
                }
            }
        }
    };
}
