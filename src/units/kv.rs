//! In-memory key/value unit. State lives for the lifetime of the instance
//! and is seeded from the constructor kwargs.

use crate::core::Result;
use crate::loader::ConstructRequest;
use crate::routing::{ArgMap, Handler, Value, str_arg};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub struct KvUnit {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl KvUnit {
    pub fn new(seed: BTreeMap<String, Value>) -> Self {
        Self {
            entries: Mutex::new(seed),
        }
    }

    fn set(&self, args: &ArgMap) -> Result<Value> {
        let key = str_arg(args, "key").to_string();
        let value = args.get("value").cloned().unwrap_or(Value::Null);
        let previous = self.entries.lock()?.insert(key.clone(), value);
        Ok(json!({ "key": key, "replaced": previous.is_some() }))
    }

    fn get(&self, args: &ArgMap) -> Result<Value> {
        let key = str_arg(args, "key");
        match self.entries.lock()?.get(key) {
            Some(value) => Ok(json!({ "key": key, "value": value, "found": true })),
            None => Ok(json!({ "key": key, "found": false })),
        }
    }

    fn del(&self, args: &ArgMap) -> Result<Value> {
        let key = str_arg(args, "key");
        let removed = self.entries.lock()?.remove(key).is_some();
        Ok(json!({ "key": key, "removed": removed }))
    }

    fn items(&self, _args: &ArgMap) -> Result<Value> {
        let entries = self.entries.lock()?;
        Ok(json!({ "count": entries.len(), "items": entries.clone() }))
    }
}

crate::handler_methods! {
    KvUnit {
        name: "kv",
        description: "in-memory key/value store",
        methods: {
            set("store a value under a key") {
                required key: String,
                required value: Json,
            }
            get("look up a key") {
                required key: String,
            }
            del("remove a key") {
                required key: String,
            }
            items("list all entries") {}
        }
    }
}

pub fn construct(request: &ConstructRequest) -> Result<Box<dyn Handler>> {
    let seed = request
        .kwargs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(Box::new(KvUnit::new(seed)))
}
