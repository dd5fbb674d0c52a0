//! Built-in unit classes shipped with the binary.
//!
//! Each class registers itself in the build-time registry; "Main" is the
//! alias resolved for unit specs that name no class.

pub mod echo;
pub mod kv;

use crate::loader::UnitClass;

inventory::submit! {
    UnitClass {
        name: "Echo",
        construct: echo::construct,
    }
}

inventory::submit! {
    UnitClass {
        name: "Main",
        construct: echo::construct,
    }
}

inventory::submit! {
    UnitClass {
        name: "KvStore",
        construct: kv::construct,
    }
}
