//! Compiles the module generated from `fixtures/nodes.json` so the tests can
//! exercise the real builders, guards and assertions.

pub mod nodes {
    include!(concat!(env!("OUT_DIR"), "/nodes.rs"));
}
