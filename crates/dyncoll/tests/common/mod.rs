//! Shared helpers for dyncoll integration tests
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#[allow(unused_imports)]
pub use dyncoll::{
    Collection, CollectionError, KeyedMap, Modifier, OrderedSet, Sequence, Value,
};
#[allow(unused_imports)]
pub use std::ops::ControlFlow;

/// Install a test subscriber once; set `RUST_LOG=dyncoll=trace` to see
/// iteration scopes and applied edits.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_test_writer()
        .try_init();
}

/// Values from a JSON literal array
#[allow(dead_code)]
pub fn values(json: serde_json::Value) -> Vec<Value> {
    match Value::from(json) {
        Value::Array(items) => items.to_vec(),
        other => vec![other],
    }
}

#[allow(dead_code)]
pub fn seq(json: serde_json::Value) -> Sequence {
    Sequence::from_values(values(json))
}

/// Elements of a sequence as JSON, for compact assertions
#[allow(dead_code)]
pub fn as_json(collection: &impl serde::Serialize) -> serde_json::Value {
    serde_json::to_value(collection).expect("collections serialize")
}
