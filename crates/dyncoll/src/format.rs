//! JSON rendering for values and collections
//!
//! `Value`, the three handles, [`Entry`] and [`PropertyBag`] implement
//! `serde::Serialize`, so any serde format can consume them. The host's
//! stringification hook uses [`to_json_string`], and the handles'
//! `Display` is compact JSON.
//!
//! Mapping:
//! - `Undefined`, `Null` and non-finite numbers render as `null`
//! - integral numbers within the safe integer range render without a fraction
//! - dates render as their millisecond timestamp
//! - arrays, sequences and sets render as JSON arrays
//! - maps render as objects with stringified keys (see [`property_key`])
//!
//! A collection that contains itself, directly or through other
//! collections, fails with a "circular structure" error.

use crate::error::{CollectionError, Result};
use crate::map::{Entry, KeyedMap};
use crate::sequence::Sequence;
use crate::set::OrderedSet;
use crate::value::{PropertyBag, Value};
use serde::ser::{Error as _, Serialize, SerializeStruct, Serializer};
use std::cell::RefCell;
use std::fmt;

/// Largest integer a double represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

thread_local! {
    /// Collections currently being rendered on this thread, innermost last
    static RENDERING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a collection as being rendered until dropped
struct RenderMark(usize);

impl RenderMark {
    /// Fails when the collection is already being rendered further up
    fn enter<T, E: serde::ser::Error>(store: &T) -> std::result::Result<Self, E> {
        let addr = std::ptr::from_ref(store).addr();
        RENDERING.with_borrow_mut(|open| {
            if open.contains(&addr) {
                return Err(E::custom("circular structure"));
            }
            open.push(addr);
            Ok(RenderMark(addr))
        })
    }
}

impl Drop for RenderMark {
    fn drop(&mut self) {
        RENDERING.with_borrow_mut(|open| {
            if let Some(pos) = open.iter().rposition(|&addr| addr == self.0) {
                open.remove(pos);
            }
        });
    }
}

/// Configuration for JSON output
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Use pretty printing with indentation
    pub pretty: bool,
    /// Number of spaces per indentation level
    pub indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
        }
    }
}

impl FormatConfig {
    /// Single-line output
    pub fn compact() -> Self {
        Self::default()
    }

    /// Multi-line output, two spaces per level
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Render anything serializable as JSON
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, config: &FormatConfig) -> Result<String> {
    if !config.pretty {
        return Ok(serde_json::to_string(value)?);
    }
    let indent = " ".repeat(config.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CollectionError::Format(serde_json::Error::custom(e)))
}

/// String form of a map key, as used for plain object property names
pub fn property_key(key: &Value) -> String {
    match key {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) | Value::BoxedNumber(n) | Value::Date(n) => number_key(*n),
        Value::String(s) => s.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.kind_name().to_string()),
    }
}

fn number_key(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if !n.is_finite() {
        serializer.serialize_unit()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) | Value::BoxedNumber(n) | Value::Date(n) => {
                serialize_number(*n, serializer)
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(values) => serializer.collect_seq(values.iter()),
            Value::Sequence(seq) => seq.serialize(serializer),
            Value::Set(set) => set.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Object(bag) => bag.serialize(serializer),
        }
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let _mark = RenderMark::enter::<_, S::Error>(self.store())?;
        self.store().with_items(|items| serializer.collect_seq(items))
    }
}

impl Serialize for OrderedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let _mark = RenderMark::enter::<_, S::Error>(self.store())?;
        self.store().with_items(|items| serializer.collect_seq(items))
    }
}

impl Serialize for KeyedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let _mark = RenderMark::enter::<_, S::Error>(self.store())?;
        self.to_object().serialize(serializer)
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Entry", 2)?;
        state.serialize_field("key", self.key())?;
        state.serialize_field("value", self.value())?;
        state.end()
    }
}

/// Compact JSON, or the error text if rendering fails
fn write_json<T: Serialize>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match serde_json::to_string(value) {
        Ok(json) => f.write_str(&json),
        Err(e) => write!(f, "<{}>", e),
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

impl fmt::Display for OrderedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

impl fmt::Display for KeyedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}
