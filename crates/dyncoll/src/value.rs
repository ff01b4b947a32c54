use crate::error::{CollectionError, Result};
use crate::map::KeyedMap;
use crate::order::{self, TypeRank};
use crate::sequence::Sequence;
use crate::set::OrderedSet;
use std::cmp::Ordering;
use std::rc::Rc;

/// Value: the dynamic datum exchanged with the host
///
/// Scalars and arrays are plain data. `Sequence`, `Set` and `Map` are shared
/// handles: cloning the value shares the collection, and mutating it through
/// one holder is visible to every other holder.
///
/// Equality and ordering are structural and delegate to [`order::compare`],
/// so `==`, `sort()` and `BTreeMap` keys all agree with the collections'
/// lookup rules.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value (host `undefined`)
    Undefined,

    /// Host `null`
    Null,

    /// Boolean value
    Bool(bool),

    /// Primitive number (IEEE 754 double precision)
    Number(f64),

    /// Boxed number object; never equivalent to a primitive number
    BoxedNumber(f64),

    /// Date as milliseconds since the Unix epoch
    Date(f64),

    /// Immutable UTF-8 string
    String(Rc<str>),

    /// Host array, compared element-wise
    Array(Rc<[Value]>),

    /// Insertion-ordered sequence handle
    Sequence(Sequence),

    /// Ordered unique set handle
    Set(OrderedSet),

    /// Keyed map handle
    Map(KeyedMap),

    /// Plain host object that is not one of our collections
    Object(Rc<PropertyBag>),
}

impl Value {
    /// Build an array value from anything convertible to values
    pub fn array<I, V>(values: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    /// Build a date value from milliseconds since the epoch
    pub fn date(millis: f64) -> Value {
        Value::Date(millis)
    }

    pub fn rank(&self) -> TypeRank {
        match self {
            Value::Undefined => TypeRank::Undefined,
            Value::Null => TypeRank::Null,
            Value::Bool(_) => TypeRank::Bool,
            Value::Number(_) => TypeRank::Number,
            Value::BoxedNumber(_) => TypeRank::BoxedNumber,
            Value::Date(_) => TypeRank::Date,
            Value::String(_) => TypeRank::String,
            Value::Array(_) => TypeRank::Array,
            Value::Set(_) => TypeRank::Set,
            Value::Sequence(_) => TypeRank::Sequence,
            Value::Map(_) => TypeRank::Map,
            Value::Object(_) => TypeRank::Object,
        }
    }

    /// Name of the value's kind, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BoxedNumber(_) => "number object",
            Value::Date(_) => "date",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Sequence(_) => "sequence",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric payload of numbers, boxed numbers and dates
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) | Value::BoxedNumber(n) | Value::Date(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&OrderedSet> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&KeyedMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PropertyBag> {
        match self {
            Value::Object(bag) => Some(bag),
            _ => None,
        }
    }

    /// Whether the value may be stored in an ordered set
    ///
    /// Plain host objects are rejected, and so are arrays containing them at
    /// any depth. Collection handles are always accepted.
    pub fn is_supported(&self) -> bool {
        match self {
            Value::Object(_) => false,
            Value::Array(values) => values.iter().all(Value::is_supported),
            _ => true,
        }
    }

    /// Convert a host index argument
    ///
    /// `Undefined` and `Null` mean "no index" and return `Ok(None)`. Anything
    /// other than a non-negative 32-bit integral number is an argument error.
    pub fn as_index(&self) -> Result<Option<usize>> {
        match self {
            Value::Undefined | Value::Null => Ok(None),
            Value::Number(n)
                if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 =>
            {
                Ok(Some(*n as usize))
            }
            other => Err(CollectionError::Argument(format!(
                "Expected an unsigned integer index, got {}.",
                other.kind_name()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        order::equivalent(self, other)
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        order::compare(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Rc::from(values))
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<OrderedSet> for Value {
    fn from(set: OrderedSet) -> Self {
        Value::Set(set)
    }
}

impl From<KeyedMap> for Value {
    fn from(map: KeyedMap) -> Self {
        Value::Map(map)
    }
}

impl From<PropertyBag> for Value {
    fn from(bag: PropertyBag) -> Self {
        Value::Object(Rc::new(bag))
    }
}

/// Decode a JSON document the way a host would hand it over:
/// objects become property bags, arrays become arrays.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => {
                Value::from(fields.into_iter().collect::<PropertyBag>())
            }
        }
    }
}

/// PropertyBag: a plain host object
///
/// String keys in insertion order. Inserting an existing key replaces its
/// value in place, like assigning a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(Rc<str>, Value)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value if the key existed
    pub fn insert(&mut self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyBag
where
    K: Into<Rc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_index_accepts_unsigned_integers() {
        assert_eq!(Value::from(3).as_index().unwrap(), Some(3));
        assert_eq!(Value::from(0).as_index().unwrap(), Some(0));
        assert_eq!(Value::Undefined.as_index().unwrap(), None);
        assert_eq!(Value::Null.as_index().unwrap(), None);
    }

    #[test]
    fn test_as_index_rejects_everything_else() {
        for bad in [
            Value::from(-1),
            Value::from(1.5),
            Value::from("abc"),
            Value::array(Vec::<Value>::new()),
            Value::Number(f64::NAN),
            Value::BoxedNumber(2.0),
        ] {
            let err = bad.as_index().unwrap_err();
            assert!(matches!(err, CollectionError::Argument(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_from_json_builds_bags_and_arrays() {
        let value = Value::from(json!({"a": [1, "x", null], "b": true}));
        let bag = value.as_object().expect("object");
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            bag.get("a"),
            Some(&Value::array([Value::from(1), Value::from("x"), Value::Null]))
        );
        assert_eq!(bag.get("b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_property_bag_insert_replaces_in_place() {
        let mut bag = PropertyBag::new();
        bag.insert("x", 1);
        bag.insert("y", 2);
        assert_eq!(bag.insert("x", 3), Some(Value::from(1)));
        let pairs: Vec<(&str, &Value)> = bag.iter().collect();
        assert_eq!(pairs, vec![("x", &Value::from(3)), ("y", &Value::from(2))]);
    }

    #[test]
    fn test_supported_kinds() {
        let bag = Value::from(PropertyBag::new());
        assert!(!bag.is_supported());
        assert!(!Value::array([Value::from(1), Value::array([bag.clone()])]).is_supported());
        assert!(Value::array([Value::from(1), Value::from("a")]).is_supported());
        assert!(Value::Sequence(Sequence::new()).is_supported());
    }

    #[test]
    fn test_number_kinds_are_distinct() {
        assert_ne!(Value::Number(1.0), Value::BoxedNumber(1.0));
        assert_ne!(Value::Number(1.0), Value::Date(1.0));
        assert_eq!(Value::Number(-0.0), Value::Number(0.0));
    }
}
