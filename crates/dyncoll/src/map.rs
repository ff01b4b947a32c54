//! KeyedMap: key/value entries in insertion order
//!
//! Keys are any [`Value`] and are matched by equivalence, so `1` and `1.0`
//! are the same key while `1` and `"1"` are not. Setting an existing key
//! overwrites the value only: the originally stored key and its position
//! are kept.
//!
//! Collections used as keys are matched by their contents at lookup time.
//! Mutating such a key after insertion can make it equivalent to another
//! stored key; lookups then find whichever of the two comes first.

use crate::collection::{self, Collection};
use crate::error::{CollectionError, Result};
use crate::format::property_key;
use crate::guard::IterationGuard;
use crate::order;
use crate::store::Store;
use crate::value::{PropertyBag, Value};
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;
use tracing::debug;

/// One key/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    key: Value,
    value: Value,
}

impl Entry {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_parts(self) -> (Value, Value) {
        (self.key, self.value)
    }

    /// `{ "key": k, "value": v }`
    pub fn to_object(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("key", self.key.clone());
        bag.insert("value", self.value.clone());
        bag
    }
}

/// Shared handle to a keyed map
#[derive(Clone)]
pub struct KeyedMap {
    inner: Rc<Store<Entry>>,
}

impl KeyedMap {
    pub fn new() -> Self {
        KeyedMap {
            inner: Rc::new(Store::new(Vec::new())),
        }
    }

    /// Build from a host seed: omitted, a plain object or another map
    pub fn from_value(seed: &Value) -> Result<Self> {
        let map = KeyedMap::new();
        match seed {
            Value::Undefined => {}
            other => match entries_of(other) {
                Some(entries) => map.upsert_all(entries),
                None => {
                    debug!(kind = other.kind_name(), "rejected map seed");
                    return Err(CollectionError::Construction(
                        "Argument must be an object, a map, or omitted.".to_string(),
                    ));
                }
            },
        }
        Ok(map)
    }

    pub(crate) fn store(&self) -> &Store<Entry> {
        &self.inner
    }

    pub fn ptr_eq(&self, other: &KeyedMap) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.inner.with_items(|entries| {
            entries
                .iter()
                .position(|entry| order::equivalent(&entry.key, key))
        })
    }

    /// Value stored under `key`, `Undefined` when missing
    pub fn get(&self, key: &Value) -> Value {
        self.position(key)
            .and_then(|i| self.inner.get(i))
            .map_or(Value::Undefined, |entry| entry.value)
    }

    /// Values for several keys; missing keys give `Undefined`
    pub fn get_many(&self, keys: &[Value]) -> Result<Vec<Value>> {
        if keys.is_empty() {
            return Err(CollectionError::missing_arguments("get(key, ...)"));
        }
        Ok(keys.iter().map(|k| self.get(k)).collect())
    }

    /// Entry at insertion position `index`
    pub fn get_at(&self, index: usize) -> Option<Entry> {
        self.inner.get(index)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    pub fn has_many(&self, keys: &[Value]) -> Result<Vec<bool>> {
        if keys.is_empty() {
            return Err(CollectionError::missing_arguments("has(key, ...)"));
        }
        Ok(keys.iter().map(|k| self.has(k)).collect())
    }

    /// Insert or overwrite the value for `key`
    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) -> Result<()> {
        self.inner.guard().check("set")?;
        self.upsert(Entry::new(key, value));
        Ok(())
    }

    /// Upsert every entry of a plain object or another map
    pub fn set_all(&self, source: &Value) -> Result<()> {
        let entries = entries_of(source).ok_or_else(|| {
            CollectionError::Argument("setAll(object) takes one object argument.".to_string())
        })?;
        self.inner.guard().check("setAll")?;
        self.upsert_all(entries);
        Ok(())
    }

    fn upsert_all(&self, entries: Vec<Entry>) {
        for entry in entries {
            self.upsert(entry);
        }
    }

    fn upsert(&self, entry: Entry) {
        match self.position(&entry.key) {
            Some(i) => self.inner.edit(|entries| entries[i].value = entry.value),
            None => self.inner.edit(|entries| entries.push(entry)),
        }
    }

    /// Delete the entries for the given keys
    pub fn remove(&self, keys: &[Value]) -> Result<()> {
        if keys.is_empty() {
            return Err(CollectionError::missing_arguments("remove(key, ...)"));
        }
        self.inner.guard().check("remove")?;
        for key in keys {
            if let Some(i) = self.position(key) {
                self.inner.edit(|entries| entries.remove(i));
            }
        }
        Ok(())
    }

    pub fn keys(&self) -> Vec<Value> {
        self.inner
            .with_items(|entries| entries.iter().map(|e| e.key.clone()).collect())
    }

    pub fn values(&self) -> Vec<Value> {
        self.inner
            .with_items(|entries| entries.iter().map(|e| e.value.clone()).collect())
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.inner.snapshot()
    }

    /// Plain object with stringified keys; later entries win when two keys
    /// stringify the same way
    pub fn to_object(&self) -> PropertyBag {
        self.inner.with_items(|entries| {
            entries
                .iter()
                .map(|e| (property_key(&e.key), e.value.clone()))
                .collect()
        })
    }

    /// Visit every entry in insertion order until the callback breaks
    pub fn each<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(&Entry) -> Result<ControlFlow<()>>,
    {
        collection::visit(self, "each", f)
    }
}

/// Entries of a plain object (keys become strings) or a map
fn entries_of(source: &Value) -> Option<Vec<Entry>> {
    match source {
        Value::Object(bag) => Some(
            bag.iter()
                .map(|(k, v)| Entry::new(k, v.clone()))
                .collect(),
        ),
        Value::Map(map) => Some(map.entries()),
        _ => None,
    }
}

impl Collection for KeyedMap {
    type Item = Entry;

    fn iteration_guard(&self) -> &IterationGuard {
        self.inner.guard()
    }

    fn size(&self) -> usize {
        self.inner.len()
    }

    fn item_at(&self, index: usize) -> Option<Entry> {
        self.inner.get(index)
    }

    fn to_value(&self) -> Value {
        Value::Map(self.clone())
    }

    fn to_array(&self) -> Vec<Entry> {
        self.entries()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn remove_at(&self, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(CollectionError::missing_arguments("removeAt(index, ...)"));
        }
        self.inner.remove_at(indices).map(drop)
    }

    fn remove_range(&self, start: usize, end: usize) -> Result<()> {
        self.inner.remove_range(start, end).map(drop)
    }

    fn remove_last(&self) -> Result<()> {
        self.inner.remove_last().map(drop)
    }
}

impl Default for KeyedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.with_items(|entries| {
            f.debug_map()
                .entries(entries.iter().map(|e| (&e.key, &e.value)))
                .finish()
        })
    }
}
