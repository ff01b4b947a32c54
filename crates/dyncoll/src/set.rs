//! OrderedSet: unique values kept in ascending order
//!
//! Membership is decided by equivalence and positions are found by binary
//! search. Plain host objects cannot be ordered and are refused, including
//! inside arrays.
//!
//! Collections stored in a set are compared by their contents at insertion
//! time. Mutating such a collection afterwards can leave the set out of
//! order; lookups for it are then unreliable.

use crate::collection::{self, Collection};
use crate::error::{CollectionError, Result};
use crate::guard::IterationGuard;
use crate::order::{self, sort_values};
use crate::sequence::elements_of;
use crate::store::Store;
use crate::value::Value;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;
use tracing::debug;

const UNSUPPORTED: &str =
    "only takes arrays, booleans, dates, numbers, strings, undefined, null and collections.";

/// Shared handle to an ordered set
#[derive(Clone)]
pub struct OrderedSet {
    inner: Rc<Store<Value>>,
}

impl OrderedSet {
    pub fn new() -> Self {
        OrderedSet {
            inner: Rc::new(Store::new(Vec::new())),
        }
    }

    /// Build from values, dropping later duplicates
    pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Result<Self> {
        let mut values: Vec<Value> = values.into_iter().collect();
        if let Some(bad) = values.iter().find(|v| !v.is_supported()) {
            debug!(kind = bad.kind_name(), "rejected set element");
            return Err(CollectionError::Construction(format!("OrderedSet {}", UNSUPPORTED)));
        }
        sort_values(&mut values);
        values.dedup_by(|later, earlier| order::equivalent(later, earlier));
        Ok(OrderedSet {
            inner: Rc::new(Store::new(values)),
        })
    }

    /// Build from a host seed: omitted, an array, a sequence or a set
    pub fn from_value(seed: &Value) -> Result<Self> {
        match seed {
            Value::Undefined => Ok(Self::new()),
            other => match elements_of(other) {
                Some(values) => Self::from_values(values),
                None => {
                    debug!(kind = other.kind_name(), "rejected set seed");
                    Err(CollectionError::Construction(
                        "Argument must be an array, a sequence, a set, or omitted.".to_string(),
                    ))
                }
            },
        }
    }

    pub(crate) fn store(&self) -> &Store<Value> {
        &self.inner
    }

    pub fn ptr_eq(&self, other: &OrderedSet) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// `Ok(position)` when an equivalent value is present, otherwise
    /// `Err(insertion point)`
    fn search(&self, value: &Value) -> std::result::Result<usize, usize> {
        self.inner
            .with_items(|items| items.binary_search_by(|probe| order::compare(probe, value)))
    }

    /// Insert values, skipping those already present
    ///
    /// Every argument is checked first; if any is unsupported nothing is
    /// inserted.
    pub fn add(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("add(value, ...)"));
        }
        self.insert_all("add", values)
    }

    /// Insert every element of an array, sequence or set
    pub fn add_all(&self, source: &Value) -> Result<()> {
        let values = elements_of(source).ok_or_else(|| {
            CollectionError::Argument(
                "addAll(collection) takes an array, a sequence or a set.".to_string(),
            )
        })?;
        self.insert_all("addAll", &values)
    }

    fn insert_all(&self, operation: &'static str, values: &[Value]) -> Result<()> {
        if let Some(bad) = values.iter().find(|v| !v.is_supported()) {
            debug!(operation, kind = bad.kind_name(), "rejected set element");
            return Err(CollectionError::Argument(format!("{}() {}", operation, UNSUPPORTED)));
        }
        self.inner.guard().check(operation)?;
        for value in values {
            if let Err(position) = self.search(value) {
                self.inner.edit(|items| items.insert(position, value.clone()));
            }
        }
        Ok(())
    }

    pub fn remove(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("remove(value, ...)"));
        }
        self.inner.guard().check("remove")?;
        for value in values {
            if let Ok(position) = self.search(value) {
                self.inner.edit(|items| items.remove(position));
            }
        }
        Ok(())
    }

    pub fn has(&self, value: &Value) -> bool {
        self.search(value).is_ok()
    }

    pub fn has_many(&self, values: &[Value]) -> Result<Vec<bool>> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("has(value, ...)"));
        }
        Ok(values.iter().map(|v| self.has(v)).collect())
    }

    /// Rank of `value` in ascending order
    pub fn index(&self, value: &Value) -> Option<usize> {
        self.search(value).ok()
    }

    pub fn index_many(&self, values: &[Value]) -> Result<Vec<Option<usize>>> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("index(value, ...)"));
        }
        Ok(values.iter().map(|v| self.index(v)).collect())
    }

    /// Value at ascending position `index`, `Undefined` when out of range
    pub fn get(&self, index: usize) -> Value {
        self.inner.get(index).unwrap_or(Value::Undefined)
    }

    pub fn get_many(&self, indices: &[usize]) -> Result<Vec<Value>> {
        if indices.is_empty() {
            return Err(CollectionError::missing_arguments("get(index, ...)"));
        }
        Ok(indices.iter().map(|&i| self.get(i)).collect())
    }

    /// Visit values in ascending order until the callback breaks
    pub fn each<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Result<ControlFlow<()>>,
    {
        collection::visit(self, "each", f)
    }
}

impl Collection for OrderedSet {
    type Item = Value;

    fn iteration_guard(&self) -> &IterationGuard {
        self.inner.guard()
    }

    fn size(&self) -> usize {
        self.inner.len()
    }

    fn item_at(&self, index: usize) -> Option<Value> {
        self.inner.get(index)
    }

    fn to_value(&self) -> Value {
        Value::Set(self.clone())
    }

    fn to_array(&self) -> Vec<Value> {
        self.inner.snapshot()
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

impl Default for OrderedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner
            .with_items(|items| f.debug_set().entries(items.iter()).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set_of(values: &[i32]) -> OrderedSet {
        OrderedSet::from_values(values.iter().map(|&n| Value::from(n))).unwrap()
    }

    #[test]
    fn test_add_keeps_ascending_and_unique() {
        let set = set_of(&[5, 1]);
        set.add(&[Value::from(3), Value::from(1), Value::from(3)])
            .unwrap();
        assert_eq!(
            set.to_array(),
            vec![Value::from(1), Value::from(3), Value::from(5)]
        );
        assert_eq!(set.index(&Value::from(5)), Some(2));
        assert_eq!(set.index(&Value::from(4)), None);
    }

    #[test]
    fn test_add_validates_before_inserting() {
        let set = set_of(&[1]);
        let bag = Value::from(json!({"a": 1}));
        let err = set.add(&[Value::from(2), bag]).unwrap_err();
        assert!(matches!(err, CollectionError::Argument(_)));
        assert_eq!(set.size(), 1);
    }

    #[test]
    fn test_mixed_kinds_follow_rank() {
        let set = OrderedSet::from_values(vec![
            Value::from("x"),
            Value::from(2),
            Value::Bool(true),
            Value::Null,
            Value::array([1]),
        ])
        .unwrap();
        assert_eq!(
            set.to_array(),
            vec![
                Value::Null,
                Value::Bool(true),
                Value::from(2),
                Value::from("x"),
                Value::array([1]),
            ]
        );
    }

    #[test]
    fn test_from_value_rejects_objects() {
        let seed = Value::array([Value::from(1), Value::from(json!({}))]);
        assert!(matches!(
            OrderedSet::from_value(&seed),
            Err(CollectionError::Construction(_))
        ));
        assert!(matches!(
            OrderedSet::from_value(&Value::from(json!({}))),
            Err(CollectionError::Construction(_))
        ));
    }

    #[test]
    fn test_remove_and_has() {
        let set = set_of(&[1, 2, 3]);
        set.remove(&[Value::from(2), Value::from(9)]).unwrap();
        assert_eq!(
            set.has_many(&[Value::from(1), Value::from(2)]).unwrap(),
            vec![true, false]
        );
    }

    #[test]
    fn test_add_during_each_is_rejected() {
        let set = set_of(&[1, 2]);
        let other = OrderedSet::new();
        let err = set
            .each(|v| {
                other.add(std::slice::from_ref(v))?;
                set.add(&[Value::from(10)])?;
                Ok(ControlFlow::Continue(()))
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::IterationInProgress { operation: "add" }
        ));
        assert_eq!(other.size(), 1);
        assert_eq!(set.size(), 2);
    }

    #[test]
    fn test_add_all_from_sequence() {
        let set = set_of(&[2]);
        let seq = crate::Sequence::from_values([3, 2, 1].map(Value::from));
        set.add_all(&seq.to_value()).unwrap();
        assert_eq!(set.size(), 3);
        assert_eq!(set.get(0), Value::from(1));
    }
}
