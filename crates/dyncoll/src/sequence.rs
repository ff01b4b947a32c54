//! Sequence: an insertion-ordered list of values
//!
//! Duplicates are allowed. Lookups (`index`, `has`, `remove`) use value
//! equivalence, so `[1, 2]` finds an equal array stored in the sequence.
//!
//! # Mutation during traversal
//!
//! [`Sequence::each`] hands the callback a [`Modifier`] for the current
//! element; the recorded edits are applied by the traversal itself once the
//! callback returns. Calling a mutating method on the sequence being
//! traversed fails with `IterationInProgress`:
//!
//! ```ignore
//! seq.each(|value, m| {
//!     if value.is_null() {
//!         m.remove();
//!     } else if m.is_first() {
//!         m.insert_before([Value::from("head")]);
//!     }
//!     Ok(ControlFlow::Continue(()))
//! })?;
//! ```

use crate::collection::Collection;
use crate::error::{CollectionError, Result};
use crate::guard::IterationGuard;
use crate::modifier::{Edits, Modifier};
use crate::order::{self, sort_values};
use crate::store::Store;
use crate::value::Value;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;
use tracing::{debug, trace};

/// Shared handle to an insertion-ordered list of values
#[derive(Clone)]
pub struct Sequence {
    inner: Rc<Store<Value>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
        Sequence {
            inner: Rc::new(Store::new(values.into_iter().collect())),
        }
    }

    /// Build from a host seed: omitted, an array, a sequence or a set
    ///
    /// Copying from another sequence or set takes its elements at this
    /// moment; the two collections are independent afterwards.
    pub fn from_value(seed: &Value) -> Result<Self> {
        match seed {
            Value::Undefined => Ok(Self::new()),
            other => match elements_of(other) {
                Some(values) => Ok(Self::from_values(values)),
                None => {
                    debug!(kind = other.kind_name(), "rejected sequence seed");
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

    /// Whether both handles share the same sequence
    pub fn ptr_eq(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Element at `index`, `Undefined` when out of range
    pub fn get(&self, index: usize) -> Value {
        self.inner.get(index).unwrap_or(Value::Undefined)
    }

    /// Elements at several positions; out-of-range positions give `Undefined`
    pub fn get_many(&self, indices: &[usize]) -> Result<Vec<Value>> {
        if indices.is_empty() {
            return Err(CollectionError::missing_arguments("get(index, ...)"));
        }
        Ok(indices.iter().map(|&i| self.get(i)).collect())
    }

    /// Replace the element at `index`, or append when `index == size`
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.inner.mutate("set", |items| {
            let size = items.len();
            match index.cmp(&size) {
                std::cmp::Ordering::Less => items[index] = value,
                std::cmp::Ordering::Equal => items.push(value),
                std::cmp::Ordering::Greater => return Err(CollectionError::Index { index, size }),
            }
            Ok(())
        })?
    }

    /// Append values in argument order
    pub fn add(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("add(value, ...)"));
        }
        self.inner
            .mutate("add", |items| items.extend_from_slice(values))
    }

    /// Append every element of an array, sequence or set
    pub fn add_all(&self, source: &Value) -> Result<()> {
        let values = elements_of(source).ok_or_else(|| {
            CollectionError::Argument(
                "addAll(collection) takes an array, a sequence or a set.".to_string(),
            )
        })?;
        self.inner.mutate("addAll", |items| items.extend(values))
    }

    /// For each argument, remove the first equivalent element
    pub fn remove(&self, values: &[Value]) -> Result<()> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("remove(value, ...)"));
        }
        self.inner.guard().check("remove")?;
        for value in values {
            if let Some(position) = self.index(value) {
                self.inner.edit(|items| items.remove(position));
            }
        }
        Ok(())
    }

    pub fn reverse(&self) -> Result<()> {
        self.inner.mutate("reverse", |items| items.reverse())
    }

    /// Stable sort, ascending
    pub fn sort(&self) -> Result<()> {
        self.inner.guard().check("sort")?;
        // Comparisons may read nested collections, this one included, so sort
        // a copy outside the borrow and leave the contents visible meanwhile
        let mut items = self.inner.snapshot();
        sort_values(&mut items);
        self.inner.edit(|slot| *slot = items);
        Ok(())
    }

    /// Position of the first equivalent element
    pub fn index(&self, value: &Value) -> Option<usize> {
        self.inner
            .with_items(|items| items.iter().position(|item| order::equivalent(item, value)))
    }

    /// Positions of several values; misses give `None`
    pub fn index_many(&self, values: &[Value]) -> Result<Vec<Option<usize>>> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("index(value, ...)"));
        }
        Ok(values.iter().map(|v| self.index(v)).collect())
    }

    pub fn has(&self, value: &Value) -> bool {
        self.index(value).is_some()
    }

    pub fn has_many(&self, values: &[Value]) -> Result<Vec<bool>> {
        if values.is_empty() {
            return Err(CollectionError::missing_arguments("has(value, ...)"));
        }
        Ok(values.iter().map(|v| self.has(v)).collect())
    }

    /// Visit every element once, front to back, applying the edits each
    /// step records on its [`Modifier`]
    ///
    /// Returning `ControlFlow::Break(())` stops after the current step's
    /// edits are applied. A callback error discards the current step's
    /// edits and is returned unchanged; earlier steps stay applied.
    pub fn each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&Value, &mut Modifier) -> Result<ControlFlow<()>>,
    {
        let guard = self.inner.guard();
        let _scope = guard.enter("each");
        let mut cursor = 0;
        let mut first = true;
        loop {
            let (current, size) = self
                .inner
                .with_items(|items| (items.get(cursor).cloned(), items.len()));
            let Some(value) = current else {
                break;
            };

            let mut modifier = Modifier::new(cursor, first, cursor + 1 == size);
            first = false;
            let flow = f(&value, &mut modifier)?;

            let edits = modifier.into_edits();
            if edits.is_structural() && guard.level() > 1 {
                let operation = structural_operation(&edits);
                debug!(operation, level = guard.level(), "edit rejected in nested traversal");
                return Err(CollectionError::IterationInProgress { operation });
            }
            cursor = self.apply(cursor, edits);

            if flow.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Apply one step's edits and return the next cursor position
    fn apply(&self, cursor: usize, edits: Edits) -> usize {
        let Edits {
            replace,
            removed,
            before,
            after,
        } = edits;
        if replace.is_none() && !removed && before.is_empty() && after.is_empty() {
            return cursor + 1;
        }
        trace!(
            index = cursor,
            replaced = replace.is_some(),
            removed,
            before = before.len(),
            after = after.len(),
            "apply modifier"
        );
        self.inner.edit(|items| {
            let mut cursor = cursor.min(items.len());
            if let Some(value) = replace {
                if let Some(slot) = items.get_mut(cursor) {
                    *slot = value;
                }
            }
            let inserted = before.len();
            items.splice(cursor..cursor, before);
            cursor += inserted;
            if removed && cursor < items.len() {
                items.remove(cursor);
            } else if !removed {
                cursor += 1;
            }
            let cursor = cursor.min(items.len());
            let inserted = after.len();
            items.splice(cursor..cursor, after);
            cursor + inserted
        })
    }

    /// Replace every element with the callback's result, front to back
    pub fn map<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let _scope = self.inner.guard().enter("map");
        let mut index = 0;
        while let Some(value) = self.inner.get(index) {
            let mapped = f(&value)?;
            self.inner.edit(|items| {
                if let Some(slot) = items.get_mut(index) {
                    *slot = mapped;
                }
            });
            index += 1;
        }
        Ok(())
    }
}

fn structural_operation(edits: &Edits) -> &'static str {
    if edits.removed {
        "remove"
    } else if !edits.before.is_empty() {
        "insertBefore"
    } else {
        "insertAfter"
    }
}

/// Elements of an array, sequence or set, copied out of any shared storage
pub(crate) fn elements_of(source: &Value) -> Option<Vec<Value>> {
    match source {
        Value::Array(values) => Some(values.to_vec()),
        Value::Sequence(seq) => Some(seq.store().snapshot()),
        Value::Set(set) => Some(set.store().snapshot()),
        _ => None,
    }
}

impl Collection for Sequence {
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
        Value::Sequence(self.clone())
    }

    fn to_array(&self) -> Vec<Value> {
        self.inner.snapshot()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    /// Remove several positions at once
    ///
    /// Indices refer to the sequence as it shrinks: the k-th index is
    /// shifted down by the number of elements already removed, so
    /// `remove_at(&[1, 1])` on `[a, b, c, d]` leaves `[a, d]`. Indices that
    /// fall outside the sequence after the shift are skipped.
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

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner
            .with_items(|items| f.debug_tuple("Sequence").field(&items).finish())
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_of(values: &[i32]) -> Sequence {
        values.iter().map(|&n| Value::from(n)).collect()
    }

    fn numbers(seq: &Sequence) -> Vec<f64> {
        seq.to_array().iter().filter_map(Value::as_number).collect()
    }

    #[test]
    fn test_set_replaces_appends_or_fails() {
        let seq = seq_of(&[1, 2]);
        seq.set(0, 10).unwrap();
        seq.set(2, 30).unwrap();
        assert_eq!(numbers(&seq), vec![10.0, 2.0, 30.0]);
        match seq.set(5, 0) {
            Err(CollectionError::Index { index, size }) => assert_eq!((index, size), (5, 3)),
            other => panic!("expected Index error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_many_fills_misses() {
        let seq = seq_of(&[1, 2]);
        assert_eq!(
            seq.get_many(&[1, 7, 0]).unwrap(),
            vec![Value::from(2), Value::Undefined, Value::from(1)]
        );
        assert!(seq.get_many(&[]).is_err());
        assert!(seq.get(9).is_undefined());
    }

    #[test]
    fn test_remove_first_equivalent_only() {
        let seq = seq_of(&[1, 2, 1, 3]);
        seq.remove(&[Value::from(1), Value::from(9)]).unwrap();
        assert_eq!(numbers(&seq), vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_add_all_from_self_doubles() {
        let seq = seq_of(&[1, 2]);
        seq.add_all(&seq.to_value()).unwrap();
        assert_eq!(numbers(&seq), vec![1.0, 2.0, 1.0, 2.0]);
        assert!(matches!(
            seq.add_all(&Value::from("nope")),
            Err(CollectionError::Argument(_))
        ));
    }

    #[test]
    fn test_sort_and_reverse() {
        let seq = Sequence::from_values(vec![
            Value::from("b"),
            Value::from(2),
            Value::Null,
            Value::from("a"),
        ]);
        seq.sort().unwrap();
        assert_eq!(
            seq.to_array(),
            vec![Value::Null, Value::from(2), Value::from("a"), Value::from("b")]
        );
        seq.reverse().unwrap();
        assert_eq!(seq.get(0), Value::from("b"));
    }

    #[test]
    fn test_sort_sees_own_contents() {
        let seq = Sequence::new();
        let a = Sequence::from_values([seq.to_value()]);
        let b = Sequence::from_values([seq_of(&[0]).to_value()]);
        seq.add(&[b.to_value(), a.to_value()]).unwrap();
        assert_eq!(order::compare(&a.to_value(), &b.to_value()), std::cmp::Ordering::Greater);

        seq.sort().unwrap();
        match seq.get(0) {
            Value::Sequence(first) => assert!(first.ptr_eq(&b)),
            other => panic!("expected Sequence, got {:?}", other),
        }
        assert_eq!(seq.size(), 2);
    }

    #[test]
    fn test_each_replace_and_insert_after() {
        let seq = seq_of(&[1, 2, 3]);
        let mut visited = Vec::new();
        seq.each(|value, m| {
            visited.push(value.clone());
            if value == &Value::from(2) {
                m.set(20).insert_after([Value::from(21)]);
            }
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        assert_eq!(visited, vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(numbers(&seq), vec![1.0, 20.0, 21.0, 3.0]);
    }

    #[test]
    fn test_each_reports_position() {
        let seq = seq_of(&[5, 6, 7]);
        let mut seen = Vec::new();
        seq.each(|_, m| {
            seen.push((m.index(), m.is_first(), m.is_last()));
            if m.is_first() {
                m.remove();
            }
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        // after the first removal the cursor stays at 0
        assert_eq!(seen, vec![(0, true, false), (0, false, false), (1, false, true)]);
    }

    #[test]
    fn test_each_break_applies_current_edits() {
        let seq = seq_of(&[1, 2, 3]);
        let mut calls = 0;
        seq.each(|_, m| {
            calls += 1;
            m.remove();
            Ok(ControlFlow::Break(()))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(numbers(&seq), vec![2.0, 3.0]);
    }

    #[test]
    fn test_each_error_discards_pending_edits() {
        let seq = seq_of(&[1, 2, 3]);
        let err = seq
            .each(|value, m| {
                m.remove();
                if value == &Value::from(2) {
                    return Err(CollectionError::callback("stop"));
                }
                Ok(ControlFlow::Continue(()))
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "stop");
        assert_eq!(numbers(&seq), vec![2.0, 3.0]);
        assert!(!seq.is_iterating());
    }

    #[test]
    fn test_nested_structural_edit_is_rejected() {
        let seq = seq_of(&[1, 2]);
        let err = seq
            .find(|_| {
                seq.each(|_, m| {
                    m.remove();
                    Ok(ControlFlow::Continue(()))
                })?;
                Ok(true)
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::IterationInProgress { operation: "remove" }
        ));
        assert_eq!(seq.size(), 2);
    }

    #[test]
    fn test_map_replaces_in_place() {
        let seq = seq_of(&[1, 2, 3]);
        seq.map(|v| Ok(Value::from(v.as_number().unwrap_or(0.0) * 10.0)))
            .unwrap();
        assert_eq!(numbers(&seq), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_from_value_seeds() {
        assert!(Sequence::from_value(&Value::Undefined).unwrap().is_empty());
        let copy = Sequence::from_value(&Value::array([1, 2])).unwrap();
        assert_eq!(copy.size(), 2);
        let again = Sequence::from_value(&copy.to_value()).unwrap();
        assert!(!again.ptr_eq(&copy));
        assert!(again.equals(&copy.to_value()));
        assert!(matches!(
            Sequence::from_value(&Value::from(3)),
            Err(CollectionError::Construction(_))
        ));
    }
}
