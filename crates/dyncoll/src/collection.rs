//! Shared collection capability
//!
//! [`Collection`] is implemented by all three handles. The read-only
//! enumerations are provided methods: they hold an iteration scope for their
//! whole run and walk the items by position, so callbacks may read the
//! collection but cannot change its shape.

use crate::error::Result;
use crate::guard::IterationGuard;
use crate::order;
use crate::value::Value;
use std::ops::ControlFlow;

pub trait Collection {
    /// Element type seen by enumerations (`Value`, or `Entry` for maps)
    type Item: Clone;

    fn iteration_guard(&self) -> &IterationGuard;

    fn size(&self) -> usize;

    /// Element at `index`, `None` when out of range
    fn item_at(&self, index: usize) -> Option<Self::Item>;

    /// Wrap this handle as a `Value` sharing the same collection
    fn to_value(&self) -> Value;

    fn to_array(&self) -> Vec<Self::Item>;

    fn clear(&self) -> Result<()>;

    /// Remove several positions, shifting each index down by the number of
    /// elements already removed
    fn remove_at(&self, indices: &[usize]) -> Result<()>;

    fn remove_range(&self, start: usize, end: usize) -> Result<()>;

    fn remove_last(&self) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether an enumeration over this instance is running
    fn is_iterating(&self) -> bool {
        self.iteration_guard().is_active()
    }

    /// Structural equality with any value
    fn equals(&self, other: &Value) -> bool {
        order::equivalent(&self.to_value(), other)
    }

    /// First item the predicate accepts
    fn find<F>(&self, mut predicate: F) -> Result<Option<Self::Item>>
    where
        F: FnMut(&Self::Item) -> Result<bool>,
    {
        let mut found = None;
        visit(self, "find", |item| {
            if predicate(item)? {
                found = Some(item.clone());
                return Ok(ControlFlow::Break(()));
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(found)
    }

    /// Items the predicate accepts, in enumeration order
    fn filter<F>(&self, mut predicate: F) -> Result<Vec<Self::Item>>
    where
        F: FnMut(&Self::Item) -> Result<bool>,
    {
        let mut kept = Vec::new();
        visit(self, "filter", |item| {
            if predicate(item)? {
                kept.push(item.clone());
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(kept)
    }

    /// Left fold starting from `init`
    fn reduce<A, F>(&self, init: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, &Self::Item) -> Result<A>,
    {
        let _scope = self.iteration_guard().enter("reduce");
        let mut memo = init;
        let mut index = 0;
        while let Some(item) = self.item_at(index) {
            memo = f(memo, &item)?;
            index += 1;
        }
        Ok(memo)
    }

    /// Right fold: like [`reduce`](Collection::reduce) from the last item backwards
    fn reduce_right<A, F>(&self, init: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, &Self::Item) -> Result<A>,
    {
        let _scope = self.iteration_guard().enter("reduceRight");
        let mut memo = init;
        for index in (0..self.size()).rev() {
            if let Some(item) = self.item_at(index) {
                memo = f(memo, &item)?;
            }
        }
        Ok(memo)
    }
}

/// Read-only forward walk holding an iteration scope
///
/// The item is cloned out before the callback runs, so no storage borrow is
/// held while user code executes.
pub(crate) fn visit<C, F>(collection: &C, operation: &'static str, mut f: F) -> Result<()>
where
    C: Collection + ?Sized,
    F: FnMut(&C::Item) -> Result<ControlFlow<()>>,
{
    let _scope = collection.iteration_guard().enter(operation);
    let mut index = 0;
    while let Some(item) = collection.item_at(index) {
        if f(&item)?.is_break() {
            break;
        }
        index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;
    use crate::sequence::Sequence;
    use crate::set::OrderedSet;

    fn numbers() -> Sequence {
        Sequence::from_values([1, 2, 3, 4].map(Value::from))
    }

    #[test]
    fn test_find_and_filter() {
        let seq = numbers();
        let even = |v: &Value| Ok(v.as_number().is_some_and(|n| n % 2.0 == 0.0));
        assert_eq!(seq.find(even).unwrap(), Some(Value::from(2)));
        assert_eq!(seq.filter(even).unwrap(), vec![Value::from(2), Value::from(4)]);
        assert_eq!(seq.find(|_| Ok(false)).unwrap(), None);
    }

    #[test]
    fn test_reduce_directions() {
        let seq = Sequence::from_values(["a", "b", "c"].map(Value::from));
        let concat = |memo: String, v: &Value| Ok(memo + v.as_str().unwrap_or(""));
        assert_eq!(seq.reduce(String::new(), concat).unwrap(), "abc");
        assert_eq!(seq.reduce_right(String::new(), concat).unwrap(), "cba");
    }

    #[test]
    fn test_enumerations_hold_the_guard() {
        let set = OrderedSet::from_values([3, 1, 2].map(Value::from)).unwrap();
        let levels = set
            .reduce(Vec::new(), |mut seen, _| {
                seen.push(set.iteration_guard().level());
                Ok(seen)
            })
            .unwrap();
        assert_eq!(levels, vec![1, 1, 1]);
        assert!(!set.is_iterating());
    }

    #[test]
    fn test_callback_error_stops_and_releases() {
        let seq = numbers();
        let mut calls = 0;
        let err = seq
            .filter(|v| {
                calls += 1;
                if v == &Value::from(2) {
                    return Err(CollectionError::callback("nope"));
                }
                Ok(true)
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
        assert_eq!(calls, 2);
        assert!(!seq.is_iterating());
        assert!(seq.clear().is_ok());
    }

    #[test]
    fn test_equals_any_value() {
        let seq = numbers();
        assert!(seq.equals(&Value::Sequence(numbers())));
        assert!(!seq.equals(&Value::array([1, 2, 3, 4])));
        assert!(!seq.equals(&Value::Undefined));
    }
}
