//! Shared storage behind every collection handle
//!
//! Borrows of `items` are always short: they never span a user callback or a
//! value comparison that could reach back into the same store. Lookups find
//! their position under a shared borrow, release it, and only then take the
//! mutable borrow to apply the change.

use crate::error::Result;
use crate::guard::IterationGuard;
use std::cell::RefCell;
use tracing::trace;

#[derive(Debug)]
pub(crate) struct Store<T> {
    items: RefCell<Vec<T>>,
    guard: IterationGuard,
}

impl<T: Clone> Store<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Store {
            items: RefCell::new(items),
            guard: IterationGuard::new(),
        }
    }

    pub(crate) fn guard(&self) -> &IterationGuard {
        &self.guard
    }

    pub(crate) fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Read access to the items; `f` must not mutate this store
    pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.borrow())
    }

    /// Apply a guarded mutation
    pub(crate) fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Vec<T>) -> R,
    ) -> Result<R> {
        self.guard.check(operation)?;
        Ok(f(&mut self.items.borrow_mut()))
    }

    /// Apply a mutation on behalf of the enumeration that owns the cursor
    pub(crate) fn edit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        f(&mut self.items.borrow_mut())
    }

    /// Remove positions with index compensation: the k-th target is shifted
    /// down by the number of elements already removed. Targets that fall
    /// outside the list after the shift are skipped.
    pub(crate) fn remove_at(&self, indices: &[usize]) -> Result<usize> {
        self.mutate("removeAt", |items| {
            let mut removed = 0;
            for &index in indices {
                let Some(target) = index.checked_sub(removed) else {
                    continue;
                };
                if target < items.len() {
                    items.remove(target);
                    removed += 1;
                }
            }
            trace!(requested = indices.len(), removed, "removeAt");
            removed
        })
    }

    /// Remove `start..end`, clamping `end` to the current length
    pub(crate) fn remove_range(&self, start: usize, end: usize) -> Result<usize> {
        self.mutate("removeRange", |items| {
            let end = end.min(items.len());
            if start >= end {
                return 0;
            }
            items.drain(start..end);
            end - start
        })
    }

    pub(crate) fn remove_last(&self) -> Result<Option<T>> {
        self.mutate("removeLast", Vec::pop)
    }

    pub(crate) fn clear(&self) -> Result<()> {
        self.mutate("clear", Vec::clear)
    }
}
