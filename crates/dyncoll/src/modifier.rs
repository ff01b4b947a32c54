//! Per-step modifier handed to [`Sequence::each`](crate::Sequence::each)
//!
//! The callback records what it wants done with the current element. The
//! sequence applies the recorded edits after the callback returns, in this
//! order:
//!
//! 1. replace the current element
//! 2. insert the `before` values at the cursor and step past them
//! 3. remove the current element, or step past it
//! 4. insert the `after` values and step past them
//!
//! Inserted values are never visited by the same traversal.

use crate::value::Value;

#[derive(Debug)]
pub struct Modifier {
    index: usize,
    is_first: bool,
    is_last: bool,
    edits: Edits,
}

#[derive(Debug, Default)]
pub(crate) struct Edits {
    pub(crate) replace: Option<Value>,
    pub(crate) removed: bool,
    pub(crate) before: Vec<Value>,
    pub(crate) after: Vec<Value>,
}

impl Edits {
    /// Whether applying these edits changes the sequence's length
    pub(crate) fn is_structural(&self) -> bool {
        self.removed || !self.before.is_empty() || !self.after.is_empty()
    }
}

impl Modifier {
    pub(crate) fn new(index: usize, is_first: bool, is_last: bool) -> Self {
        Modifier {
            index,
            is_first,
            is_last,
            edits: Edits::default(),
        }
    }

    /// Current position of the element in the sequence
    pub fn index(&self) -> usize {
        self.index
    }

    /// True on the first step of the traversal only
    pub fn is_first(&self) -> bool {
        self.is_first
    }

    /// True when no element follows the current one
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    /// Replace the current element; cancels a pending `remove`
    pub fn set(&mut self, value: impl Into<Value>) -> &mut Self {
        self.edits.replace = Some(value.into());
        self.edits.removed = false;
        self
    }

    /// Remove the current element; cancels a pending `set`
    pub fn remove(&mut self) -> &mut Self {
        self.edits.removed = true;
        self.edits.replace = None;
        self
    }

    /// Queue values to insert before the current element
    pub fn insert_before<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.edits.before.extend(values.into_iter().map(Into::into));
        self
    }

    /// Queue values to insert after the current element
    pub fn insert_after<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.edits.after.extend(values.into_iter().map(Into::into));
        self
    }

    pub(crate) fn into_edits(self) -> Edits {
        self.edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove_cancel_each_other() {
        let mut m = Modifier::new(0, true, false);
        m.remove().set("x");
        let edits = m.into_edits();
        assert!(!edits.removed);
        assert_eq!(edits.replace, Some(Value::from("x")));

        let mut m = Modifier::new(0, true, false);
        m.set("x").remove();
        let edits = m.into_edits();
        assert!(edits.removed);
        assert!(edits.replace.is_none());
    }

    #[test]
    fn test_inserts_accumulate() {
        let mut m = Modifier::new(2, false, true);
        m.insert_before([1, 2]).insert_before([3]).insert_after(Vec::<Value>::new());
        assert_eq!(m.index(), 2);
        assert!(m.is_last() && !m.is_first());
        let edits = m.into_edits();
        assert_eq!(edits.before, vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert!(edits.after.is_empty());
        assert!(edits.is_structural());
    }

    #[test]
    fn test_replace_only_is_not_structural() {
        let mut m = Modifier::new(0, true, true);
        m.set(5);
        assert!(!m.into_edits().is_structural());
    }
}
