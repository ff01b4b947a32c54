//! Value ordering
//!
//! One total order over the whole dynamic domain. The map and set use it for
//! key lookup and deduplication, `equals` uses it for cross-collection
//! equality, and `Sequence::sort` uses it directly.
//!
//! Values of different kinds are ordered by [`TypeRank`] alone. Within a
//! kind, scalars compare by payload and containers compare element-wise,
//! recursing into nested collections.
//!
//! A collection compared with itself is `Equal` without reading its
//! contents. Deeper cycles (a collection reachable from itself through
//! another collection) recurse without bound and are not supported.

use crate::map::Entry;
use crate::value::{PropertyBag, Value};
use std::cmp::Ordering;

/// Rank of each kind in the cross-kind order, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeRank {
    Undefined,
    Null,
    Bool,
    Number,
    BoxedNumber,
    Date,
    String,
    Array,
    Set,
    Sequence,
    Map,
    Object,
}

/// Compare two values under the collection order
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y))
        | (Value::BoxedNumber(x), Value::BoxedNumber(y))
        | (Value::Date(x), Value::Date(y)) => compare_numbers(*x, *y),
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Array(x), Value::Array(y)) => compare_slices(x, y),
        (Value::Sequence(x), Value::Sequence(y)) => {
            if x.ptr_eq(y) {
                return Ordering::Equal;
            }
            x.store()
                .with_items(|xs| y.store().with_items(|ys| compare_slices(xs, ys)))
        }
        (Value::Set(x), Value::Set(y)) => {
            if x.ptr_eq(y) {
                return Ordering::Equal;
            }
            x.store()
                .with_items(|xs| y.store().with_items(|ys| compare_slices(xs, ys)))
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.ptr_eq(y) {
                return Ordering::Equal;
            }
            x.store()
                .with_items(|xs| y.store().with_items(|ys| compare_entries(xs, ys)))
        }
        (Value::Object(x), Value::Object(y)) => compare_bags(x, y),
        // Every same-kind pair is handled above
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Whether two values are interchangeable as keys
pub fn equivalent(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

/// Stable in-place sort, ascending
pub fn sort_values(values: &mut [Value]) {
    values.sort_by(compare);
}

/// Numeric order with `-0 == 0` and NaN sorted after every number
fn compare_numbers(x: f64, y: f64) -> Ordering {
    match x.partial_cmp(&y) {
        Some(ord) => ord,
        None => x.is_nan().cmp(&y.is_nan()),
    }
}

pub(crate) fn compare_slices(xs: &[Value], ys: &[Value]) -> Ordering {
    for (x, y) in xs.iter().zip(ys) {
        match compare(x, y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    xs.len().cmp(&ys.len())
}

/// Maps compare over their entries sorted by key, so insertion order does
/// not affect equality.
fn compare_entries(xs: &[Entry], ys: &[Entry]) -> Ordering {
    let xs = sorted_by_key(xs);
    let ys = sorted_by_key(ys);
    for (x, y) in xs.iter().zip(&ys) {
        let ord = compare(x.key(), y.key()).then_with(|| compare(x.value(), y.value()));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

fn sorted_by_key(entries: &[Entry]) -> Vec<&Entry> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| compare(a.key(), b.key()));
    sorted
}

fn compare_bags(x: &PropertyBag, y: &PropertyBag) -> Ordering {
    for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
        let ord = kx.as_bytes().cmp(ky.as_bytes()).then_with(|| compare(vx, vy));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}
